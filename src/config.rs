//! Application configuration module / 应用配置模块
//!
//! Manages application configuration loaded from config.json
//! Creates default config file on first run / 首次运行时创建默认配置文件

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::source::{DEFAULT_MANIFEST_PATH, DEFAULT_VARIANT_MAP_PATH};
use crate::catalog::AssetOrigin;

/// Global configuration instance / 全局配置实例
static CONFIG: OnceCell<Arc<RwLock<AppConfig>>> = OnceCell::new();

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    pub server: ServerConfig,
    /// Catalog source configuration / 目录来源配置
    pub catalog: CatalogConfig,
    /// Asset origin and thumbnail configuration / 资源配置
    pub assets: AssetsConfig,
    /// Search configuration / 搜索配置
    pub search: SearchConfig,
    /// Scene payload defaults / 场景配置
    pub scene: SceneConfig,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
}

/// Catalog source configuration / 目录来源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Remote base URL; empty means read from `data_dir` / 远程地址，为空则读取本地目录
    pub base_url: String,
    /// Local root directory / 本地根目录
    pub data_dir: String,
    /// Manifest path relative to the source root / 清单相对路径
    pub manifest_path: String,
    /// Variant thumbnail mapping path / 变体缩略图映射路径
    pub variant_map_path: String,
    /// HTTP request timeout (seconds) / 请求超时（秒）
    pub request_timeout_secs: u64,
}

/// Asset origin overrides and thumbnail roots / 资源源地址与缩略图
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Overrides the manifest's worker origin when non-empty / 覆盖清单中的 worker 地址
    pub worker_base_url: String,
    /// Overrides the manifest's legacy API origin when non-empty / 覆盖旧版 API 地址
    pub legacy_api_base: String,
    /// Bundled location thumbnails / 本地缩略图目录
    pub thumbnail_root: String,
    /// Secondary (variant) thumbnails / 变体缩略图目录
    pub variant_thumbnail_root: String,
    /// Shown when a location has no thumbnail / 占位图
    pub placeholder_thumbnail: String,
}

/// Search configuration / 搜索配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period before a typed query is applied (ms) / 输入防抖（毫秒）
    pub debounce_ms: u64,
    /// Number of tag badges shown per location / 标签徽章数量
    pub tag_badge_limit: usize,
}

/// Scene payload defaults / 场景默认值
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Grid cell size in pixels / 网格像素大小
    pub grid_size: u32,
    /// Real-world distance per cell / 每格距离
    pub grid_distance: f64,
    /// Distance units / 距离单位
    pub grid_units: String,
    /// Scene padding ratio / 场景边距
    pub padding: f64,
    /// Media probe ceiling (seconds) / 媒体探测超时（秒）
    pub probe_timeout_secs: u64,
    /// Fallback when probing fails / 探测失败时的尺寸
    pub fallback_width: u32,
    pub fallback_height: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8290,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "".to_string(),
            data_dir: ".".to_string(),
            manifest_path: DEFAULT_MANIFEST_PATH.to_string(),
            variant_map_path: DEFAULT_VARIANT_MAP_PATH.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            worker_base_url: "".to_string(), // Empty means use the manifest's origin
            legacy_api_base: "".to_string(),
            thumbnail_root: "assets/thumbnails".to_string(),
            variant_thumbnail_root: "assets/variant-thumbnails".to_string(),
            placeholder_thumbnail: "assets/placeholder-map.webp".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            tag_badge_limit: 4,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            grid_size: 100,
            grid_distance: 5.0,
            grid_units: "ft".to_string(),
            padding: 0.0,
            probe_timeout_secs: 30,
            fallback_width: 1920,
            fallback_height: 1080,
        }
    }
}

impl AppConfig {
    /// Get the catalog root directory / 获取目录根路径
    pub fn get_data_dir(&self) -> PathBuf {
        PathBuf::from(&self.catalog.data_dir)
    }

    /// Whether the catalog is fetched over HTTP / 是否远程加载
    pub fn is_remote_catalog(&self) -> bool {
        !self.catalog.base_url.trim().is_empty()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog.request_timeout_secs.max(1))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.scene.probe_timeout_secs.max(1))
    }

    /// Origin override from config, if any / 配置中的源地址覆盖
    pub fn origin_override(&self) -> Option<AssetOrigin> {
        AssetOrigin::pick(
            Some(self.assets.worker_base_url.as_str()),
            Some(self.assets.legacy_api_base.as_str()),
        )
    }

    /// Get the server bind address / 获取服务器绑定地址
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Get the config file path / 获取配置文件路径
fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config() -> Result<AppConfig, String> {
    load_config_from(&get_config_path())
}

/// Load configuration from a specific path / 从指定路径加载配置
pub fn load_config_from(config_path: &Path) -> Result<AppConfig, String> {
    if config_path.exists() {
        // Load existing config / 加载现有配置
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        // Create default config / 创建默认配置
        let config = AppConfig::default();
        save_config_to(&config, config_path)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Save configuration to file / 保存配置到文件
fn save_config_to(config: &AppConfig, config_path: &Path) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}

/// Initialize global configuration / 初始化全局配置
pub fn init_config() -> Result<Arc<RwLock<AppConfig>>, String> {
    let config = load_config()?;

    let config_arc = Arc::new(RwLock::new(config));

    CONFIG.set(config_arc.clone())
        .map_err(|_| "Config already initialized".to_string())?;

    Ok(config_arc)
}

/// Get global configuration instance / 获取全局配置实例
pub fn get_config() -> Arc<RwLock<AppConfig>> {
    CONFIG.get_or_init(|| {
        let config = load_config().unwrap_or_default();
        Arc::new(RwLock::new(config))
    }).clone()
}

/// Get a read-only snapshot of current config / 获取当前配置的只读快照
pub fn config() -> AppConfig {
    get_config().read().clone()
}
