//! Error taxonomy for the browsing core / 浏览核心错误类型
//!
//! Every variant is recoverable: callers either fall back (empty catalog, fallback
//! media size) or surface the message through a `Notifier` and abort the action.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowseError {
    /// Manifest unreachable or malformed / 清单加载失败
    #[error("Failed to load map catalog: {0}")]
    Load(String),

    /// Optional resource (variant thumbnail mapping) unavailable / 可选资源不可用
    #[error("Optional resource unavailable: {0}")]
    Optional(String),

    /// No asset origin configured / 未配置资源源地址
    #[error("No asset origin configured (worker base URL or legacy API base)")]
    NoOrigin,

    #[error("Invalid asset origin: {0}")]
    InvalidOrigin(String),

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Flavor '{flavor}' not found in location {location}")]
    FlavorNotFound { location: String, flavor: String },

    #[error("File '{filename}' not found in flavor '{flavor}'")]
    FileNotFound { flavor: String, filename: String },

    /// Requested file family is empty / 请求的文件类型列表为空
    #[error("No {file_type} files available for flavor '{flavor}'")]
    NoFilesOfType { flavor: String, file_type: String },

    #[error("Unknown file type: {0}")]
    InvalidFileType(String),

    #[error("Media probe failed: {0}")]
    Probe(String),

    #[error("Media probe timed out after {0}s")]
    ProbeTimeout(u64),

    /// External host rejected the scene / 外部宿主创建失败
    #[error("Scene creation failed: {0}")]
    Creation(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BrowseError {
    /// Missing-data failures are surfaced as warnings, everything else as errors
    pub fn is_missing_data(&self) -> bool {
        matches!(
            self,
            BrowseError::LocationNotFound(_)
                | BrowseError::FlavorNotFound { .. }
                | BrowseError::FileNotFound { .. }
                | BrowseError::NoFilesOfType { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BrowseError>;
