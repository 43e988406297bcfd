//! Catalog sources - where the manifest and variant mapping come from / 清单来源

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::{BrowseError, Result};

use super::model::{Catalog, VariantThumbnails};

/// Default manifest location relative to the source root / 默认清单相对路径
pub const DEFAULT_MANIFEST_PATH: &str = "data/maps.json";
/// Default variant thumbnail mapping path / 默认变体缩略图映射路径
pub const DEFAULT_VARIANT_MAP_PATH: &str = "data/variant-thumbnails.json";

/// Manifest provider trait / 清单提供者
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human readable origin, used in logs / 来源描述
    fn describe(&self) -> String;

    async fn fetch_manifest(&self) -> Result<Catalog>;

    async fn fetch_variant_map(&self) -> Result<VariantThumbnails>;
}

/// HTTP source: GET `{base_url}/{path}` / HTTP 来源
pub struct HttpCatalogSource {
    client: Client,
    base_url: String,
    manifest_path: String,
    variant_map_path: String,
}

impl HttpCatalogSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            manifest_path: DEFAULT_MANIFEST_PATH.to_string(),
            variant_map_path: DEFAULT_VARIANT_MAP_PATH.to_string(),
        })
    }

    pub fn with_paths(mut self, manifest_path: &str, variant_map_path: &str) -> Self {
        self.manifest_path = manifest_path.trim_start_matches('/').to_string();
        self.variant_map_path = variant_map_path.trim_start_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(BrowseError::Load(format!("{} returned HTTP {}", url, status)));
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    async fn fetch_manifest(&self) -> Result<Catalog> {
        self.get_json(&self.manifest_path).await
    }

    async fn fetch_variant_map(&self) -> Result<VariantThumbnails> {
        self.get_json(&self.variant_map_path)
            .await
            .map_err(|e| BrowseError::Optional(e.to_string()))
    }
}

/// Filesystem source: reads `{root}/{path}` / 本地文件来源
pub struct FileCatalogSource {
    root: PathBuf,
    manifest_path: String,
    variant_map_path: String,
}

impl FileCatalogSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifest_path: DEFAULT_MANIFEST_PATH.to_string(),
            variant_map_path: DEFAULT_VARIANT_MAP_PATH.to_string(),
        }
    }

    pub fn with_paths(mut self, manifest_path: &str, variant_map_path: &str) -> Self {
        self.manifest_path = manifest_path.to_string();
        self.variant_map_path = variant_map_path.to_string();
        self
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let full = self.root.join(path);
        tracing::debug!("Reading {:?}", full);
        let content = tokio::fs::read(&full).await?;
        Ok(serde_json::from_slice(&content)?)
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    fn describe(&self) -> String {
        self.root.to_string_lossy().to_string()
    }

    async fn fetch_manifest(&self) -> Result<Catalog> {
        self.read_json(&self.manifest_path).await
    }

    async fn fetch_variant_map(&self) -> Result<VariantThumbnails> {
        self.read_json(&self.variant_map_path)
            .await
            .map_err(|e| BrowseError::Optional(e.to_string()))
    }
}
