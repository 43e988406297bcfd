//! Catalog data model / 地图目录数据模型
//!
//! Location → Flavor → File, deserialized straight from the manifest JSON.
//! Nothing here is mutated after the store freezes the catalog.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BrowseError;

/// Flavor name that adds no suffix to generated scene names / 原始风味标记
pub const ORIGINAL_FLAVOR: &str = "Original";

/// Loaded manifest / 已加载的清单
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub total_locations: usize,
    #[serde(default)]
    pub total_flavors: usize,
    #[serde(default)]
    pub total_files: usize,
    /// Preferred origin: plain path-append scheme / 首选源地址
    #[serde(default, alias = "workerBaseUrl")]
    pub worker_base_url: Option<String>,
    /// Legacy API origin / 旧版 API 源地址
    #[serde(default, alias = "apiBase")]
    pub api_base: Option<String>,
}

impl Catalog {
    /// Defined empty state used after a failed load / 加载失败后的空状态
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    /// Configured origin, worker preferred over legacy
    pub fn origin(&self) -> Option<AssetOrigin> {
        AssetOrigin::pick(self.worker_base_url.as_deref(), self.api_base.as_deref())
    }
}

/// Top-level map entry / 地点
#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub id: String,
    pub title: String,
    pub folder_name: String,
    #[serde(default)]
    pub has_animated: bool,
    #[serde(default)]
    pub files_in_root: bool,
    #[serde(default)]
    pub beneos_path: Option<String>,
    #[serde(default)]
    pub flavors: Vec<Flavor>,
    #[serde(default)]
    pub smart_tags: Vec<String>,
    #[serde(default)]
    pub searchable_text: Option<String>,
    #[serde(default)]
    pub has_thumbnail: bool,
}

impl Location {
    pub fn flavor(&self, name: &str) -> Option<&Flavor> {
        self.flavors.iter().find(|f| f.name == name)
    }

    pub fn file_count(&self) -> usize {
        self.flavors.iter().map(|f| f.files.len()).sum()
    }
}

/// Named variant of a location / 风味（变体）
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawFlavor")]
pub struct Flavor {
    pub name: String,
    pub display_name: String,
    pub files: FileFamily,
    pub smart_tags: Vec<String>,
}

impl Flavor {
    pub fn is_original(&self) -> bool {
        self.name == ORIGINAL_FLAVOR
    }
}

/// The two mutually exclusive file list shapes / 两种互斥的文件列表形态
#[derive(Debug, Clone, PartialEq)]
pub enum FileFamily {
    Files(Vec<MapFile>),
    Split {
        scenery: Vec<MapFile>,
        battlemap: Vec<MapFile>,
    },
}

impl FileFamily {
    pub fn len(&self) -> usize {
        match self {
            FileFamily::Files(files) => files.len(),
            FileFamily::Split { scenery, battlemap } => scenery.len() + battlemap.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapFile> {
        let (a, b) = match self {
            FileFamily::Files(files) => (files.as_slice(), &[][..]),
            FileFamily::Split { scenery, battlemap } => (scenery.as_slice(), battlemap.as_slice()),
        };
        a.iter().chain(b.iter())
    }
}

/// One concrete media asset / 单个媒体文件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFile {
    pub filename: String,
    #[serde(default)]
    pub animated: bool,
    #[serde(default)]
    pub sub_variant: Option<String>,
}

/// Manifest shape of a flavor before the file family is resolved
#[derive(Deserialize)]
struct RawFlavor {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    files: Option<Vec<MapFile>>,
    #[serde(default)]
    scenery_files: Option<Vec<MapFile>>,
    #[serde(default)]
    battlemap_files: Option<Vec<MapFile>>,
    #[serde(default)]
    smart_tags: Vec<String>,
}

impl TryFrom<RawFlavor> for Flavor {
    type Error = String;

    fn try_from(raw: RawFlavor) -> Result<Self, Self::Error> {
        let split = raw.scenery_files.is_some() || raw.battlemap_files.is_some();
        let files = match (raw.files, split) {
            (Some(_), true) => {
                return Err(format!(
                    "flavor '{}' has both files and scenery/battlemap files",
                    raw.name
                ))
            }
            (Some(files), false) => FileFamily::Files(files),
            (None, true) => FileFamily::Split {
                scenery: raw.scenery_files.unwrap_or_default(),
                battlemap: raw.battlemap_files.unwrap_or_default(),
            },
            (None, false) => FileFamily::Files(Vec::new()),
        };

        Ok(Flavor {
            display_name: raw.display_name.unwrap_or_else(|| raw.name.clone()),
            name: raw.name,
            files,
            smart_tags: raw.smart_tags,
        })
    }
}

/// File list requested from a split flavor / 请求的文件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Gridless, non-tactical art / 无网格场景
    Scenery,
    /// Gridded tactical map / 战斗地图
    Battlemap,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Scenery => "scenery",
            FileType::Battlemap => "battlemap",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = BrowseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scenery" => Ok(FileType::Scenery),
            "battlemap" => Ok(FileType::Battlemap),
            other => Err(BrowseError::InvalidFileType(other.to_string())),
        }
    }
}

/// URL scheme used to reach the remote asset store / 资源源地址约定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOrigin {
    Worker(String),
    Legacy(String),
}

impl AssetOrigin {
    /// Pick the worker origin when present, else the legacy one; blank values count as absent
    pub fn pick(worker: Option<&str>, legacy: Option<&str>) -> Option<Self> {
        let non_blank = |s: &&str| !s.trim().is_empty();
        worker
            .filter(non_blank)
            .map(|w| AssetOrigin::Worker(w.trim().to_string()))
            .or_else(|| {
                legacy
                    .filter(non_blank)
                    .map(|l| AssetOrigin::Legacy(l.trim().to_string()))
            })
    }

    pub fn base(&self) -> &str {
        match self {
            AssetOrigin::Worker(base) | AssetOrigin::Legacy(base) => base,
        }
    }
}

/// (location, flavor, filename) → secondary thumbnail identifier / 变体缩略图映射
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct VariantThumbnails {
    map: HashMap<String, HashMap<String, HashMap<String, String>>>,
}

impl VariantThumbnails {
    pub fn get(&self, location_id: &str, flavor: &str, filename: &str) -> Option<&str> {
        self.map
            .get(location_id)?
            .get(flavor)?
            .get(filename)
            .map(String::as_str)
    }

    pub fn insert(&mut self, location_id: &str, flavor: &str, filename: &str, id: &str) {
        self.map
            .entry(location_id.to_string())
            .or_default()
            .entry(flavor.to_string())
            .or_default()
            .insert(filename.to_string(), id.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map
            .values()
            .flat_map(|flavors| flavors.values())
            .map(|files| files.len())
            .sum()
    }
}
