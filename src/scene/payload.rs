//! Scene creation payload handed to the external host / 场景创建载荷

use serde::{Deserialize, Serialize};

use crate::catalog::{FileFamily, FileType, Flavor, Location, MapFile};
use crate::config::SceneConfig;
use crate::resolver::{scene_name, ResolvedAsset};
use crate::utils::is_video_file;

use super::probe::Dimensions;

/// Namespace key for scene metadata flags / 场景元数据命名空间
pub const FLAG_SCOPE: &str = "mapshelf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Animated entries and video containers play as video / 动画或视频扩展名视为视频
    pub fn for_file(file: &MapFile) -> Self {
        if file.animated || is_video_file(&file.filename) {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridKind {
    Gridless,
    Square,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridConfig {
    pub kind: GridKind,
    pub size: u32,
    pub distance: f64,
    pub units: String,
}

/// Which asset-collection convention the file came from / 资源集合约定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Catalog,
    Beneos,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneFlags {
    pub source: SourceKind,
    pub location_id: String,
    pub flavor: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamespacedFlags {
    #[serde(rename = "mapshelf")]
    pub catalog: SceneFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Background {
    pub src: String,
    pub kind: MediaKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenePayload {
    pub name: String,
    pub background: Background,
    pub width: u32,
    pub height: u32,
    pub padding: f64,
    pub grid: GridConfig,
    pub flags: NamespacedFlags,
}

impl ScenePayload {
    /// Scenery files get a gridless scene, everything else a square grid
    pub fn build(
        location: &Location,
        flavor: &Flavor,
        asset: &ResolvedAsset,
        url: String,
        size: Dimensions,
        config: &SceneConfig,
    ) -> Self {
        let source = match flavor.files {
            FileFamily::Files(_) => SourceKind::Catalog,
            FileFamily::Split { .. } => SourceKind::Beneos,
        };
        let grid_kind = if asset.file_type == Some(FileType::Scenery) {
            GridKind::Gridless
        } else {
            GridKind::Square
        };

        Self {
            name: scene_name(location, flavor, &asset.file, asset.file_type),
            background: Background {
                src: url,
                kind: MediaKind::for_file(&asset.file),
            },
            width: size.width,
            height: size.height,
            padding: config.padding,
            grid: GridConfig {
                kind: grid_kind,
                size: config.grid_size,
                distance: config.grid_distance,
                units: config.grid_units.clone(),
            },
            flags: NamespacedFlags {
                catalog: SceneFlags {
                    source,
                    location_id: location.id.clone(),
                    flavor: flavor.name.clone(),
                    filename: asset.file.filename.clone(),
                    file_type: asset.file_type,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::build_path;
    use serde_json::json;

    fn location() -> Location {
        serde_json::from_value(json!({
            "id": "vault",
            "title": "Sunken Vault",
            "folder_name": "Sunken Vault",
            "beneos_path": "beneos/Vault",
            "flavors": [
                { "name": "Original", "files": [{ "filename": "vault.webm", "animated": true }] },
                { "name": "Flooded", "display_name": "Flooded",
                  "scenery_files": [{ "filename": "scene.webp" }],
                  "battlemap_files": [{ "filename": "map.webp" }] }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_payload_for_default_convention() {
        let loc = location();
        let flavor = loc.flavor("Original").unwrap();
        let asset = build_path(&loc, flavor, None, None).unwrap();
        let payload = ScenePayload::build(
            &loc,
            flavor,
            &asset,
            "https://w/x".to_string(),
            Dimensions { width: 4000, height: 3000 },
            &SceneConfig::default(),
        );

        assert_eq!(payload.name, "Sunken Vault");
        assert_eq!(payload.background.kind, MediaKind::Video);
        assert_eq!(payload.grid.kind, GridKind::Square);
        assert_eq!(payload.flags.catalog.source, SourceKind::Catalog);

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["flags"][FLAG_SCOPE]["location_id"], "vault");
        assert!(value["flags"][FLAG_SCOPE].get("file_type").is_none());
    }

    #[test]
    fn test_payload_for_scenery_is_gridless() {
        let loc = location();
        let flavor = loc.flavor("Flooded").unwrap();
        let asset = build_path(&loc, flavor, None, Some(FileType::Scenery)).unwrap();
        let payload = ScenePayload::build(
            &loc,
            flavor,
            &asset,
            "https://w/y".to_string(),
            Dimensions { width: 1, height: 1 },
            &SceneConfig::default(),
        );

        assert_eq!(payload.name, "Sunken Vault - Flooded (Scenery)");
        assert_eq!(payload.grid.kind, GridKind::Gridless);
        assert_eq!(payload.flags.catalog.source, SourceKind::Beneos);
        assert_eq!(payload.flags.catalog.file_type, Some(FileType::Scenery));
    }
}
