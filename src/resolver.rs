//! Asset reference resolver / 资源引用解析
//!
//! Turns catalog entries into storage paths, fetchable URLs, thumbnail references and
//! generated scene names. Directory segments come from the catalog and are kept
//! verbatim in storage paths; the filename segment is percent-encoded. URL building
//! works from the raw segments, encodes each exactly once and never touches the `/`
//! separators.

use serde::Serialize;
use url::Url;

use crate::catalog::{AssetOrigin, FileFamily, FileType, Flavor, Location, MapFile};
use crate::config::AssetsConfig;
use crate::error::{BrowseError, Result};
use crate::utils::{encode_path, encode_segment, join_url, split_segments};

/// Subfolder used when files are not stored in the location root / 地图子目录
pub const MAPS_SUBFOLDER: &str = "Maps";
/// Appended to legacy origin URLs to address file content / 旧版 API 内容后缀
pub const LEGACY_CONTENT_SUFFIX: &str = "/content";
/// Appended to scene names built from scenery (gridless) files / 场景名后缀
pub const SCENERY_NAME_SUFFIX: &str = " (Scenery)";
/// Extension of bundled and variant thumbnails / 缩略图扩展名
const THUMBNAIL_EXT: &str = "webp";

/// A file picked from a flavor plus its storage path / 解析后的资源
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedAsset {
    pub path: String,
    /// Unencoded path segments, filename last / 原始路径片段
    pub segments: Vec<String>,
    pub file: MapFile,
    pub file_type: Option<FileType>,
}

/// File list a request addresses / 请求对应的文件列表
///
/// Split flavors default to battlemap files when no type is requested.
pub fn files_for(flavor: &Flavor, file_type: Option<FileType>) -> Result<(&[MapFile], Option<FileType>)> {
    let (files, resolved_type) = match &flavor.files {
        FileFamily::Files(files) => (files.as_slice(), None),
        FileFamily::Split { scenery, battlemap } => match file_type.unwrap_or(FileType::Battlemap) {
            FileType::Scenery => (scenery.as_slice(), Some(FileType::Scenery)),
            FileType::Battlemap => (battlemap.as_slice(), Some(FileType::Battlemap)),
        },
    };

    if files.is_empty() {
        return Err(BrowseError::NoFilesOfType {
            flavor: flavor.name.clone(),
            file_type: resolved_type.map(|t| t.to_string()).unwrap_or_else(|| "map".to_string()),
        });
    }

    Ok((files, resolved_type))
}

/// Prefer the first animated file, else the first file / 优先选择动画文件
pub fn pick_file(files: &[MapFile]) -> Option<&MapFile> {
    files.iter().find(|f| f.animated).or_else(|| files.first())
}

/// Build the storage path for a file of `flavor` / 构建存储路径
///
/// `filename = None` picks a file by [`pick_file`]. A named file must exist in the
/// requested list; it is never looked up in the other list of a split flavor.
pub fn build_path(
    location: &Location,
    flavor: &Flavor,
    filename: Option<&str>,
    file_type: Option<FileType>,
) -> Result<ResolvedAsset> {
    let (files, resolved_type) = files_for(flavor, file_type)?;

    let file = match filename {
        Some(name) => files.iter().find(|f| f.filename == name).ok_or_else(|| {
            BrowseError::FileNotFound {
                flavor: flavor.name.clone(),
                filename: name.to_string(),
            }
        })?,
        None => pick_file(files).ok_or_else(|| BrowseError::NoFilesOfType {
            flavor: flavor.name.clone(),
            file_type: resolved_type.map(|t| t.to_string()).unwrap_or_else(|| "map".to_string()),
        })?,
    };

    let mut segments: Vec<String> = match &flavor.files {
        FileFamily::Files(_) => {
            let mut dirs = split_segments(&location.folder_name);
            if !location.files_in_root {
                dirs.push(MAPS_SUBFOLDER.to_string());
            }
            dirs
        }
        FileFamily::Split { .. } => {
            let root = location.beneos_path.as_deref().unwrap_or(&location.folder_name);
            let mut dirs = split_segments(root);
            dirs.push(flavor.name.clone());
            dirs
        }
    };
    let dirs = segments.join("/");
    let path = if dirs.is_empty() {
        encode_segment(&file.filename)
    } else {
        format!("{}/{}", dirs, encode_segment(&file.filename))
    };
    segments.push(file.filename.clone());

    Ok(ResolvedAsset {
        path,
        segments,
        file: file.clone(),
        file_type: resolved_type,
    })
}

/// Pick the effective origin: config override first, then the manifest / 选择源地址
pub fn require_origin(
    override_origin: Option<AssetOrigin>,
    manifest_origin: Option<AssetOrigin>,
) -> Result<AssetOrigin> {
    let origin = override_origin.or(manifest_origin).ok_or(BrowseError::NoOrigin)?;

    let parsed = Url::parse(origin.base())
        .map_err(|e| BrowseError::InvalidOrigin(format!("{}: {}", origin.base(), e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(BrowseError::InvalidOrigin(format!(
            "{}: unsupported scheme {}",
            origin.base(),
            parsed.scheme()
        )));
    }

    Ok(origin)
}

/// Build a fetchable URL from raw path segments / 构建资源地址
///
/// - Worker: `{base}/{encoded path}`
/// - Legacy: `{base}/{encoded path}/content#{encoded filename}`
pub fn build_url<S: AsRef<str>>(origin: Option<&AssetOrigin>, segments: &[S]) -> Result<String> {
    let origin = origin.ok_or(BrowseError::NoOrigin)?;
    let encoded = encode_path(segments);

    match origin {
        AssetOrigin::Worker(base) => Ok(join_url(base, &encoded)),
        AssetOrigin::Legacy(base) => {
            let filename = segments
                .last()
                .map(|s| encode_segment(s.as_ref()))
                .unwrap_or_default();
            Ok(format!(
                "{}{}#{}",
                join_url(base, &encoded),
                LEGACY_CONTENT_SUFFIX,
                filename
            ))
        }
    }
}

/// Generated scene name / 生成场景名称
pub fn scene_name(
    location: &Location,
    flavor: &Flavor,
    file: &MapFile,
    file_type: Option<FileType>,
) -> String {
    let mut name = location.title.clone();

    if !flavor.is_original() {
        name.push_str(" - ");
        name.push_str(&flavor.display_name);
    }

    if let Some(sub) = file.sub_variant.as_deref().filter(|s| !s.trim().is_empty()) {
        name.push_str(" (");
        name.push_str(sub);
        name.push(')');
    }

    if matches!(flavor.files, FileFamily::Split { .. }) && file_type == Some(FileType::Scenery) {
        name.push_str(SCENERY_NAME_SUFFIX);
    }

    name
}

/// Bundled thumbnail for a location, or the placeholder / 地点缩略图
pub fn location_thumbnail(location: &Location, assets: &AssetsConfig) -> String {
    if !location.has_thumbnail {
        return assets.placeholder_thumbnail.clone();
    }
    format!(
        "{}/{}.{}",
        assets.thumbnail_root.trim_end_matches('/'),
        encode_segment(&location.folder_name),
        THUMBNAIL_EXT
    )
}

/// Secondary thumbnail path for a variant identifier / 变体缩略图路径
pub fn variant_thumbnail(identifier: &str, assets: &AssetsConfig) -> String {
    format!(
        "{}/{}.{}",
        assets.variant_thumbnail_root.trim_end_matches('/'),
        encode_segment(identifier),
        THUMBNAIL_EXT
    )
}
