//! Derived display state / 派生显示状态
//!
//! Views are rebuilt from the catalog on every query, toggle or expansion change
//! and never written back to it. File-level detail (with variant thumbnails) is only
//! built for the expanded location.

use serde::Serialize;

use crate::catalog::{Catalog, FileFamily, Flavor, Location, MapFile, VariantThumbnails};
use crate::config::AssetsConfig;
use crate::resolver::{location_thumbnail, variant_thumbnail};
use crate::search::{filter, Toggles};

use super::expansion::ExpansionState;

/// Default number of tag badges / 默认标签徽章数量
pub const DEFAULT_TAG_BADGES: usize = 4;

/// Read-only inputs for view derivation / 视图派生上下文
pub struct ViewContext<'a> {
    pub assets: &'a AssetsConfig,
    pub variants: &'a VariantThumbnails,
    pub tag_badge_limit: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationView {
    pub id: String,
    pub title: String,
    pub folder_name: String,
    pub has_animated: bool,
    pub flavor_count: usize,
    pub file_count: usize,
    pub expanded: bool,
    pub thumbnail: String,
    pub tag_badges: Vec<String>,
    /// Present only for the expanded location / 仅展开项包含
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavors: Option<Vec<FlavorView>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlavorView {
    pub name: String,
    pub display_name: String,
    #[serde(flatten)]
    pub files: FlavorFilesView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum FlavorFilesView {
    Files {
        files: Vec<FileView>,
    },
    Split {
        scenery_files: Vec<FileView>,
        battlemap_files: Vec<FileView>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileView {
    pub filename: String,
    pub animated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_thumbnail: Option<String>,
}

/// Everything a renderer needs after one recomputation / 一次计算的完整结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct BrowseSnapshot {
    pub query: String,
    pub toggles: Toggles,
    pub total: usize,
    pub matched: usize,
    pub expanded: Option<String>,
    pub locations: Vec<LocationView>,
}

/// First `limit` smart tags, order preserved / 前 N 个标签
pub fn tag_badges(location: &Location, limit: usize) -> Vec<String> {
    location.smart_tags.iter().take(limit).cloned().collect()
}

fn file_views(location: &Location, flavor: &Flavor, files: &[MapFile], ctx: &ViewContext<'_>) -> Vec<FileView> {
    files
        .iter()
        .map(|file| FileView {
            filename: file.filename.clone(),
            animated: file.animated,
            sub_variant: file.sub_variant.clone(),
            variant_thumbnail: ctx
                .variants
                .get(&location.id, &flavor.name, &file.filename)
                .map(|id| variant_thumbnail(id, ctx.assets)),
        })
        .collect()
}

/// Per-file detail for one location / 单个地点的文件详情
pub fn flavor_views(location: &Location, ctx: &ViewContext<'_>) -> Vec<FlavorView> {
    location
        .flavors
        .iter()
        .map(|flavor| FlavorView {
            name: flavor.name.clone(),
            display_name: flavor.display_name.clone(),
            files: match &flavor.files {
                FileFamily::Files(files) => FlavorFilesView::Files {
                    files: file_views(location, flavor, files, ctx),
                },
                FileFamily::Split { scenery, battlemap } => FlavorFilesView::Split {
                    scenery_files: file_views(location, flavor, scenery, ctx),
                    battlemap_files: file_views(location, flavor, battlemap, ctx),
                },
            },
        })
        .collect()
}

pub fn location_view(location: &Location, expanded: bool, ctx: &ViewContext<'_>) -> LocationView {
    LocationView {
        id: location.id.clone(),
        title: location.title.clone(),
        folder_name: location.folder_name.clone(),
        has_animated: location.has_animated,
        flavor_count: location.flavors.len(),
        file_count: location.file_count(),
        expanded,
        thumbnail: location_thumbnail(location, ctx.assets),
        tag_badges: tag_badges(location, ctx.tag_badge_limit),
        flavors: expanded.then(|| flavor_views(location, ctx)),
    }
}

/// Views for an already filtered list / 为过滤结果生成视图
pub fn derive_views(
    filtered: &[&Location],
    expansion: &ExpansionState,
    ctx: &ViewContext<'_>,
) -> Vec<LocationView> {
    filtered
        .iter()
        .map(|location| location_view(location, expansion.is_expanded(&location.id), ctx))
        .collect()
}

/// Full pipeline: filter → expansion → views / 完整流程
pub fn browse(
    catalog: &Catalog,
    query: &str,
    toggles: Toggles,
    expansion: &ExpansionState,
    ctx: &ViewContext<'_>,
) -> BrowseSnapshot {
    let filtered = filter(&catalog.locations, query, toggles);
    let locations = derive_views(&filtered, expansion, ctx);

    BrowseSnapshot {
        query: query.to_string(),
        toggles,
        total: catalog.locations.len(),
        matched: locations.len(),
        expanded: expansion.expanded().map(str::to_string),
        locations,
    }
}
