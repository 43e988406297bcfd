//! Catalog module - manifest model, sources and the session store / 目录模块
//!
//! Call direction: Store → Source (fetch), Store → Tag index (backfill once at load).
//! Everything downstream only reads `Arc<Catalog>` snapshots.

pub mod model;
pub mod source;
pub mod store;

pub use model::{
    AssetOrigin, Catalog, FileFamily, FileType, Flavor, Location, MapFile, VariantThumbnails,
    ORIGINAL_FLAVOR,
};
pub use source::{CatalogSource, FileCatalogSource, HttpCatalogSource};
pub use store::{CatalogStore, LoadSummary};
