//! mapshelf - browsing and retrieval core for a map asset catalog / 地图资源目录浏览核心

pub mod browse;
pub mod catalog;
pub mod config;
pub mod debounce;
pub mod error;
pub mod notify;
pub mod resolver;
pub mod scene;
pub mod search;
pub mod session;
pub mod utils;

pub use error::{BrowseError, Result};
