//! Search module - tag index and query engine / 搜索模块
//!
//! Architecture principles / 架构原则：
//! - Tags are built once when the catalog is loaded, never during a query
//! - The engine is a pure, synchronous filter over an in-memory slice
//! - Matching is case-insensitive substring/token containment, no ranking

pub mod engine;
pub mod tags;
pub mod tokenizer;

pub use engine::{filter, SearchQuery, Toggles};
