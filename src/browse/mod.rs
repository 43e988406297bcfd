//! Browse module - selection/expansion state and derived views / 浏览模块

pub mod expansion;
pub mod view;

pub use expansion::{ExpansionState, Transition};
pub use view::{browse, derive_views, BrowseSnapshot, LocationView, ViewContext};
