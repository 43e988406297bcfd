//! Scene module - payload, media probing and the creation workflow / 场景模块
//!
//! The host runtime is reached only through `SceneHost`, `ConfirmPrompt` and
//! `MediaProbe`; nothing here knows how scenes are actually stored.

pub mod payload;
pub mod probe;
pub mod workflow;

pub use payload::{GridKind, MediaKind, ScenePayload, SourceKind, FLAG_SCOPE};
pub use probe::{probe_with_timeout, Dimensions, FixedProbe, MediaProbe, ProbeOutcome};
pub use workflow::{
    ConfirmPrompt, PreparedScene, SceneHost, SceneOutcome, ScenePlanner, SceneRef, SceneRequest,
    SceneWorkflow,
};
