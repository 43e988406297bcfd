//! Scene creation workflow / 场景创建流程
//!
//! Order of checks: origin → lookup → path → URL → probe → host → prompt → activate.
//! Each failure is routed through the `Notifier` and aborts before any later step;
//! a probe failure is the only one that lets the action continue.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::{AssetOrigin, Catalog, FileType};
use crate::config::{AppConfig, SceneConfig};
use crate::error::{BrowseError, Result};
use crate::notify::Notifier;
use crate::resolver::{build_path, build_url, require_origin};

use super::payload::{MediaKind, ScenePayload};
use super::probe::{probe_or_fallback, Dimensions, MediaProbe, ProbeOutcome};

/// Reference returned by the host for a created scene / 宿主返回的场景引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRef {
    pub id: String,
}

/// External host that owns persistent scenes / 外部场景宿主
#[async_trait]
pub trait SceneHost: Send + Sync {
    async fn create_scene(&self, payload: &ScenePayload) -> Result<SceneRef>;
    async fn activate(&self, scene: &SceneRef) -> Result<()>;
}

/// Yes/no prompt shown after a successful creation / 确认提示
#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    async fn confirm(&self, title: &str, message: &str) -> bool;
}

/// What the user asked to turn into a scene / 场景创建请求
#[derive(Debug, Clone, Deserialize)]
pub struct SceneRequest {
    pub location_id: String,
    pub flavor: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_type: Option<FileType>,
}

/// Payload plus how its size was obtained / 已准备好的场景
#[derive(Debug, Clone, Serialize)]
pub struct PreparedScene {
    pub payload: ScenePayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_warning: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneOutcome {
    pub scene: SceneRef,
    pub name: String,
    pub activated: bool,
}

/// Builds payloads without talking to the host / 载荷构建器
pub struct ScenePlanner {
    scene: SceneConfig,
    probe_timeout: Duration,
    origin_override: Option<AssetOrigin>,
    probe: Arc<dyn MediaProbe>,
    notifier: Arc<dyn Notifier>,
}

impl ScenePlanner {
    pub fn new(config: &AppConfig, probe: Arc<dyn MediaProbe>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            scene: config.scene.clone(),
            probe_timeout: config.probe_timeout(),
            origin_override: config.origin_override(),
            probe,
            notifier,
        }
    }

    fn fallback_size(&self) -> Dimensions {
        Dimensions {
            width: self.scene.fallback_width,
            height: self.scene.fallback_height,
        }
    }

    /// Resolve, probe and assemble the payload for `request` / 构建场景载荷
    ///
    /// Errors are returned unreported; `report` decides their severity.
    pub async fn prepare(&self, catalog: &Catalog, request: &SceneRequest) -> Result<PreparedScene> {
        let origin = require_origin(self.origin_override.clone(), catalog.origin())?;

        let location = catalog
            .location(&request.location_id)
            .ok_or_else(|| BrowseError::LocationNotFound(request.location_id.clone()))?;
        let flavor = location
            .flavor(&request.flavor)
            .ok_or_else(|| BrowseError::FlavorNotFound {
                location: location.id.clone(),
                flavor: request.flavor.clone(),
            })?;

        let asset = build_path(location, flavor, request.filename.as_deref(), request.file_type)?;
        let url = build_url(Some(&origin), asset.segments.as_slice())?;
        tracing::debug!("Resolved {} -> {}", asset.path, url);

        let outcome = probe_or_fallback(
            self.probe.as_ref(),
            &url,
            MediaKind::for_file(&asset.file),
            self.probe_timeout,
            self.fallback_size(),
        )
        .await;
        let probe_warning = match &outcome {
            ProbeOutcome::Measured(_) => None,
            ProbeOutcome::Fallback { size, reason } => {
                let message = format!(
                    "Could not determine media size ({}), using {}x{}",
                    reason, size.width, size.height
                );
                self.notifier.warn(&message);
                Some(message)
            }
        };

        let payload = ScenePayload::build(location, flavor, &asset, url, outcome.size(), &self.scene);
        Ok(PreparedScene { payload, probe_warning })
    }

    /// Surface a failure at the matching severity / 按严重程度通知
    pub fn report(&self, error: &BrowseError) {
        let message = error.to_string();
        if error.is_missing_data() {
            self.notifier.warn(&message);
        } else {
            self.notifier.error(&message);
        }
    }
}

/// Full creation flow against a host / 完整创建流程
pub struct SceneWorkflow {
    planner: ScenePlanner,
    host: Arc<dyn SceneHost>,
    prompt: Arc<dyn ConfirmPrompt>,
    notifier: Arc<dyn Notifier>,
}

impl SceneWorkflow {
    pub fn new(
        config: &AppConfig,
        probe: Arc<dyn MediaProbe>,
        host: Arc<dyn SceneHost>,
        prompt: Arc<dyn ConfirmPrompt>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            planner: ScenePlanner::new(config, probe, notifier.clone()),
            host,
            prompt,
            notifier,
        }
    }

    pub fn planner(&self) -> &ScenePlanner {
        &self.planner
    }

    pub async fn create(&self, catalog: &Catalog, request: &SceneRequest) -> Result<SceneOutcome> {
        let prepared = match self.planner.prepare(catalog, request).await {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::warn!("Scene request for {} aborted: {}", request.location_id, e);
                self.planner.report(&e);
                return Err(e);
            }
        };
        let name = prepared.payload.name.clone();

        let scene = match self.host.create_scene(&prepared.payload).await {
            Ok(scene) => scene,
            Err(e) => {
                let e = match e {
                    BrowseError::Creation(_) => e,
                    other => BrowseError::Creation(other.to_string()),
                };
                tracing::error!("Scene creation failed for {}: {}", name, e);
                self.notifier.error(&e.to_string());
                return Err(e);
            }
        };
        tracing::info!("Created scene {} ({})", name, scene.id);
        self.notifier.info(&format!("Created scene: {}", name));

        let mut activated = false;
        if self
            .prompt
            .confirm("Activate scene?", &format!("Activate \"{}\" now?", name))
            .await
        {
            match self.host.activate(&scene).await {
                Ok(()) => activated = true,
                Err(e) => {
                    tracing::warn!("Activating scene {} failed: {}", scene.id, e);
                    self.notifier.warn(&format!("Scene created but not activated: {}", e));
                }
            }
        }

        Ok(SceneOutcome { scene, name, activated })
    }
}
