//! Media dimension probing / 媒体尺寸探测
//!
//! Decoding belongs to the host; this module only defines the capability and bounds
//! it with a timeout so a stalled probe can never block scene creation.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{BrowseError, Result};

use super::payload::MediaKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Natural size lookup for an image or video URL / 媒体尺寸探测接口
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe_dimensions(&self, url: &str, kind: MediaKind) -> Result<Dimensions>;
}

/// Always answers with the same size / 固定尺寸
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe(pub Dimensions);

#[async_trait]
impl MediaProbe for FixedProbe {
    async fn probe_dimensions(&self, _url: &str, _kind: MediaKind) -> Result<Dimensions> {
        Ok(self.0)
    }
}

/// Outcome after applying the fallback / 探测结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Measured(Dimensions),
    Fallback { size: Dimensions, reason: String },
}

impl ProbeOutcome {
    pub fn size(&self) -> Dimensions {
        match self {
            ProbeOutcome::Measured(size) | ProbeOutcome::Fallback { size, .. } => *size,
        }
    }
}

/// Probe with a ceiling; timeouts surface as `ProbeTimeout` / 带超时的探测
pub async fn probe_with_timeout(
    probe: &dyn MediaProbe,
    url: &str,
    kind: MediaKind,
    timeout: Duration,
) -> Result<Dimensions> {
    match tokio::time::timeout(timeout, probe.probe_dimensions(url, kind)).await {
        Ok(Ok(size)) if size.width > 0 && size.height > 0 => Ok(size),
        Ok(Ok(size)) => Err(BrowseError::Probe(format!(
            "invalid size {}x{} for {}",
            size.width, size.height, url
        ))),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(BrowseError::ProbeTimeout(timeout.as_secs())),
    }
}

/// Probe and fall back to `fallback` on any failure / 探测失败使用默认尺寸
pub async fn probe_or_fallback(
    probe: &dyn MediaProbe,
    url: &str,
    kind: MediaKind,
    timeout: Duration,
    fallback: Dimensions,
) -> ProbeOutcome {
    match probe_with_timeout(probe, url, kind, timeout).await {
        Ok(size) => ProbeOutcome::Measured(size),
        Err(e) => {
            tracing::warn!("Media probe failed for {}: {}", url, e);
            ProbeOutcome::Fallback {
                size: fallback,
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StalledProbe;

    #[async_trait]
    impl MediaProbe for StalledProbe {
        async fn probe_dimensions(&self, _url: &str, _kind: MediaKind) -> Result<Dimensions> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Dimensions { width: 1, height: 1 })
        }
    }

    struct BrokenProbe;

    #[async_trait]
    impl MediaProbe for BrokenProbe {
        async fn probe_dimensions(&self, url: &str, _kind: MediaKind) -> Result<Dimensions> {
            Err(BrowseError::Probe(format!("cannot load {}", url)))
        }
    }

    const FALLBACK: Dimensions = Dimensions { width: 1920, height: 1080 };

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let outcome = probe_or_fallback(
            &StalledProbe,
            "https://w/a.webm",
            MediaKind::Video,
            Duration::from_secs(30),
            FALLBACK,
        )
        .await;

        match outcome {
            ProbeOutcome::Fallback { size, reason } => {
                assert_eq!(size, FALLBACK);
                assert!(reason.contains("timed out"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_falls_back() {
        let outcome = probe_or_fallback(
            &BrokenProbe,
            "https://w/a.webp",
            MediaKind::Image,
            Duration::from_secs(30),
            FALLBACK,
        )
        .await;
        assert_eq!(outcome.size(), FALLBACK);
        assert!(matches!(outcome, ProbeOutcome::Fallback { .. }));
    }

    #[tokio::test]
    async fn test_measured() {
        let probe = FixedProbe(Dimensions { width: 4200, height: 2800 });
        let outcome =
            probe_or_fallback(&probe, "u", MediaKind::Image, Duration::from_secs(1), FALLBACK).await;
        assert_eq!(outcome, ProbeOutcome::Measured(Dimensions { width: 4200, height: 2800 }));
    }

    #[tokio::test]
    async fn test_zero_size_rejected() {
        let probe = FixedProbe(Dimensions { width: 0, height: 10 });
        let result = probe_with_timeout(&probe, "u", MediaKind::Image, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(BrowseError::Probe(_))));
    }
}
