//! Readiness polling: decide when the renderer's layout can be trusted
//!
//! Layout settles asynchronously (fonts, scripts, diagram rendering, scroll
//! inertia) and none of it is observable synchronously, so both waits here
//! are bounded retry loops with a fixed delay between attempts. The bound is
//! an attempt count, not a wall-clock deadline, which keeps behaviour
//! deterministic under `tokio::time::pause`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::renderer::ContentRenderer;
use crate::{Error, Result};

/// Key of the optional custom flag a page sets once its own scripts finish.
pub const READY_FLAG: &str = "longshotReady";

/// Tuning for the readiness loops.
///
/// The defaults were picked empirically for script-rendered documents; none
/// of them is load-bearing on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Polls before a wait gives up
    pub max_attempts: u32,
    /// Delay between polls in milliseconds
    pub delay_ms: u64,
    /// Allowed drift, in content units, for sizes and scroll offsets
    pub size_tolerance: f64,
    /// Consecutive stable polls required before a tile is captured
    pub required_stable_checks: u32,
    /// Extra polls granted to the first tile
    pub first_tile_extra_attempts: u32,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            delay_ms: 120,
            size_tolerance: 2.0,
            required_stable_checks: 2,
            first_tile_extra_attempts: 2,
        }
    }
}

impl ReadinessConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    fn tile_attempts(&self, is_first_tile: bool) -> u32 {
        if is_first_tile {
            self.max_attempts.saturating_add(self.first_tile_extra_attempts)
        } else {
            self.max_attempts
        }
    }
}

/// Interpret a ready signal reported by the page.
///
/// An object must carry `readyState: "complete"`; when it also carries a
/// boolean [`READY_FLAG`], that flag has the final say. A bare string is the
/// legacy form and is ready only when it is `"complete"`.
///
/// ```
/// use serde_json::json;
/// use longshot::readiness::evaluate_readiness;
///
/// assert!(evaluate_readiness(&json!({"readyState": "complete"})));
/// assert!(!evaluate_readiness(&json!({"readyState": "complete", "longshotReady": false})));
/// assert!(!evaluate_readiness(&json!("loading")));
/// ```
pub fn evaluate_readiness(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            if map.get("readyState").and_then(Value::as_str) != Some("complete") {
                return false;
            }
            match map.get(READY_FLAG) {
                Some(Value::Bool(flag)) => *flag,
                _ => true,
            }
        }
        Value::String(state) => state == "complete",
        _ => false,
    }
}

/// Runs the document-level and tile-level waits against a renderer.
#[derive(Debug, Clone, Default)]
pub struct ReadinessProber {
    config: ReadinessConfig,
}

impl ReadinessProber {
    pub fn new(config: ReadinessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReadinessConfig {
        &self.config
    }

    /// Wait until the renderer is ready and reports a positive size.
    pub async fn wait_for_document<R: ContentRenderer>(&self, renderer: &mut R) -> Result<()> {
        for attempt in 1..=self.config.max_attempts {
            let size = renderer.measure().await.unwrap_or_default();
            let ready = renderer.is_ready().await;
            if ready && size.is_positive() {
                log::debug!("document ready after {} poll(s): {:?}", attempt, size);
                return Ok(());
            }
            log::debug!(
                "document not ready (attempt {}/{}, ready={}, size={:?})",
                attempt,
                self.config.max_attempts,
                ready,
                size
            );
            tokio::time::sleep(self.config.delay()).await;
        }
        log::warn!("document never settled after {} polls", self.config.max_attempts);
        Err(Error::UnstableContentLayout)
    }

    /// Wait until the renderer shows `expected_offset` and has stopped moving.
    ///
    /// The combined condition (ready, offset within tolerance, scroll idle)
    /// must hold on `required_stable_checks` consecutive polls; any failing
    /// poll resets the count.
    pub async fn wait_for_tile<R: ContentRenderer>(
        &self,
        renderer: &mut R,
        expected_offset: f64,
        is_first_tile: bool,
    ) -> Result<()> {
        let attempts = self.config.tile_attempts(is_first_tile);
        let required = self.config.required_stable_checks.max(1);
        let mut stable_checks = 0;

        for attempt in 1..=attempts {
            let ready = renderer.is_ready().await;
            let offset_delta = (renderer.scroll_offset() - expected_offset).abs();
            let idle = renderer.is_scroll_idle();

            if ready && offset_delta <= self.config.size_tolerance && idle {
                stable_checks += 1;
                if stable_checks >= required {
                    return Ok(());
                }
            } else {
                if stable_checks > 0 {
                    log::debug!("tile at {} lost stability on poll {}", expected_offset, attempt);
                }
                stable_checks = 0;
            }
            tokio::time::sleep(self.config.delay()).await;
        }

        log::warn!(
            "tile at offset {} did not settle within {} polls",
            expected_offset,
            attempts
        );
        Err(Error::IncompleteTileCapture)
    }
}
