//! Export configuration loaded from JSON

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::limits::ExportLimits;
use crate::readiness::ReadinessConfig;
use crate::{Error, Result};

/// Everything an export can be tuned with.
///
/// Missing fields fall back to their defaults, so a config file only needs
/// the values it changes:
///
/// ```
/// let json = r#"{"limits": {"target_width": 750}}"#;
/// let cfg = longshot::ExportConfig::from_json_str(json).unwrap();
/// assert_eq!(cfg.limits.target_width, 750);
/// assert_eq!(cfg.limits.tile_height, 2048.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub limits: ExportLimits,
    pub readiness: ReadinessConfig,
}

impl ExportConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ExportConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.limits.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }
}
