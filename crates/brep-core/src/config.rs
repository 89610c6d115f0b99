//! Service configuration

use std::path::Path;

use brep_kernel::KernelConfig;
use serde::{Deserialize, Serialize};

/// Settings of a manipulation service, loaded from a RON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Upper bound on a single request; `None` waits indefinitely
    pub request_timeout_ms: Option<u64>,
    /// Return the input solid unchanged when an offset cannot be built
    pub offset_face_degrades: bool,
    /// Smallest offset the thick solid operation accepts
    pub thick_solid_tolerance: f64,
    /// Settings of the polyhedral kernel. Applied by
    /// `ManipulationService::from_config`; a kernel passed to
    /// `ManipulationService::new` keeps its own settings.
    pub kernel: KernelConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: None,
            offset_face_degrades: true,
            thick_solid_tolerance: 1e-6,
            kernel: KernelConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Parse configuration from RON text
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "request_timeout_ms must be greater than zero".into(),
            ));
        }
        if !(self.thick_solid_tolerance.is_finite() && self.thick_solid_tolerance > 0.0) {
            return Err(ConfigError::Invalid(
                "thick_solid_tolerance must be a positive number".into(),
            ));
        }
        if !(self.kernel.weld_tolerance.is_finite() && self.kernel.weld_tolerance > 0.0) {
            return Err(ConfigError::Invalid(
                "kernel.weld_tolerance must be a positive number".into(),
            ));
        }
        if self.kernel.fillet_segments == 0 {
            return Err(ConfigError::Invalid(
                "kernel.fillet_segments must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
