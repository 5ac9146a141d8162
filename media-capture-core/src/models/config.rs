use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Default label for the recorder node registered with the host.
pub const DEFAULT_NODE_NAME: &str = "AudioCaptureClient";

/// Configuration consumed by the capture pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfiguration {
    /// Target sample rate in Hz. `0.0` disables resampling and delivers audio
    /// at the device rate.
    pub target_sample_rate: f32,

    /// Display name for the node registered with the host. Opaque to the core.
    pub node_name: String,
}

impl CaptureConfiguration {
    pub fn with_target_rate(target_sample_rate: f32) -> Self {
        Self {
            target_sample_rate,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.target_sample_rate.is_finite() || self.target_sample_rate < 0.0 {
            return Err(format!("invalid target sample rate: {}", self.target_sample_rate));
        }
        if self.node_name.trim().is_empty() {
            return Err("node name must not be empty".into());
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document. Missing fields fall
    /// back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, CaptureError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            CaptureError::ConfigurationFailed(format!("failed to parse configuration: {}", e))
        })?;
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(config)
    }
}

impl Default for CaptureConfiguration {
    fn default() -> Self {
        Self {
            target_sample_rate: 0.0,
            node_name: DEFAULT_NODE_NAME.to_string(),
        }
    }
}
