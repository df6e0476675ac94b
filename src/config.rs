//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::flow::MotionPreference;

/// Which guided flow the driver runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowKind {
    #[default]
    Card,
    Walkthrough,
}

/// Gesture thresholds.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Drag distance (px) that commits a swipe.
    pub offset_threshold: f32,
    /// Release velocity (px/s) that commits a swipe regardless of distance.
    pub velocity_threshold: f32,
    /// Wheel deltas below this are treated as noise.
    pub wheel_noise_threshold: f32,
    /// Wheel input is ignored for this long after a trigger.
    pub wheel_cooldown: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            offset_threshold: 50.0,
            velocity_threshold: 500.0,
            wheel_noise_threshold: 18.0,
            wheel_cooldown: Duration::from_millis(520),
        }
    }
}

/// Advisory text generator configuration.
#[derive(Debug, Clone)]
pub struct AdvisoryConfig {
    /// Chat-completions endpoint.
    pub endpoint: String,
    pub model: String,
    /// Bearer credential. Without it only canned lines are used.
    pub api_key: Option<SecretString>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Response deadline for one request.
    pub deadline: Duration,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: 150,
            deadline: Duration::from_secs(8),
        }
    }
}

/// Top-level configuration, read once at session start.
#[derive(Debug, Clone, Default)]
pub struct FlowConfig {
    pub flow: FlowKind,
    pub motion: MotionPreference,
    pub gesture: GestureConfig,
    pub advisory: AdvisoryConfig,
}

impl FlowConfig {
    /// Build configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(flow) = get("SETLY_FLOW") {
            config.flow = match flow.trim() {
                "card" => FlowKind::Card,
                "walkthrough" => FlowKind::Walkthrough,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "SETLY_FLOW".to_string(),
                        message: format!("expected card or walkthrough, got {other}"),
                    });
                }
            };
        }

        if let Some(reduced) = get("SETLY_REDUCED_MOTION") {
            config.motion = if parse_bool("SETLY_REDUCED_MOTION", &reduced)? {
                MotionPreference::Reduced
            } else {
                MotionPreference::Full
            };
        }

        config.advisory.api_key = get("SETLY_OPENAI_API_KEY")
            .or_else(|| get("OPENAI_API_KEY"))
            .map(SecretString::from);

        if let Some(model) = get("SETLY_ADVISORY_MODEL") {
            config.advisory.model = model;
        }
        if let Some(endpoint) = get("SETLY_ADVISORY_ENDPOINT") {
            config.advisory.endpoint = endpoint;
        }
        if let Some(ms) = get("SETLY_ADVISORY_TIMEOUT_MS") {
            let ms: u64 = ms.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "SETLY_ADVISORY_TIMEOUT_MS".to_string(),
                message: format!("{e}"),
            })?;
            config.advisory.deadline = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got {other}"),
        }),
    }
}
