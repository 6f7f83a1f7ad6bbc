#![forbid(unsafe_code)]

//! Backend configuration.
//!
//! Loaded once when the host starts the backend, from TOML or JSON:
//!
//! ```toml
//! ui_scale = 1.5
//! stale_event_window_ms = 100
//! shadow_enabled = true
//! log_filter = "sbx=debug"
//! ```
//!
//! Every field has a default, so an empty document is a valid config.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables of one [`crate::Backend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Multiplier applied to explicit `size=` image options.
    pub ui_scale: f64,
    /// Mouse events older than this are dropped unless a button is held.
    pub stale_event_window_ms: u64,
    /// Whether shadow options reach the shadow capability.
    pub shadow_enabled: bool,
    /// Default `tracing` filter when `SBX_LOG` is unset.
    pub log_filter: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            ui_scale: 1.0,
            stale_event_window_ms: 100,
            shadow_enabled: true,
            log_filter: "info".to_string(),
        }
    }
}

impl BackendConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str::<Self>(s)
            .map_err(ConfigError::Toml)?
            .validated()
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Self>(s)
            .map_err(ConfigError::Json)?
            .validated()
    }

    /// Check every field. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.ui_scale.is_finite() || self.ui_scale <= 0.0 {
            errors.push(format!("ui_scale must be finite and > 0, got {}", self.ui_scale));
        }
        if self.stale_event_window_ms == 0 {
            errors.push("stale_event_window_ms must be > 0".into());
        }
        if self.log_filter.trim().is_empty() {
            errors.push("log_filter must not be empty".into());
        }

        errors
    }

    /// `self` if valid, else [`ConfigError::Validation`].
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    #[must_use]
    pub fn stale_event_window(&self) -> Duration {
        Duration::from_millis(self.stale_event_window_ms)
    }
}

/// Errors raised while loading a [`BackendConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Json(serde_json::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => write!(f, "validation errors: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

impl From<ConfigError> for sbx_core::SbxError {
    fn from(err: ConfigError) -> Self {
        sbx_core::SbxError::invalid(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = BackendConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.stale_event_window(), Duration::from_millis(100));
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(BackendConfig::from_toml_str("").unwrap(), BackendConfig::default());
    }

    #[test]
    fn toml_overrides_fields() {
        let config = BackendConfig::from_toml_str(
            "ui_scale = 2.0\nstale_event_window_ms = 250\nshadow_enabled = false\n",
        )
        .unwrap();
        assert_eq!(config.ui_scale, 2.0);
        assert_eq!(config.stale_event_window_ms, 250);
        assert!(!config.shadow_enabled);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn json_round_trip() {
        let config = BackendConfig {
            ui_scale: 1.25,
            log_filter: "sbx.scene=trace".into(),
            ..BackendConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(BackendConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn validation_collects_every_problem() {
        let config = BackendConfig {
            ui_scale: f64::NAN,
            stale_event_window_ms: 0,
            log_filter: "  ".into(),
            ..BackendConfig::default()
        };
        assert_eq!(config.validate().len(), 3);
        match config.validated() {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_documents_are_rejected() {
        assert!(matches!(
            BackendConfig::from_toml_str("ui_scale = \"big\""),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            BackendConfig::from_json_str("{\"ui_scale\": -1.0}"),
            Err(ConfigError::Validation(_))
        ));
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            BackendConfig::from_toml_file(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scriptbox.toml");
        std::fs::write(&path, "ui_scale = 0.5\n").unwrap();
        assert_eq!(BackendConfig::from_toml_file(&path).unwrap().ui_scale, 0.5);
    }
}
