//! Configuration types for hosts embedding the wizard engine.
//!
//! `WizardConfig` represents a `wizard.toml` file. All fields have defaults,
//! so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Top-level host configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WizardConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Engine-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Raise transition logs from `trace` to `info`.
    #[serde(default)]
    pub debug: bool,

    /// Capacity of the broadcast event bus.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_event_capacity() -> usize {
    64
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debug: false,
            event_capacity: default_event_capacity(),
        }
    }
}

/// Logging and trace export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[serde(default)]
    pub otel: bool,
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            otel: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wizard_config_default_values() {
        let config = WizardConfig::default();
        assert!(!config.engine.debug);
        assert_eq!(config.engine.event_capacity, 64);
        assert_eq!(config.telemetry.log_filter, "warn");
        assert!(!config.telemetry.otel);
    }

    #[test]
    fn test_wizard_config_deserialize_empty() {
        let config: WizardConfig = toml::from_str("").unwrap();
        assert_eq!(config.engine.event_capacity, 64);
        assert_eq!(config.telemetry.log_filter, "warn");
    }

    #[test]
    fn test_wizard_config_deserialize_with_values() {
        let toml_str = r#"
[engine]
debug = true
event_capacity = 256

[telemetry]
log_filter = "info,wizard_core=debug"
otel = true
"#;
        let config: WizardConfig = toml::from_str(toml_str).unwrap();
        assert!(config.engine.debug);
        assert_eq!(config.engine.event_capacity, 256);
        assert_eq!(config.telemetry.log_filter, "info,wizard_core=debug");
        assert!(config.telemetry.otel);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: WizardConfig = toml::from_str("[engine]\ndebug = true\n").unwrap();
        assert!(config.engine.debug);
        assert_eq!(config.engine.event_capacity, 64);
        assert!(!config.telemetry.otel);
    }
}
