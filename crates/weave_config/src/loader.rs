//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{Calibration, RouterConfig};
use std::path::Path;

/// Loads and validates a router configuration file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a router configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<RouterConfig, ConfigError> {
    let config: RouterConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Loads and validates a timing calibration file.
pub fn load_calibration(path: &Path) -> Result<Calibration, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_calibration_from_str(&content)
}

/// Parses and validates a timing calibration from a string.
pub fn load_calibration_from_str(content: &str) -> Result<Calibration, ConfigError> {
    let calibration: Calibration =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_calibration(&calibration)?;
    Ok(calibration)
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn validate_config(config: &RouterConfig) -> Result<(), ConfigError> {
    let router = &config.router;
    if router.max_iterations == 0 {
        return Err(invalid("router.max_iterations must be at least 1"));
    }
    if !is_positive(router.present_divisor) {
        return Err(invalid("router.present_divisor must be positive"));
    }
    if !is_non_negative(router.history_factor) {
        return Err(invalid("router.history_factor must not be negative"));
    }
    if !is_positive(router.history_decay) || router.history_decay > 1.0 {
        return Err(invalid("router.history_decay must be in (0, 1]"));
    }
    if !is_positive(router.max_history) {
        return Err(invalid("router.max_history must be positive"));
    }
    if config.static_sources.tieoff_type.is_empty() {
        return Err(invalid("static_sources.tieoff_type must not be empty"));
    }
    Ok(())
}

fn validate_calibration(calibration: &Calibration) -> Result<(), ConfigError> {
    let delay = &calibration.delay;
    if !is_non_negative(delay.intrinsic) {
        return Err(invalid("delay.intrinsic must not be negative"));
    }
    if !is_non_negative(delay.per_tile) {
        return Err(invalid("delay.per_tile must not be negative"));
    }
    for wire in &delay.wires {
        if wire.prefix.is_empty() {
            return Err(invalid("delay.wire.prefix must not be empty"));
        }
        if !is_non_negative(wire.delay) {
            return Err(ConfigError::ValidationError(format!(
                "delay for wire prefix '{}' must not be negative",
                wire.prefix
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.router.max_iterations, 100);
        assert_eq!(config.router.history_decay, 0.95);
        assert_eq!(config.static_sources.tieoff_type, "TIEOFF");
        assert_eq!(config.static_sources.vcc_pins, vec!["HARD1", "KEEP1"]);
        assert!(config.log.timing_log.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[router]
max_iterations = 30
discard_existing = true
present_divisor = 4.0
history_factor = 0.5
history_decay = 0.9
max_history = 1000.0

[static_sources]
tieoff_type = "TIE"
gnd_pins = ["ZERO"]
vcc_pins = ["ONE"]
placeholder_prefix = "DUMMY"

[log]
timing_log = "times.jsonl"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.router.max_iterations, 30);
        assert!(config.router.discard_existing);
        assert_eq!(config.router.present_divisor, 4.0);
        assert_eq!(config.static_sources.gnd_pins, vec!["ZERO"]);
        assert_eq!(config.static_sources.placeholder_prefix, "DUMMY");
        assert_eq!(
            config.log.timing_log.as_deref(),
            Some(Path::new("times.jsonl"))
        );
    }

    #[test]
    fn zero_iterations_rejected() {
        let err = load_config_from_str("[router]\nmax_iterations = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn bad_decay_rejected() {
        for decay in ["0.0", "1.5", "-0.1"] {
            let toml = format!("[router]\nhistory_decay = {decay}\n");
            let err = load_config_from_str(&toml).unwrap_err();
            assert!(matches!(err, ConfigError::ValidationError(_)), "{decay}");
        }
        assert!(load_config_from_str("[router]\nhistory_decay = 1.0\n").is_ok());
    }

    #[test]
    fn non_positive_divisor_rejected() {
        let err = load_config_from_str("[router]\npresent_divisor = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn empty_tieoff_type_rejected() {
        let err = load_config_from_str("[static_sources]\ntieoff_type = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn parse_calibration() {
        let toml = r#"
[delay]
intrinsic = 2.0
per_tile = 0.5

[[delay.wire]]
prefix = "GCLK"
delay = 0.25

[[delay.wire]]
prefix = "LV"
delay = 4.0
"#;
        let cal = load_calibration_from_str(toml).unwrap();
        assert_eq!(cal.delay.intrinsic, 2.0);
        assert_eq!(cal.delay.per_tile, 0.5);
        assert_eq!(cal.delay.wires.len(), 2);
        assert_eq!(cal.delay.wire_delay("LV18"), 4.0);
    }

    #[test]
    fn negative_wire_delay_rejected() {
        let toml = "[[delay.wire]]\nprefix = \"X\"\ndelay = -1.0\n";
        let err = load_calibration_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weave.toml");
        std::fs::write(&path, "[router]\nmax_iterations = 7\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.router.max_iterations, 7);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_calibration(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
