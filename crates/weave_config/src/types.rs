//! Configuration types deserialized from `weave.toml` and the calibration file.

use serde::Deserialize;
use std::path::PathBuf;

/// The top-level router configuration parsed from `weave.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Negotiated-congestion settings.
    pub router: RouterSettings,
    /// Where constant-0 and constant-1 drivers live in the device.
    pub static_sources: StaticSourceConfig,
    /// Optional run logs.
    pub log: LogConfig,
}

/// Knobs of the negotiated-congestion loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Global iteration cap. Reaching it without convergence fails the run.
    pub max_iterations: u32,
    /// Clear every existing PIP and route all nets instead of only unrouted ones.
    pub discard_existing: bool,
    /// Present-congestion scale is `(iteration + 1) / present_divisor`.
    pub present_divisor: f64,
    /// Amount added to historical overuse per unit of overuse per iteration.
    pub history_factor: f64,
    /// Multiplicative decay of historical overuse per elapsed iteration.
    pub history_decay: f64,
    /// Upper bound for historical overuse; larger values are clamped with a warning.
    pub max_history: f64,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            discard_existing: false,
            present_divisor: 6.0,
            history_factor: 1.0,
            history_decay: 0.95,
            max_history: 1.0e6,
        }
    }
}

/// Tie-off conventions used to resolve static-net sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticSourceConfig {
    /// Primitive type of tie-off sites.
    pub tieoff_type: String,
    /// Tie-off output pins that drive constant 0.
    pub gnd_pins: Vec<String>,
    /// Tie-off output pins that drive constant 1.
    pub vcc_pins: Vec<String>,
    /// Name prefix for driver instances created when splitting static nets.
    pub placeholder_prefix: String,
}

impl Default for StaticSourceConfig {
    fn default() -> Self {
        Self {
            tieoff_type: "TIEOFF".to_string(),
            gnd_pins: vec!["HARD0".to_string()],
            vcc_pins: vec!["HARD1".to_string(), "KEEP1".to_string()],
            placeholder_prefix: "XDL_DUMMY".to_string(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Per-net, per-iteration timing log written as JSON lines.
    pub timing_log: Option<PathBuf>,
}

/// Timing calibration parsed from the calibration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Wire delay settings.
    pub delay: DelayCalibration,
}

/// Base delays feeding the router cost model.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DelayCalibration {
    /// Delay of a wire with no matching prefix override.
    pub intrinsic: f64,
    /// Cost per tile of node span; also the heuristic weight per tile of distance.
    pub per_tile: f64,
    /// Per-prefix overrides. The longest matching prefix wins.
    #[serde(rename = "wire")]
    pub wires: Vec<WireDelay>,
}

impl Default for DelayCalibration {
    fn default() -> Self {
        Self {
            intrinsic: 1.0,
            per_tile: 1.0,
            wires: Vec::new(),
        }
    }
}

/// A delay override for all wires whose name starts with `prefix`.
#[derive(Debug, Clone, Deserialize)]
pub struct WireDelay {
    /// Wire-name prefix.
    pub prefix: String,
    /// Delay assigned to matching wires.
    pub delay: f64,
}

impl DelayCalibration {
    /// Returns the delay for a wire name, using the longest matching prefix override.
    pub fn wire_delay(&self, wire: &str) -> f64 {
        self.wires
            .iter()
            .filter(|w| wire.starts_with(&w.prefix))
            .max_by_key(|w| w.prefix.len())
            .map_or(self.intrinsic, |w| w.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_defaults() {
        let settings = RouterSettings::default();
        assert_eq!(settings.max_iterations, 100);
        assert!(!settings.discard_existing);
        assert_eq!(settings.present_divisor, 6.0);
    }

    #[test]
    fn wire_delay_longest_prefix() {
        let cal = DelayCalibration {
            intrinsic: 1.0,
            per_tile: 1.0,
            wires: vec![
                WireDelay {
                    prefix: "G".into(),
                    delay: 3.0,
                },
                WireDelay {
                    prefix: "GCLK".into(),
                    delay: 0.5,
                },
            ],
        };
        assert_eq!(cal.wire_delay("GCLK7"), 0.5);
        assert_eq!(cal.wire_delay("GFAN0"), 3.0);
        assert_eq!(cal.wire_delay("EBEG0"), 1.0);
    }
}
