//! Base node delays derived from the timing calibration.

use weave_common::TileRect;
use weave_config::{Calibration, DelayCalibration};
use weave_device::{Device, TileId, WireId};

/// Converts calibration data into per-node base delays and distance costs.
#[derive(Clone, Debug)]
pub struct DelayModel {
    calibration: DelayCalibration,
}

impl DelayModel {
    /// Builds the model from a loaded calibration.
    pub fn from_calibration(calibration: &Calibration) -> Self {
        Self {
            calibration: calibration.delay.clone(),
        }
    }

    /// Cost per tile of distance.
    pub fn per_tile(&self) -> f64 {
        self.calibration.per_tile
    }

    /// Base delay of a node made of `wires` and covering `bbox`.
    ///
    /// Never below `per_tile * span`, so a node cannot bring the frontier
    /// closer to a target than it costs to enter it.
    pub fn node_delay(&self, device: &Device, wires: &[(TileId, WireId)], bbox: &TileRect) -> f64 {
        let wire_delay = wires
            .iter()
            .map(|&(_, w)| self.calibration.wire_delay(device.wire_name(w)))
            .fold(0.0, f64::max);
        wire_delay.max(self.distance_cost(bbox.span()))
    }

    /// Cost of covering `tiles` Manhattan tiles.
    pub fn distance_cost(&self, tiles: u32) -> f64 {
        self.calibration.per_tile * f64::from(tiles)
    }
}

impl Default for DelayModel {
    fn default() -> Self {
        Self::from_calibration(&Calibration::default())
    }
}
