use crate::generator::scene::SceneConfig;
use phasercore::prelude::BeamPattern;
use serde::{Deserialize, Serialize};

/// Snapshot of the latest beam pattern served to the visualizer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizationModel {
    pub angles_deg: Vec<f64>,
    pub peak_dbfs: Vec<f64>,
    pub signal_freq_hz: f64,
    pub peak_angle_deg: Option<f64>,
    pub peak_value_dbfs: Option<f64>,
    pub beamwidth_deg: Option<f64>,
    pub scene: Option<SceneConfig>,
}

impl VisualizationModel {
    pub fn from_pattern(pattern: &BeamPattern, scene: &SceneConfig) -> Self {
        let peak = pattern.peak();
        Self {
            angles_deg: pattern.angles(),
            peak_dbfs: pattern.amplitudes(),
            signal_freq_hz: pattern.signal_freq_hz,
            peak_angle_deg: peak.map(|p| p.angle_deg),
            peak_value_dbfs: peak.map(|p| p.peak_dbfs),
            beamwidth_deg: pattern.half_power_beamwidth(),
            scene: Some(scene.clone()),
        }
    }
}
