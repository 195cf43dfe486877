use phasercore::prelude::ELEMENT_COUNT;
use serde::{Deserialize, Serialize};

/// Synthetic surroundings seen by the simulated Phaser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Direction of arrival of the tone, degrees off boresight.
    pub source_angle_deg: f64,
    /// Per-element tone amplitude at the ADC, in codes.
    pub amplitude_codes: f64,
    /// Baseband offset of the tone after down-conversion.
    pub tone_offset_hz: f64,
    /// Half-width of the uniform noise added to I and Q, in codes.
    pub noise_codes: f64,
    pub seed: u64,
    /// Uncalibrated phase error of each element's receive path.
    pub element_phase_error_deg: [f64; ELEMENT_COUNT],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            source_angle_deg: 0.0,
            amplitude_codes: 60.0,
            tone_offset_hz: 20e3,
            noise_codes: 1.0,
            seed: 7,
            element_phase_error_deg: [0.0; ELEMENT_COUNT],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_scene_json_keeps_defaults() {
        let scene: SceneConfig =
            serde_json::from_str(r#"{"source_angle_deg": -30.0, "seed": 99}"#).unwrap();
        assert_eq!(scene.source_angle_deg, -30.0);
        assert_eq!(scene.seed, 99);
        assert_eq!(scene.amplitude_codes, 60.0);
    }
}
