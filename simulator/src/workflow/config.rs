use anyhow::Context;
use phasercore::hardware::{GpioRouting, HardwareSettings, SignalSource};
use phasercore::prelude::{SweepConfiguration, ELEMENT_COUNT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Steering angle range swept, in degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringRange {
    pub start_deg: f64,
    pub stop_deg: f64,
    pub step_deg: f64,
}

impl Default for SteeringRange {
    fn default() -> Self {
        Self {
            start_deg: -90.0,
            stop_deg: 90.0,
            step_deg: 1.0,
        }
    }
}

/// Operating parameters of the Phaser board, read once at start-up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaserConfig {
    pub rpi_uri: String,
    pub sdr_uri: String,
    pub signal_source: SignalSource,
    pub signal_freq_hz: f64,
    pub tx_lo_hz: f64,
    pub rx_lo_hz: f64,
    pub sample_rate_hz: f64,
    pub rx_gain_db: f64,
    pub tx_gain_db: f64,
    pub rx_calibration_deg: [f64; ELEMENT_COUNT],
    pub element_gains: [u8; ELEMENT_COUNT],
    pub element_spacing_m: f64,
    pub buffer_size: usize,
    pub phase_step_deg: f64,
    pub steering: SteeringRange,
}

impl Default for PhaserConfig {
    fn default() -> Self {
        Self {
            rpi_uri: "ip:phaser.local".into(),
            sdr_uri: "ip:192.168.2.1".into(),
            signal_source: SignalSource::Hb100,
            signal_freq_hz: 10.5e9,
            tx_lo_hz: 2.2e9,
            rx_lo_hz: 2.2e9,
            sample_rate_hz: 0.6e6,
            rx_gain_db: 20.0,
            tx_gain_db: -3.0,
            rx_calibration_deg: [0.0; ELEMENT_COUNT],
            element_gains: [100; ELEMENT_COUNT],
            element_spacing_m: 0.014,
            buffer_size: 1024,
            phase_step_deg: 2.8125,
            steering: SteeringRange::default(),
        }
    }
}

impl PhaserConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).with_context(|| {
            format!(
                "reading Phaser config {} (make sure it exists)",
                path_ref.display()
            )
        })?;
        let config: PhaserConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing Phaser config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn to_sweep_configuration(&self, signal_freq_hz: f64) -> SweepConfiguration {
        SweepConfiguration {
            signal_freq_hz,
            element_spacing_m: self.element_spacing_m,
            start_deg: self.steering.start_deg,
            stop_deg: self.steering.stop_deg,
            step_deg: self.steering.step_deg,
            phase_step_deg: self.phase_step_deg,
            calibration_deg: self.rx_calibration_deg,
        }
    }

    pub fn to_hardware_settings(&self, signal_freq_hz: f64) -> HardwareSettings {
        HardwareSettings {
            signal_source: self.signal_source,
            sample_rate_hz: self.sample_rate_hz,
            tx_lo_hz: self.tx_lo_hz,
            rx_lo_hz: self.rx_lo_hz,
            mixer_lo_hz: signal_freq_hz + self.rx_lo_hz,
            rx_gain_db: self.rx_gain_db,
            tx_gain_db: self.tx_gain_db,
            buffer_size: self.buffer_size,
            element_gains: self.element_gains,
            routing: GpioRouting::for_source(self.signal_source),
        }
    }
}
