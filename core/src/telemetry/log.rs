use log::{debug, info};

use crate::prelude::SweepSample;

pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    pub fn record_step(&self, phase_delta_deg: f64, sample: &SweepSample) {
        debug!(
            "phase delta {:8.3} deg -> steer {:7.2} deg, peak {:7.2} dBFS",
            phase_delta_deg, sample.angle_deg, sample.peak_dbfs
        );
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
