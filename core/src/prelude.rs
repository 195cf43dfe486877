use num_complex::{Complex32, Complex64};
use serde::{Deserialize, Serialize};

use crate::hardware::HardwareError;

/// Speed of light in m/s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Number of receive elements on the array (two beamformers, four channels each).
pub const ELEMENT_COUNT: usize = 8;

/// Receiver full-scale code; the ADC is signed 12 bit.
pub const FULL_SCALE_CODE: f64 = 2048.0;

/// Reported in place of `-inf` for empty bins.
pub const DBFS_FLOOR: f64 = -300.0;

/// Upper bound on the number of steering angles in one sweep.
pub const MAX_STEERING_POINTS: usize = 1_000_000;

/// Fixed parameters of one beam sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfiguration {
    pub signal_freq_hz: f64,
    pub element_spacing_m: f64,
    pub start_deg: f64,
    pub stop_deg: f64,
    pub step_deg: f64,
    /// Phase change per beamformer register increment.
    pub phase_step_deg: f64,
    pub calibration_deg: [f64; ELEMENT_COUNT],
}

impl Default for SweepConfiguration {
    fn default() -> Self {
        Self {
            signal_freq_hz: 10.5e9,
            element_spacing_m: 0.014,
            start_deg: -90.0,
            stop_deg: 90.0,
            step_deg: 1.0,
            phase_step_deg: 2.8125,
            calibration_deg: [0.0; ELEMENT_COUNT],
        }
    }
}

impl SweepConfiguration {
    pub fn validate(&self) -> SweepResult<()> {
        let finite = [
            self.signal_freq_hz,
            self.element_spacing_m,
            self.start_deg,
            self.stop_deg,
            self.step_deg,
            self.phase_step_deg,
        ]
        .iter()
        .chain(self.calibration_deg.iter())
        .all(|value| value.is_finite());
        if !finite {
            return Err(SweepError::InvalidConfiguration(
                "parameters must be finite".into(),
            ));
        }
        if self.signal_freq_hz <= 0.0 {
            return Err(SweepError::InvalidConfiguration(
                "signal frequency must be positive".into(),
            ));
        }
        if self.element_spacing_m <= 0.0 {
            return Err(SweepError::InvalidConfiguration(
                "element spacing must be positive".into(),
            ));
        }
        if self.step_deg <= 0.0 || self.phase_step_deg <= 0.0 {
            return Err(SweepError::InvalidConfiguration(
                "steering and phase steps must be positive".into(),
            ));
        }
        if self.start_deg > self.stop_deg {
            return Err(SweepError::InvalidConfiguration(format!(
                "start {} exceeds stop {}",
                self.start_deg, self.stop_deg
            )));
        }
        if self.angle_count().is_none() {
            return Err(SweepError::InvalidConfiguration(format!(
                "steering range {}..{} in steps of {} exceeds {} points",
                self.start_deg, self.stop_deg, self.step_deg, MAX_STEERING_POINTS
            )));
        }
        Ok(())
    }

    /// Number of angles between `start` and `stop`, if within `MAX_STEERING_POINTS`.
    fn angle_count(&self) -> Option<usize> {
        if !self.step_deg.is_finite() || self.step_deg <= 0.0 || self.start_deg > self.stop_deg {
            return None;
        }
        // Tolerance keeps `stop` when the span is an integer number of steps.
        let intervals = ((self.stop_deg - self.start_deg) / self.step_deg + 1e-9).floor();
        if !intervals.is_finite() || intervals >= MAX_STEERING_POINTS as f64 {
            return None;
        }
        (intervals as usize).checked_add(1)
    }

    /// Commanded steering angles, `start` to `stop` inclusive.
    pub fn steering_angles(&self) -> Vec<f64> {
        let count = self.angle_count().unwrap_or(0);
        (0..count)
            .map(|idx| self.start_deg + idx as f64 * self.step_deg)
            .collect()
    }
}

/// One point of the beam pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepSample {
    pub angle_deg: f64,
    pub peak_dbfs: f64,
}

/// Samples from the two receive channels of one capture.
#[derive(Debug, Clone, Default)]
pub struct CapturedBuffer {
    pub channels: [Vec<Complex32>; 2],
}

impl CapturedBuffer {
    pub fn new(rx0: Vec<Complex32>, rx1: Vec<Complex32>) -> Self {
        Self {
            channels: [rx0, rx1],
        }
    }

    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels[0].is_empty()
    }

    /// Writes the element-wise sum of both channels into `out`.
    pub fn sum_into(&self, out: &mut Vec<Complex64>) -> SweepResult<()> {
        let [rx0, rx1] = &self.channels;
        if rx0.len() != rx1.len() {
            return Err(SweepError::InvalidInput(format!(
                "channel lengths differ: {} vs {}",
                rx0.len(),
                rx1.len()
            )));
        }
        out.clear();
        out.extend(rx0.iter().zip(rx1.iter()).map(|(a, b)| {
            Complex64::new(f64::from(a.re) + f64::from(b.re), f64::from(a.im) + f64::from(b.im))
        }));
        Ok(())
    }

    pub fn summed(&self) -> SweepResult<Vec<Complex64>> {
        let mut out = Vec::with_capacity(self.len());
        self.sum_into(&mut out)?;
        Ok(out)
    }
}

/// Ordered result of a complete sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeamPattern {
    pub signal_freq_hz: f64,
    pub samples: Vec<SweepSample>,
}

impl BeamPattern {
    pub fn new(signal_freq_hz: f64) -> Self {
        Self {
            signal_freq_hz,
            samples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn angles(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.angle_deg).collect()
    }

    pub fn amplitudes(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.peak_dbfs).collect()
    }

    /// Strongest sample; the earliest wins a tie.
    pub fn peak(&self) -> Option<SweepSample> {
        self.peak_index().map(|idx| self.samples[idx])
    }

    fn peak_index(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (idx, sample) in self.samples.iter().enumerate() {
            match best {
                Some(current) if self.samples[current].peak_dbfs >= sample.peak_dbfs => {}
                _ => best = Some(idx),
            }
        }
        best
    }

    /// Width of the contiguous region around the peak within 3 dB of it.
    pub fn half_power_beamwidth(&self) -> Option<f64> {
        let peak_idx = self.peak_index()?;
        let threshold = self.samples[peak_idx].peak_dbfs - 3.0;

        let mut low = peak_idx;
        while low > 0 && self.samples[low - 1].peak_dbfs >= threshold {
            low -= 1;
        }
        let mut high = peak_idx;
        while high + 1 < self.samples.len() && self.samples[high + 1].peak_dbfs >= threshold {
            high += 1;
        }
        Some(self.samples[high].angle_deg - self.samples[low].angle_deg)
    }
}

/// Common error type for the sweep.
#[derive(thiserror::Error, Debug)]
pub enum SweepError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("buffer exhaustion: {0}")]
    BufferExhaustion(String),
    #[error("hardware failure: {0}")]
    Hardware(#[from] HardwareError),
}

pub type SweepResult<T> = Result<T, SweepError>;
