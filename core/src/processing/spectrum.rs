//! Windowed FFT scaled to dBFS, used to measure the received tone.

use num_complex::Complex64;

use crate::math::{fft_shift, hamming, FftHelper, StatsHelper};
use crate::prelude::{SweepError, SweepResult, DBFS_FLOOR, FULL_SCALE_CODE};

/// Plans the FFT and window once and reuses them while the buffer size holds.
pub struct SpectrumAnalyzer {
    fft: Option<FftHelper>,
    window: Vec<f64>,
    window_sum: f64,
}

impl SpectrumAnalyzer {
    pub fn new(len: usize) -> Self {
        let mut analyzer = Self {
            fft: None,
            window: Vec::new(),
            window_sum: 0.0,
        };
        analyzer.plan(len);
        analyzer
    }

    fn plan(&mut self, len: usize) {
        if len == 0 {
            self.fft = None;
            self.window.clear();
            self.window_sum = 0.0;
            return;
        }
        self.fft = Some(FftHelper::new(len));
        self.window = hamming(len);
        self.window_sum = self.window.iter().sum();
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Sum of the window coefficients, the coherent gain times the length.
    pub fn window_sum(&self) -> f64 {
        self.window_sum
    }

    /// Centred magnitude spectrum in dBFS; empty bins read as [`DBFS_FLOOR`].
    pub fn dbfs(&mut self, samples: &[Complex64]) -> Vec<f64> {
        if samples.is_empty() {
            return Vec::new();
        }
        if samples.len() != self.len() {
            self.plan(samples.len());
        }
        let Some(fft) = self.fft.as_mut() else {
            return Vec::new();
        };

        let windowed: Vec<Complex64> = samples
            .iter()
            .zip(self.window.iter())
            .map(|(sample, &w)| sample * w)
            .collect();
        let mut spectrum = fft.forward(&windowed);
        fft_shift(&mut spectrum);

        spectrum
            .iter()
            .map(|bin| magnitude_to_dbfs(bin.norm() / self.window_sum))
            .collect()
    }

    /// Largest bin of [`Self::dbfs`].
    pub fn peak_dbfs(&mut self, samples: &[Complex64]) -> SweepResult<f64> {
        let spectrum = self.dbfs(samples);
        StatsHelper::max(&spectrum)
            .ok_or_else(|| SweepError::InvalidInput("no samples to analyze".into()))
    }
}

fn magnitude_to_dbfs(magnitude: f64) -> f64 {
    if magnitude <= 0.0 {
        return DBFS_FLOOR;
    }
    (20.0 * (magnitude / FULL_SCALE_CODE).log10()).max(DBFS_FLOOR)
}
