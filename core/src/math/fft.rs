use num_complex::Complex64;
use rustfft::{num_traits::Zero, Fft, FftPlanner, Length};

/// Helper that wraps the `rustfft` planner for reuse.
pub struct FftHelper {
    fft: std::sync::Arc<dyn Fft<f64>>,
    scratch: Vec<Complex64>,
}

impl FftHelper {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex64::zero(); fft.get_inplace_scratch_len()];
        Self { fft, scratch }
    }

    pub fn len(&self) -> usize {
        self.fft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fft.len() == 0
    }

    /// Forward transform; input is zero-padded or truncated to the planned size.
    pub fn forward(&mut self, input: &[Complex64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input.iter().take(self.len()).copied().collect();
        buffer.resize(self.len(), Complex64::zero());
        if !buffer.is_empty() {
            self.fft.process_with_scratch(&mut buffer, &mut self.scratch);
        }
        buffer
    }
}

/// Moves the zero-frequency bin to the centre of the spectrum.
pub fn fft_shift<T>(spectrum: &mut [T]) {
    let half = spectrum.len() / 2;
    spectrum.rotate_right(half);
}
