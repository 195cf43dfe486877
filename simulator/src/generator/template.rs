use num_complex::Complex64;
use std::f64::consts::PI;

/// Complex exponential of `len` samples at `freq_hz`, sampled at `sample_rate_hz`.
pub fn complex_tone(
    len: usize,
    freq_hz: f64,
    sample_rate_hz: f64,
    amplitude: f64,
) -> Vec<Complex64> {
    let step = 2.0 * PI * freq_hz / sample_rate_hz;
    (0..len)
        .map(|n| Complex64::from_polar(amplitude, step * n as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_has_constant_envelope() {
        let tone = complex_tone(64, 1e3, 8e3, 3.0);
        assert_eq!(tone.len(), 64);
        assert!(tone.iter().all(|s| (s.norm() - 3.0).abs() < 1e-12));
        // 8 samples per cycle
        assert!((tone[8] - tone[0]).norm() < 1e-9);
    }
}
