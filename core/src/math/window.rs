use std::f64::consts::PI;

/// Symmetric Hamming window of `len` coefficients.
pub fn hamming(len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (len - 1) as f64;
            (0..len)
                .map(|n| 0.54 - 0.46 * (2.0 * PI * n as f64 / denom).cos())
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hamming_is_symmetric_with_fixed_edges() {
        let window = hamming(9);
        assert_eq!(window.len(), 9);
        assert!((window[0] - 0.08).abs() < 1e-12);
        assert!((window[4] - 1.0).abs() < 1e-12);
        for idx in 0..9 {
            assert!((window[idx] - window[8 - idx]).abs() < 1e-12);
        }
    }

    #[test]
    fn hamming_degenerate_lengths() {
        assert!(hamming(0).is_empty());
        assert_eq!(hamming(1), vec![1.0]);
    }
}
