pub struct StatsHelper;

impl StatsHelper {
    /// Largest value, ignoring NaN; `None` for an empty slice.
    pub fn max(values: &[f64]) -> Option<f64> {
        values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .max_by(|a, b| a.total_cmp(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_of_empty_is_none() {
        assert_eq!(StatsHelper::max(&[]), None);
    }

    #[test]
    fn max_skips_nan() {
        assert_eq!(StatsHelper::max(&[-3.0, f64::NAN, -1.5, -9.0]), Some(-1.5));
    }
}
