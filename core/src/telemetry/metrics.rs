use std::sync::Mutex;

/// Counts sweep steps and the errors that ended a sweep.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

struct Metrics {
    steps: usize,
    errors: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics { steps: 0, errors: 0 }),
        }
    }

    pub fn record_step(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.steps += 1;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.errors += 1;
        }
    }

    /// `(steps, errors)`
    pub fn snapshot(&self) -> (usize, usize) {
        if let Ok(metrics) = self.inner.lock() {
            (metrics.steps, metrics.errors)
        } else {
            (0, 0)
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
