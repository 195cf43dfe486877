use num_complex::Complex64;

use crate::prelude::SweepError;

/// Simple scoped buffer pool that prevents unbounded allocations.
pub struct BufferPool {
    buffers: Vec<Vec<Complex64>>,
    max_capacity: usize,
    outstanding: usize,
}

impl BufferPool {
    pub fn with_capacity(max_capacity: usize) -> Self {
        Self {
            buffers: Vec::with_capacity(max_capacity),
            max_capacity,
            outstanding: 0,
        }
    }

    /// Hands out an empty buffer with room for `length` samples.
    pub fn checkout(&mut self, length: usize) -> Result<Vec<Complex64>, SweepError> {
        if let Some(mut buffer) = self.buffers.pop() {
            buffer.reserve(length);
            self.outstanding += 1;
            Ok(buffer)
        } else if self.outstanding < self.max_capacity {
            self.outstanding += 1;
            Ok(Vec::with_capacity(length))
        } else {
            Err(SweepError::BufferExhaustion("pool depleted".to_string()))
        }
    }

    /// Returns a buffer back to the pool for reuse.
    pub fn release(&mut self, mut buffer: Vec<Complex64>) {
        buffer.clear();
        self.outstanding = self.outstanding.saturating_sub(1);
        if self.buffers.len() < self.max_capacity {
            self.buffers.push(buffer);
        }
    }

    pub fn reset(&mut self) {
        self.buffers.clear();
        self.outstanding = 0;
    }
}
