use crate::models::error::CaptureError;

/// Reallocate-on-demand `f32` scratch storage.
///
/// Capacity only grows, and always to exactly the requested size. Contents
/// past what a caller rewrites are unspecified, so callers fill the region
/// they read. A failed growth leaves the previous storage untouched.
#[derive(Debug, Default)]
pub struct GrowableBuffer {
    storage: Vec<f32>,
}

impl GrowableBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow to at least `capacity` samples.
    pub fn ensure(&mut self, capacity: usize) -> Result<(), CaptureError> {
        let current = self.storage.len();
        if current >= capacity {
            return Ok(());
        }

        self.storage
            .try_reserve_exact(capacity - current)
            .map_err(|_| CaptureError::BufferAllocation { requested: capacity })?;
        self.storage.resize(capacity, 0.0);
        Ok(())
    }

    /// Number of samples the buffer can hold without growing.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn is_allocated(&self) -> bool {
        !self.storage.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.storage
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.storage
    }

    /// Free the storage and drop capacity back to zero.
    pub fn release(&mut self) {
        self.storage = Vec::new();
    }
}
