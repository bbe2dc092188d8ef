//! Random number generation port for engine-side services.
//!
//! Abstracting the RNG enables deterministic testing and keeps the domain
//! layer free of I/O.

/// Random number generation abstraction for engine-side services.
///
/// # Implementations
///
/// - `ThreadRngAdapter` in `infrastructure` (production, uses `rand::thread_rng()`)
/// - [`FixedRandomPort`] for deterministic testing (returns fixed values)
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait RandomPort: Send + Sync {
    /// Generate a random i32 in range [min, max] (inclusive on both ends)
    fn random_range(&self, min: i32, max: i32) -> i32;
}

/// Fixed random port for deterministic testing.
///
/// Returns values from a provided sequence, cycling if needed, each clamped
/// to the requested range. Thread-safe via atomic operations.
#[derive(Debug)]
pub struct FixedRandomPort {
    values: Vec<i32>,
    index: std::sync::atomic::AtomicUsize,
}

impl FixedRandomPort {
    /// Create a new FixedRandomPort with the given sequence of values.
    pub fn new(values: Vec<i32>) -> Self {
        Self {
            values,
            index: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Create a FixedRandomPort that always returns the same value.
    pub fn constant(value: i32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomPort for FixedRandomPort {
    fn random_range(&self, min: i32, max: i32) -> i32 {
        let idx = self
            .index
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let value = self.values[idx % self.values.len()];
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_random_port_constant() {
        let rng = FixedRandomPort::constant(10);
        assert_eq!(rng.random_range(1, 20), 10);
        assert_eq!(rng.random_range(1, 20), 10);
        assert_eq!(rng.random_range(1, 6), 6); // Clamped to max
        assert_eq!(rng.random_range(15, 20), 15); // Clamped to min
    }

    #[test]
    fn test_fixed_random_port_cycles() {
        let rng = FixedRandomPort::new(vec![1, 2, 3]);
        assert_eq!(rng.random_range(1, 10), 1);
        assert_eq!(rng.random_range(1, 10), 2);
        assert_eq!(rng.random_range(1, 10), 3);
        assert_eq!(rng.random_range(1, 10), 1);
    }
}
