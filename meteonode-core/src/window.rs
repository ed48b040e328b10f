//! Fixed-Size Rolling Window for Voltage Smoothing
//!
//! ## Overview
//!
//! A ring of `f32` samples sized at compile time. The battery monitor
//! keeps the last N voltage conversions here and reports their mean, which
//! irons out ADC noise and the sag caused by radio bursts.
//!
//! Storage is a `heapless::HistoryBuffer`: when full, a push overwrites the
//! oldest sample.
//!
//! ```text
//! SampleWindow<4> after pushing 1, 2, 3, 4, 5:
//!
//! logical view (oldest first): [2, 3, 4, 5]
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use meteonode_core::window::SampleWindow;
//!
//! let mut window: SampleWindow<3> = SampleWindow::new();
//! window.push(3.9);
//! window.push(4.1);
//! assert_eq!(window.mean(), Some(4.0));
//! ```

use heapless::HistoryBuffer;

/// Rolling window of the most recent `N` samples; `N` must be non-zero
#[derive(Debug, Clone)]
pub struct SampleWindow<const N: usize> {
    samples: HistoryBuffer<f32, N>,
}

impl<const N: usize> SampleWindow<N> {
    /// Create an empty window
    pub const fn new() -> Self {
        Self { samples: HistoryBuffer::new() }
    }

    /// Append a sample, overwriting the oldest when full
    pub fn push(&mut self, sample: f32) {
        self.samples.write(sample);
    }

    /// Number of stored samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if window is empty
    pub fn is_empty(&self) -> bool {
        self.samples.len() == 0
    }

    /// Check if window is full
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.samples.capacity()
    }

    /// Most recent sample
    pub fn last(&self) -> Option<f32> {
        self.samples.recent().copied()
    }

    /// Arithmetic mean of the stored samples
    pub fn mean(&self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }

        let sum: f32 = self.iter().sum();
        Some(sum / self.len() as f32)
    }

    /// Samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.oldest_ordered().copied()
    }

    /// Drop all samples
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl<const N: usize> Default for SampleWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_window() {
        let window: SampleWindow<5> = SampleWindow::new();
        assert!(window.is_empty());
        assert_eq!(window.mean(), None);
        assert_eq!(window.last(), None);
    }

    #[test]
    fn overwrites_oldest() {
        let mut window = SampleWindow::<3>::new();
        for i in 0..5 {
            window.push(i as f32);
        }

        assert!(window.is_full());
        assert_eq!(window.iter().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
        assert_eq!(window.last(), Some(4.0));
        assert_eq!(window.mean(), Some(3.0));
    }

    #[test]
    fn partial_mean() {
        let mut window = SampleWindow::<10>::new();
        window.push(3.6);
        window.push(3.8);
        let mean = window.mean().unwrap();
        assert!((mean - 3.7).abs() < 1e-6);
    }

    #[test]
    fn wraps_repeatedly() {
        let mut window = SampleWindow::<2>::new();
        for i in 0..7 {
            window.push(i as f32);
        }
        assert_eq!(window.len(), 2);
        assert_eq!(window.iter().collect::<Vec<_>>(), vec![5.0, 6.0]);
    }

    #[test]
    fn clear_resets() {
        let mut window = SampleWindow::<2>::new();
        window.push(1.0);
        window.clear();
        assert!(window.is_empty());
        window.push(2.0);
        assert_eq!(window.iter().collect::<Vec<_>>(), vec![2.0]);
    }
}
