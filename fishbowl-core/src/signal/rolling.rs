//! Trailing mean with a capped window.
//!
//! Unlike a classic SMA there is no warmup region: with fewer than `window`
//! values seen, the mean covers whatever exists so far. First value in gives
//! the value itself.

/// Incremental trailing mean over the last `window` pushed values.
#[derive(Debug, Clone)]
pub struct TrailingMean {
    window: usize,
    values: Vec<f64>,
    sum: f64,
}

impl TrailingMean {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "window must be >= 1");
        Self {
            window,
            values: Vec::new(),
            sum: 0.0,
        }
    }

    /// Push the next value and return the trailing mean ending at it.
    pub fn push(&mut self, value: f64) -> f64 {
        self.values.push(value);
        self.sum += value;
        let n = self.values.len();
        if n > self.window {
            self.sum -= self.values[n - 1 - self.window];
        }
        self.sum / n.min(self.window) as f64
    }

    /// Number of values pushed so far.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
