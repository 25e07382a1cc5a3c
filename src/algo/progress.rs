//! Progress reporting for long-running algorithms.
//!
//! Sharp-point detection is quadratic in the vertex count and smoothing runs
//! for a caller-chosen number of passes, so both accept a [`Progress`] in
//! their `_with_progress` variants.
//!
//! # Example
//!
//! ```
//! use chisel::algo::progress::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     eprintln!("[{}/{}] {}", current, total, message);
//! });
//! progress.report(1, 4, "Scoring vertices");
//! ```

/// A progress callback that receives `(current, total, message)` updates.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Report every `stride`-th step, plus the final one.
    ///
    /// Keeps callbacks cheap in per-vertex loops.
    #[inline]
    pub fn report_every(&self, stride: usize, current: usize, total: usize, message: &str) {
        if stride == 0 || current % stride == 0 || current == total {
            self.report(current, total, message);
        }
    }

    /// A reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
