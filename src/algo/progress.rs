//! Progress reporting for long-running operations.
//!
//! Reprojection of large geometries and asset loading both accept a
//! [`Progress`] so callers can drive a progress bar or a log line.
//!
//! # Example
//!
//! ```
//! use triplanar::algo::Progress;
//! use triplanar::algo::parameterize::{reset_uvs_with_progress, PlanarOptions};
//! use triplanar::geometry::primitives::box_geometry;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//!
//! let mut wall = box_geometry(17.0, 15.0, 2.0).unwrap();
//! reset_uvs_with_progress(&mut wall, &PlanarOptions::default(), &progress).unwrap();
//! ```

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives:
/// - `current`: Units of work completed so far
/// - `total`: Total units of work
/// - `message`: Description of the current operation
///
/// The callback may be invoked from worker threads.
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

    /// Report that all `total` units are done.
    #[inline]
    pub fn finish(&self, total: usize, message: &str) {
        (self.callback)(total, total, message);
    }

    /// Report progress within a sub-range.
    ///
    /// Maps progress from `[0, sub_total]` to `[range_current, range_current + 1]`
    /// within a total of `range_total` steps, so a multi-stage operation can
    /// give each stage one slice of the bar.
    #[inline]
    pub fn report_sub(
        &self,
        sub_current: usize,
        sub_total: usize,
        range_current: usize,
        range_total: usize,
        message: &str,
    ) {
        if sub_total == 0 || range_total == 0 {
            return;
        }
        // Fixed-point with three decimal digits.
        let sub_fraction = (sub_current.min(sub_total) * 1000) / sub_total;
        let effective = range_current * 1000 + sub_fraction;
        let total_scaled = range_total * 1000;
        (self.callback)(effective, total_scaled, message);
    }

    /// Create a no-op progress reporter that discards all updates.
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
