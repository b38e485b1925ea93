//! Progress callbacks for mesh passes.
//!
//! A pass such as welding receives a [`Progress`] through its options and
//! reports once per phase boundary and periodically inside long phases.
//!
//! # Example
//!
//! ```
//! use hbmesh::algo::progress::Progress;
//! use hbmesh::algo::weld::WeldOptions;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//!
//! let options = WeldOptions::default().with_progress(progress);
//! ```

/// Resolution of one phase in [`Progress::report_sub`] updates.
const STEPS_PER_PHASE: usize = 1000;

/// Callback invoked as a mesh pass advances.
///
/// Arguments are `(current, total, message)`, where `message` names the
/// phase being worked on. The callback may be called from any thread.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Wrap a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report `current` of `total` steps.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Report `step` of `steps` inside phase `phase` of `phases`.
    ///
    /// Each phase spans 1000 reported steps, so the callback
    /// sees one monotonic count across every phase of a pass. Empty step or
    /// phase ranges report nothing.
    ///
    /// # Example
    ///
    /// ```
    /// use hbmesh::algo::Progress;
    ///
    /// // Phase 0 of 2 is halfway done
    /// let progress = Progress::new(|current, total, _| assert_eq!((current, total), (500, 2000)));
    /// progress.report_sub(50, 100, 0, 2, "Clustering vertices");
    /// ```
    #[inline]
    pub fn report_sub(&self, step: usize, steps: usize, phase: usize, phases: usize, message: &str) {
        if steps == 0 || phases == 0 {
            return;
        }
        let within = step * STEPS_PER_PHASE / steps;
        (self.callback)(
            phase * STEPS_PER_PHASE + within,
            phases * STEPS_PER_PHASE,
            message,
        );
    }

    /// A reporter that drops every update.
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
