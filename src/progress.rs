//! Progress-callback trait for per-file job events.
//!
//! Inject an [`Arc<dyn JobProgressCallback>`] via
//! [`crate::config::JobConfigBuilder::progress_callback`] to receive events
//! as the job walks its working set.
//!
//! # Why callbacks instead of channels?
//!
//! Callers can forward events to a terminal progress bar, a service log or a
//! database record without the library knowing how the host communicates.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdfjob::{JobConfig, JobProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl JobProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, file_name: &str, index: usize, total: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{file_name} done ({index}/{total})");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = JobConfig::builder()
//!     .out_dir("/srv/pdfjob/out")
//!     .progress_callback(counter as Arc<dyn JobProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the job runner as it processes files.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `index` is 1-based.
pub trait JobProgressCallback: Send + Sync {
    /// Called once the action is known and the working set is listed.
    ///
    /// # Arguments
    /// * `action`: display name of the selected action
    /// * `total_files`: number of files the action will visit
    fn on_job_start(&self, action: &str, total_files: usize) {
        let _ = (action, total_files);
    }

    /// Called before a file is processed.
    fn on_file_start(&self, file_name: &str, index: usize, total: usize) {
        let _ = (file_name, index, total);
    }

    /// Called when a file was processed without error.
    fn on_file_complete(&self, file_name: &str, index: usize, total: usize) {
        let _ = (file_name, index, total);
    }

    /// Called when a file's processing recorded an error.
    ///
    /// # Arguments
    /// * `error`: human-readable error description
    fn on_file_error(&self, file_name: &str, index: usize, total: usize, error: &str) {
        let _ = (file_name, index, total, error);
    }

    /// Called once after packaging, whether or not errors were recorded.
    ///
    /// # Arguments
    /// * `error_count`: records written to the error manifest
    fn on_job_complete(&self, error_count: usize) {
        let _ = error_count;
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl JobProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::JobConfig`].
pub type ProgressCallback = Arc<dyn JobProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: Mutex<Vec<String>>,
        final_errors: AtomicUsize,
    }

    impl JobProgressCallback for TrackingCallback {
        fn on_file_start(&self, _file_name: &str, _index: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _file_name: &str, _index: usize, _total: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_error(&self, file_name: &str, _index: usize, _total: usize, _error: &str) {
            self.errors.lock().unwrap().push(file_name.to_string());
        }

        fn on_job_complete(&self, error_count: usize) {
            self.final_errors.store(error_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_job_start("Split", 2);
        cb.on_file_start("a.pdf", 1, 2);
        cb.on_file_complete("a.pdf", 1, 2);
        cb.on_file_error("b.pdf", 2, 2, "broken");
        cb.on_job_complete(1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_file_start("a.pdf", 1, 2);
        tracker.on_file_complete("a.pdf", 1, 2);
        tracker.on_file_start("b.pdf", 2, 2);
        tracker.on_file_error("b.pdf", 2, 2, "password protected");
        tracker.on_job_complete(1);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(*tracker.errors.lock().unwrap(), vec!["b.pdf".to_string()]);
        assert_eq!(tracker.final_errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_job_start("TextConvert", 1);
        cb.on_file_complete("a.pdf", 1, 1);
    }
}
