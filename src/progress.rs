//! Progress-callback trait for per-document and per-file conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the converter works through each source and each output file.
//!
//! # Example
//!
//! ```rust
//! use edgequake_iconset::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     written: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_artifact_complete(&self, stem: &str, file_name: &str) {
//!         self.written.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{stem}: wrote {file_name}");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     written: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the converter as it processes each document.
///
/// Implementations must be `Send + Sync`: with `concurrency > 1` several
/// documents are converted on blocking threads at once, so document-level
/// events for different stems may interleave. All methods have default no-op
/// implementations so callers only override what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after the input directory has been scanned.
    ///
    /// # Arguments
    /// * `total_documents`: number of sources that will be processed
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called before the first file of a bundle is rendered.
    fn on_document_start(&self, stem: &str, index: usize, total_documents: usize) {
        let _ = (stem, index, total_documents);
    }

    /// Called after an output file has been written.
    fn on_artifact_complete(&self, stem: &str, file_name: &str) {
        let _ = (stem, file_name);
    }

    /// Called when an output file was skipped.
    ///
    /// # Arguments
    /// * `error`: human-readable error description
    fn on_artifact_error(&self, stem: &str, file_name: &str, error: &str) {
        let _ = (stem, file_name, error);
    }

    /// Called when every file of a bundle has been attempted, or when the
    /// document itself failed (`written == 0`, `failed == 0`).
    fn on_document_complete(&self, stem: &str, written: usize, failed: usize) {
        let _ = (stem, written, failed);
    }

    /// Called once after all documents have been attempted.
    ///
    /// # Arguments
    /// * `total_documents`: documents found by the scan
    /// * `complete_count` : bundles with no skipped file
    fn on_batch_complete(&self, total_documents: usize, complete_count: usize) {
        let _ = (total_documents, complete_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        documents: Arc<AtomicUsize>,
        written: Arc<AtomicUsize>,
        errors: Arc<AtomicUsize>,
        batch_total: Arc<AtomicUsize>,
        complete_total: Arc<AtomicUsize>,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total_documents: usize) {
            self.batch_total.store(total_documents, Ordering::SeqCst);
        }

        fn on_document_start(&self, _stem: &str, _index: usize, _total: usize) {
            self.documents.fetch_add(1, Ordering::SeqCst);
        }

        fn on_artifact_complete(&self, _stem: &str, _file_name: &str) {
            self.written.fetch_add(1, Ordering::SeqCst);
        }

        fn on_artifact_error(&self, _stem: &str, _file_name: &str, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _total: usize, complete_count: usize) {
            self.complete_total.store(complete_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_document_start("logo", 1, 2);
        cb.on_artifact_complete("logo", "favicon.png");
        cb.on_artifact_error("logo", "logo-16x16.png", "render failed");
        cb.on_document_complete("logo", 14, 1);
        cb.on_batch_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            documents: Arc::new(AtomicUsize::new(0)),
            written: Arc::new(AtomicUsize::new(0)),
            errors: Arc::new(AtomicUsize::new(0)),
            batch_total: Arc::new(AtomicUsize::new(0)),
            complete_total: Arc::new(AtomicUsize::new(0)),
        };

        tracker.on_batch_start(2);
        assert_eq!(tracker.batch_total.load(Ordering::SeqCst), 2);

        tracker.on_document_start("logo", 1, 2);
        tracker.on_artifact_complete("logo", "logo-16x16.png");
        tracker.on_artifact_complete("logo", "favicon.ico");
        tracker.on_document_start("mark", 2, 2);
        tracker.on_artifact_error("mark", "mark-16x16.png", "bad markup");

        assert_eq!(tracker.documents.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.written.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);

        tracker.on_batch_complete(2, 1);
        assert_eq!(tracker.complete_total.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn ConversionProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10);
        cb.on_document_start("logo", 1, 10);
        cb.on_artifact_complete("logo", "favicon.png");
    }
}
