//! Progress reporting for the resolution pass.
//!
//! [`ProgressCallback`] decouples progress reporting from any rendering
//! backend. The CLI plugs in `indicatif` bars; tests and library callers
//! use [`NullProgress`].

/// Receives progress updates from long-running operations.
///
/// Implementations must be `Send + Sync` so they can be shared behind an
/// `Arc` across tasks.
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected units of work (enables percentage/ETA).
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// Silently ignores all progress updates.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}
