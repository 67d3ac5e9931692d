//! Load progress reporting.
//!
//! The loader reports one [`LoadEvent::Warning`] per failed source and one
//! [`LoadEvent::Loaded`] after every source, failed or not, so `loaded`
//! climbs from 1 to `total` without gaps. The worker forwards these to the
//! host as `WARN` and `PROGRESS` messages.

/// A single progress event for one source of a load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadEvent {
    /// The source could not contribute records.
    Warning { uri: String, message: String },
    /// `loaded` of `total` sources are done; `uri` is the one just finished.
    Loaded {
        uri: String,
        loaded: usize,
        total: usize,
    },
}

/// Receives load progress. Called from the loader between sources.
pub trait LoadProgressReporter: Send + Sync {
    fn report(&self, event: LoadEvent);
}

/// No-op reporter.
pub struct NoProgress;

impl LoadProgressReporter for NoProgress {
    fn report(&self, _event: LoadEvent) {}
}

impl<F> LoadProgressReporter for F
where
    F: Fn(LoadEvent) + Send + Sync,
{
    fn report(&self, event: LoadEvent) {
        self(event)
    }
}
