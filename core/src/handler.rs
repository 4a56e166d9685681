//! Callback contracts for asynchronous operations.
//!
//! A handler receives zero or more progress notifications followed by
//! exactly one terminal result, all on the dispatcher's thread. Failures
//! never cross the async boundary as errors; they arrive wrapped in a
//! `Progress` notification, after which the terminal callback receives
//! `None`.

use tracing::warn;

use crate::entity::Entity;
use crate::error::ApiError;

/// A progress notification: either an incremental numeric value or a
/// failure captured on the background thread.
#[derive(Debug)]
pub enum Progress {
    Value(u32),
    Failed(ApiError),
}

impl Progress {
    /// The numeric progress value, if this is not a failure.
    pub fn value(&self) -> Option<u32> {
        match self {
            Progress::Value(value) => Some(*value),
            Progress::Failed(_) => None,
        }
    }

    /// The captured failure, if any.
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Progress::Value(_) => None,
            Progress::Failed(err) => Some(err),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Progress::Failed(_))
    }
}

/// Callback contract for operations that yield a single entity.
pub trait EntityHandler<T: Entity>: Send + 'static {
    /// Called zero or more times while the operation runs; failures arrive
    /// here before the terminal callback.
    fn handle_progress(&mut self, progress: &[Progress]);

    /// Called exactly once when the operation finishes. `None` when the
    /// operation failed or the server returned no entity.
    fn handle_result(&mut self, result: Option<T>);
}

/// Callback contract for operations that yield an ordered collection.
pub trait CollectionHandler<T: Entity>: Send + 'static {
    /// Called zero or more times while the operation runs; failures arrive
    /// here before the terminal callback.
    fn handle_progress(&mut self, progress: &[Progress]);

    /// Called exactly once when the operation finishes. `None` when the
    /// operation failed.
    fn handle_results(&mut self, results: Option<Vec<T>>);
}

/// Default handler that surfaces failures as warning events and discards
/// results. Register it for fire-and-forget operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl LoggingHandler {
    fn log(progress: &[Progress]) {
        for p in progress {
            if let Some(err) = p.error() {
                warn!(error = %err, "background operation failed");
            }
        }
    }
}

impl<T: Entity> EntityHandler<T> for LoggingHandler {
    fn handle_progress(&mut self, progress: &[Progress]) {
        Self::log(progress);
    }

    fn handle_result(&mut self, _result: Option<T>) {}
}

impl<T: Entity> CollectionHandler<T> for LoggingHandler {
    fn handle_progress(&mut self, progress: &[Progress]) {
        Self::log(progress);
    }

    fn handle_results(&mut self, _results: Option<Vec<T>>) {}
}
