//! Progress events emitted while resolving
//!
//! Consumers hold the receiving end of an unbounded channel; the engine
//! and the searcher only ever send. A dropped receiver silences events
//! without affecting the resolution.

use crate::search::SkippedEntry;
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A candidate passed the executable check
    Confirmed { name: String, path: PathBuf },
    /// A drive or directory walk began
    DriveStarted { root: PathBuf },
    /// A drive or directory walk ended
    DriveFinished { root: PathBuf, confirmed: usize },
    /// An entry could not be read and was skipped
    Skipped(SkippedEntry),
}

/// Sending half handed to the engine
pub type ProgressSink = mpsc::UnboundedSender<ProgressEvent>;

/// Create a connected sink and receiver
pub fn channel() -> (ProgressSink, mpsc::UnboundedReceiver<ProgressEvent>) {
    mpsc::unbounded_channel()
}

pub(crate) fn emit(sink: Option<&ProgressSink>, event: ProgressEvent) {
    if let Some(sink) = sink {
        // Receiver gone
        let _ = sink.send(event);
    }
}
