//! Progress reporting for ingestion runs.
//!
//! A run moves through fixed phases, each owning a band of the 0-100 scale:
//!
//! | Phase | Band |
//! |-------|------|
//! | [`Phase::Loading`] | 0 - 10 |
//! | [`Phase::Processing`] | 10 - 95, linear in folders completed |
//! | [`Phase::Finalizing`] | 95 - 100 |
//! | [`Phase::Done`] | 100 |
//!
//! [`report`] is a pure mapping from (phase, completed, total) to a
//! [`ProgressEvent`]. Because the bands are ordered and each band is
//! monotonic in `completed`, a run that reports phases in order never sees
//! the percentage go down.
//!
//! # Example
//!
//! ```rust
//! use inboxpack::progress::{Phase, ProgressCallback, ProgressEvent, report};
//! use std::sync::Arc;
//!
//! let callback: ProgressCallback = Arc::new(|event: ProgressEvent| {
//!     println!("{:>5.1}% {}", event.percentage, event.label);
//! });
//!
//! callback(report(Phase::Processing, 3, 10));
//! assert_eq!(report(Phase::Done, 0, 0).percentage, 100.0);
//! ```

use std::sync::Arc;

use serde::Serialize;

const LOADING_END: f64 = 10.0;
const PROCESSING_END: f64 = 95.0;
const COMPLETE: f64 = 100.0;

/// Stage of an ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Opening the archive and listing entries.
    Loading,
    /// Reading conversation folders.
    Processing,
    /// Assembling the result for handoff.
    Finalizing,
    /// The run has finished.
    Done,
}

/// One progress update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    /// Phase the run is in.
    pub phase: Phase,
    /// Overall completion, 0.0 - 100.0.
    pub percentage: f64,
    /// Human-readable status line.
    pub label: String,
}

/// Maps a position within a phase to an overall progress event.
///
/// `completed` is clamped to `total`; a `total` of 0 counts as a finished
/// phase.
pub fn report(phase: Phase, completed: usize, total: usize) -> ProgressEvent {
    let ratio = if total == 0 {
        1.0
    } else {
        (completed.min(total) as f64) / (total as f64)
    };

    let (percentage, label) = match phase {
        Phase::Loading => (ratio * LOADING_END, "Reading archive".to_string()),
        Phase::Processing => (
            LOADING_END + ratio * (PROCESSING_END - LOADING_END),
            format!("Processing conversation {} of {}", completed.min(total), total),
        ),
        Phase::Finalizing => (
            PROCESSING_END + ratio * (COMPLETE - PROCESSING_END),
            "Preparing results".to_string(),
        ),
        Phase::Done => (COMPLETE, "Done".to_string()),
    };

    ProgressEvent {
        phase,
        percentage,
        label,
    }
}

/// Folder progress threaded through the aggregation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    completed: usize,
    total: usize,
}

impl ProgressState {
    /// Starts tracking `total` folders.
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
        }
    }

    /// Returns the state after one more folder has finished.
    #[must_use]
    pub fn advance(self) -> Self {
        Self {
            completed: (self.completed + 1).min(self.total),
            ..self
        }
    }

    /// Folders finished so far.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Total folders in the run.
    pub fn total(&self) -> usize {
        self.total
    }

    /// The event describing this state.
    pub fn event(&self) -> ProgressEvent {
        report(Phase::Processing, self.completed, self.total)
    }
}

/// Callback type for receiving progress updates.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Creates a no-op progress callback.
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_: ProgressEvent| {})
}

/// Creates a progress callback that prints to stderr.
pub fn stderr_progress() -> ProgressCallback {
    Arc::new(|event: ProgressEvent| {
        eprintln!("[{:>5.1}%] {}", event.percentage, event.label);
    })
}

/// Creates a progress callback that emits `tracing` debug events.
pub fn tracing_progress() -> ProgressCallback {
    Arc::new(|event: ProgressEvent| {
        tracing::debug!(
            phase = ?event.phase,
            percentage = event.percentage,
            "{}",
            event.label
        );
    })
}
