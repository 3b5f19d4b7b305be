//! Progress reporting and cancellation for pipeline runs.
//!
//! A [`Pipeline`](super::Pipeline) reports one update per operation through
//! an optional [`ProgressReporter`] and checks its [`CancellationToken`]
//! between operations.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Phase of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Checking the plan before any operation runs
    Validating,
    /// Applying operations in order
    Applying,
    /// Every operation ran
    Complete,
    /// Stopped through the cancellation token
    Cancelled,
    /// Stopped by an error
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Validating => "Validating Plan",
            Self::Applying => "Applying Operations",
            Self::Complete => "Complete",
            Self::Cancelled => "Cancelled",
            Self::Failed => "Failed",
        }
    }
}

/// One progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,

    /// Zero-based index of the operation being applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,

    /// Number of operations in the plan.
    pub total_steps: usize,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Update for a stage without a current step.
    pub fn new(stage: PipelineStage, total_steps: usize, message: impl Into<String>) -> Self {
        Self {
            stage,
            step: None,
            total_steps,
            progress: 0.0,
            message: message.into(),
        }
    }

    /// Update emitted before applying operation `step` of `total_steps`.
    pub fn with_step(step: usize, total_steps: usize, message: impl Into<String>) -> Self {
        let progress = if total_steps > 0 {
            step as f32 / total_steps as f32
        } else {
            0.0
        };
        Self {
            stage: PipelineStage::Applying,
            step: Some(step),
            total_steps,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    pub fn complete(total_steps: usize, message: impl Into<String>) -> Self {
        Self {
            progress: 1.0,
            ..Self::new(PipelineStage::Complete, total_steps, message)
        }
    }

    pub fn cancelled(total_steps: usize) -> Self {
        Self::new(PipelineStage::Cancelled, total_steps, "Pipeline cancelled by user")
    }

    pub fn failed(total_steps: usize, message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Failed, total_steps, message)
    }
}

/// Receiver for pipeline progress updates.
///
/// Implementations must be `Send + Sync` so a run can report from a worker
/// thread.
pub trait ProgressReporter: Send + Sync {
    /// Called once per stage change and once per operation.
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

/// Shared flag for stopping a pipeline between operations.
///
/// Clones share state; [`cancel()`](Self::cancel) on any clone stops the
/// run with [`EngineError::Cancelled`](crate::error::EngineError::Cancelled).
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

static_assertions::assert_impl_all!(CancellationToken: Send, Sync);
static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from any thread.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can be reused for another run.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}
