//! Operation pipeline.
//!
//! A [`Pipeline`] applies an ordered list of [`Operation`]s to a table and
//! records one [`OperationSummary`](crate::types::OperationSummary) per step.
//! Plans can be loaded from JSON through [`PipelinePlan`].

mod builder;
mod operation;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use operation::{Operation, PipelinePlan};
pub use progress::{
    CancellationToken, ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
