//! Pipeline runner and builder.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result, ResultExt};
use crate::pipeline::operation::{Operation, PipelinePlan};
use crate::pipeline::progress::{
    CancellationToken, ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::table::Table;
use crate::types::PipelineResult;
use chrono::Local;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// An ordered list of operations applied to a table.
///
/// Use [`Pipeline::builder()`] to create one.
///
/// # Example
///
/// ```rust
/// use tabwash::{MissingValueOperation, Operation, Pipeline, Table};
///
/// let table = Table::from_rows(["v"], [vec!["1"], vec![""], vec!["3"]]);
/// let result = Pipeline::builder()
///     .operation(Operation::HandleMissing {
///         column: "v".to_string(),
///         operation: MissingValueOperation::FillMean,
///     })
///     .build()
///     .unwrap()
///     .run(&table)
///     .unwrap();
///
/// assert_eq!(result.table.cell(1, "v").unwrap().to_text(), "2");
/// assert_eq!(result.steps.len(), 1);
/// ```
pub struct Pipeline {
    config: EngineConfig,
    operations: Vec<Operation>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: CancellationToken,
}

static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Build a pipeline from a deserialized plan.
    pub fn from_plan(plan: PipelinePlan) -> Result<Self> {
        Self::builder()
            .config(plan.config)
            .operations(plan.operations)
            .build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Apply every operation in order.
    ///
    /// Each operation checks its columns against the table it receives, so
    /// columns appended by an earlier encoding step can be used later. The
    /// input table is never modified.
    ///
    /// # Errors
    ///
    /// `ColumnNotFound` (wrapped with the failing step) when an operation
    /// names an unknown column, and `Cancelled` when the token fires between
    /// operations.
    pub fn run(&self, table: &Table) -> Result<PipelineResult> {
        let total = self.operations.len();
        match self.run_internal(table) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete(total, "Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                if e.is_cancelled() {
                    self.report_progress(ProgressUpdate::cancelled(total));
                } else {
                    self.report_progress(ProgressUpdate::failed(total, e.to_string()));
                }
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancellation_token.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        Ok(())
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_internal(&self, table: &Table) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let total = self.operations.len();

        info!(
            "Running pipeline: {} operations on {} rows x {} columns",
            total,
            table.len(),
            table.width()
        );
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Validating,
            total,
            "Validating operations...",
        ));

        for (idx, operation) in self.operations.iter().enumerate() {
            operation
                .validate(&self.config)
                .context(format!("Step {} ({})", idx + 1, operation.describe()))?;
        }

        let mut current = table.clone();
        let mut steps = Vec::with_capacity(total);

        for (idx, operation) in self.operations.iter().enumerate() {
            self.check_cancelled()?;
            self.report_progress(ProgressUpdate::with_step(
                idx,
                total,
                format!("Applying {}", operation.describe()),
            ));

            let (next, summary) = operation
                .apply(&current, &self.config)
                .context(format!("Step {} ({})", idx + 1, operation.describe()))?;
            debug!("Step {}: {}", idx + 1, summary.message);

            current = next;
            steps.push(summary);
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        let result = PipelineResult {
            table: current,
            steps,
            duration_ms,
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };

        info!(
            "Pipeline finished in {} ms: {} rows removed, {} rows x {} columns remain",
            duration_ms,
            result.rows_removed(),
            result.table.len(),
            result.table.width()
        );

        Ok(result)
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<EngineConfig>,
    operations: Vec<Operation>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: Option<CancellationToken>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the engine configuration used for operation defaults.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Append one operation.
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Append several operations in order.
    pub fn operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(operations);
        self
    }

    /// Set a custom progress reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Report progress through a closure.
    ///
    /// ```rust
    /// use tabwash::Pipeline;
    ///
    /// let pipeline = Pipeline::builder()
    ///     .on_progress(|update| println!("[{:.0}%] {}", update.progress * 100.0, update.message))
    ///     .build()
    ///     .unwrap();
    /// assert!(pipeline.operations().is_empty());
    /// ```
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Set a token for cancelling the run from another thread.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Validate the configuration and build the pipeline.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            operations: self.operations,
            progress_reporter: self.progress_reporter,
            cancellation_token: self.cancellation_token.unwrap_or_default(),
        })
    }
}
