//! Tabular data-cleaning and statistics engine.
//!
//! # Overview
//!
//! The engine works on an in-memory [`Table`] of raw string cells and
//! provides:
//!
//! - **Statistics**: central tendency, dispersion, distribution shape and a
//!   Jarque-Bera normality test over a column's numeric projection
//! - **Duplicate Detection**: composite-key grouping and removal under a
//!   keep strategy
//! - **Missing Values**: row removal and mean/median/mode/constant fills
//! - **Outliers**: z-score, IQR and percentile bounds with removal or capping
//! - **Column Transforms**: numeric rescaling, text normalization and
//!   categorical encoding
//! - **Regression**: simple, multiple, logistic, exponential and power fits
//! - **Pipelines**: JSON-describable operation lists with a per-step log
//!
//! Every operation takes `&Table` and returns a new table or a report; the
//! input is never modified.
//!
//! # Quick Start
//!
//! ```rust
//! use tabwash::{
//!     DuplicateDetector, KeepStrategy, MissingValueImputer, MissingValueOperation,
//!     OutlierHandler, OutlierMethod, Table,
//! };
//!
//! let table = Table::from_rows(
//!     ["id", "v"],
//!     [vec!["1", "1"], vec!["1", "1"], vec!["2", ""], vec!["3", "3"], vec!["4", "100"]],
//! );
//!
//! let deduped = DuplicateDetector::remove_duplicates(&table, &[], KeepStrategy::First);
//! assert_eq!(deduped.removed, vec![1]);
//!
//! let filled = MissingValueImputer::fill(&deduped.table, "v", &MissingValueOperation::FillMedian);
//! assert_eq!(filled.fill_value, "3");
//!
//! let report = OutlierHandler::detect(&filled.table, "v", OutlierMethod::ZScore, 1.0);
//! assert_eq!(report.outlier_indices, vec![3]);
//! ```
//!
//! # Pipelines
//!
//! ```rust
//! use tabwash::{Pipeline, PipelinePlan, Table};
//!
//! let plan = PipelinePlan::from_json(r#"{
//!     "operations": [
//!         {"op": "handle_missing", "column": "v", "operation": {"kind": "remove-rows"}},
//!         {"op": "transform", "columns": ["v"], "transform": {"kind": "normalize"}}
//!     ]
//! }"#).unwrap();
//!
//! let table = Table::from_rows(["v"], [vec!["1"], vec!["n/a"], vec!["3"]]);
//! let result = Pipeline::from_plan(plan).unwrap().run(&table).unwrap();
//! assert_eq!(result.table.len(), 2);
//! assert_eq!(result.steps.len(), 2);
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod io;
pub mod outliers;
pub mod pipeline;
pub mod regression;
pub mod stats;
pub mod table;
pub mod transform;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DuplicateDetector;
pub use config::{
    ConfigValidationError, EngineConfig, EngineConfigBuilder, KeepStrategy, MissingValueOperation,
    OutlierMethod, RegressionModel,
};
pub use error::{EngineError, Result as EngineResult, ResultExt};
pub use imputers::{MissingValueImputer, RemediationOutcome, StatisticalImputer};
pub use outliers::OutlierHandler;
pub use pipeline::{
    CancellationToken, ClosureProgressReporter, Operation, Pipeline, PipelineBuilder, PipelinePlan,
    PipelineStage, ProgressReporter, ProgressUpdate,
};
pub use regression::{LogisticOptions, RegressionEngine};
pub use stats::calculate_descriptive_statistics;
pub use table::{Cell, Row, Table};
pub use transform::{ColumnTransformer, Transform, TransformOutcome};
pub use types::{
    ActionType, DuplicateGroup, DuplicateReport, FillOutcome, MethodDetails, MissingValueSummary,
    NormalityTest, OperationSummary, OutlierBounds, OutlierReport, PipelineResult,
    RegressionResult, RemovalOutcome, ScalarValue, StatisticCategory, StatisticResult,
    StatisticValue,
};
