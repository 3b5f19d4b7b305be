//! CLI entry point for the cleaning engine.

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabwash::io::{read_csv, write_csv};
use tabwash::transform::DEFAULT_SCALE_RANGE;
use tabwash::{
    ColumnTransformer, DuplicateDetector, EngineConfig, KeepStrategy, MissingValueImputer,
    MissingValueOperation, OutlierHandler, OutlierMethod, Pipeline, PipelinePlan,
    RegressionEngine, RegressionModel, RemediationOutcome, StatisticValue, Table, Transform,
    calculate_descriptive_statistics,
};
use tracing::{debug, info};

/// CLI-compatible outlier method enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutlierMethod {
    /// Mean ± threshold standard deviations
    Zscore,
    /// Quartiles ± threshold interquartile ranges
    Iqr,
    /// Values beyond the threshold percentiles
    Percentile,
}

impl From<CliOutlierMethod> for OutlierMethod {
    fn from(cli: CliOutlierMethod) -> Self {
        match cli {
            CliOutlierMethod::Zscore => OutlierMethod::ZScore,
            CliOutlierMethod::Iqr => OutlierMethod::Iqr,
            CliOutlierMethod::Percentile => OutlierMethod::Percentile,
        }
    }
}

/// CLI-compatible keep strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliKeepStrategy {
    /// Keep the first occurrence
    First,
    /// Keep the last occurrence
    Last,
    /// Keep the row with the fewest missing cells
    MinNulls,
}

impl From<CliKeepStrategy> for KeepStrategy {
    fn from(cli: CliKeepStrategy) -> Self {
        match cli {
            CliKeepStrategy::First => KeepStrategy::First,
            CliKeepStrategy::Last => KeepStrategy::Last,
            CliKeepStrategy::MinNulls => KeepStrategy::MinNulls,
        }
    }
}

/// CLI-compatible missing-value operation enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMissingOperation {
    /// Drop rows with a missing target cell
    RemoveRows,
    /// Fill with the column mean
    FillMean,
    /// Fill with the column median
    FillMedian,
    /// Fill with the most frequent numeric value
    FillMode,
    /// Fill with the value given by --value
    FillCustom,
}

/// CLI-compatible regression model enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliRegressionModel {
    Simple,
    Multiple,
    Logistic,
    Exponential,
    Power,
}

impl From<CliRegressionModel> for RegressionModel {
    fn from(cli: CliRegressionModel) -> Self {
        match cli {
            CliRegressionModel::Simple => RegressionModel::Simple,
            CliRegressionModel::Multiple => RegressionModel::Multiple,
            CliRegressionModel::Logistic => RegressionModel::Logistic,
            CliRegressionModel::Exponential => RegressionModel::Exponential,
            CliRegressionModel::Power => RegressionModel::Power,
        }
    }
}

/// CLI-compatible transform kind enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliTransform {
    Normalize,
    Scale,
    Log,
    SquareRoot,
    Lowercase,
    Uppercase,
    Trim,
    AddPrefix,
    AddSuffix,
    RegexReplace,
    OneHot,
    Label,
}

/// What to do with detected outliers
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutlierAction {
    /// Only report bounds and flagged rows
    Report,
    /// Drop flagged rows
    Remove,
    /// Clamp flagged cells to the nearer bound
    Cap,
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Tabular data-cleaning and statistics engine",
    long_about = "Clean CSV data and compute statistics.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  RUST_LOG    Log filter, overrides --log-level (may be set in .env)\n\n\
                  EXAMPLES:\n  \
                  tabwash stats -i data.csv -c price\n\n  \
                  tabwash duplicates -i data.csv -c name -c email --remove --keep min-nulls -o clean.csv\n\n  \
                  tabwash outliers -i data.csv -c price --method iqr --action cap -o capped.csv\n\n  \
                  tabwash run -i data.csv --plan plan.json -o clean.csv --json"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logging so stdout only carries the JSON document.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Path to the CSV file to read
    #[arg(short, long)]
    input: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Descriptive statistics for one or more columns
    Stats {
        #[command(flatten)]
        input: InputArgs,

        /// Columns to describe (default: every column)
        #[arg(short, long)]
        column: Vec<String>,
    },

    /// Find or remove duplicate rows
    Duplicates {
        #[command(flatten)]
        input: InputArgs,

        /// Key columns (default: every column)
        #[arg(short, long)]
        column: Vec<String>,

        /// Remove duplicates instead of only reporting them
        #[arg(long)]
        remove: bool,

        #[arg(long, value_enum, default_value = "first")]
        keep: CliKeepStrategy,

        /// Where to write the cleaned CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report or remediate missing values
    Missing {
        #[command(flatten)]
        input: InputArgs,

        /// Target column; without it only per-column counts are reported
        #[arg(short, long)]
        column: Option<String>,

        #[arg(long, value_enum, requires = "column")]
        operation: Option<CliMissingOperation>,

        /// Literal for fill-custom
        #[arg(long)]
        value: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Detect, remove or cap outliers in a numeric column
    Outliers {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short, long)]
        column: String,

        #[arg(long, value_enum, default_value = "zscore")]
        method: CliOutlierMethod,

        /// Threshold (default: 3 for zscore, 1.5 for iqr, 5 for percentile)
        #[arg(long)]
        threshold: Option<f64>,

        #[arg(long, value_enum, default_value = "report")]
        action: CliOutlierAction,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply a column transform
    Transform {
        #[command(flatten)]
        input: InputArgs,

        /// Columns to transform, in order
        #[arg(short, long, required = true)]
        column: Vec<String>,

        #[arg(short, long, value_enum)]
        kind: CliTransform,

        /// Lower bound for scale (default: 0)
        #[arg(long, allow_negative_numbers = true)]
        min: Option<f64>,

        /// Upper bound for scale (default: 1)
        #[arg(long, allow_negative_numbers = true)]
        max: Option<f64>,

        /// Text for add-prefix / add-suffix
        #[arg(long, default_value = "")]
        text: String,

        /// Pattern for regex-replace
        #[arg(long, default_value = "")]
        pattern: String,

        /// Replacement for regex-replace ($1 refers to a capture group)
        #[arg(long, default_value = "")]
        replacement: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fit a regression model
    Regress {
        #[command(flatten)]
        input: InputArgs,

        /// Dependent column
        #[arg(short, long)]
        dependent: String,

        /// Independent columns
        #[arg(short = 'x', long, required = true)]
        independent: Vec<String>,

        #[arg(short, long, value_enum, default_value = "simple")]
        model: CliRegressionModel,

        /// Newton iterations allowed for logistic fits
        #[arg(long, default_value = "100")]
        max_iterations: usize,

        /// Convergence tolerance for logistic fits
        #[arg(long, default_value = "1e-8")]
        tolerance: f64,
    },

    /// Run a JSON pipeline plan
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Path to the plan (`{"config": {...}, "operations": [...]}`)
        #[arg(short, long)]
        plan: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // .env first so RUST_LOG set there reaches the filter
    dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.quiet, cli.json);

    match cli.command {
        Command::Stats { input, column } => {
            let table = load(&input.input)?;
            let columns = if column.is_empty() {
                table.headers.clone()
            } else {
                column
            };
            let mut reports = Vec::with_capacity(columns.len());
            for name in &columns {
                table.require_column(name)?;
                reports.push(ColumnStats {
                    column: name.clone(),
                    statistics: calculate_descriptive_statistics(&table.column_cells(name)),
                });
            }
            if cli.json {
                print_json(&reports)?;
            } else {
                print_stats(&reports);
            }
        }

        Command::Duplicates {
            input,
            column,
            remove,
            keep,
            output,
        } => {
            let table = load(&input.input)?;
            for name in &column {
                table.require_column(name)?;
            }
            let report = DuplicateDetector::find_duplicates(&table, &column);
            if remove {
                let outcome = DuplicateDetector::remove_duplicates(&table, &column, keep.into());
                save(&outcome.table, output.as_deref())?;
                if cli.json {
                    print_json(&outcome.removed)?;
                } else {
                    println!(
                        "Removed {} duplicate rows ({} remain)",
                        outcome.removed.len(),
                        outcome.table.len()
                    );
                }
            } else if cli.json {
                print_json(&report)?;
            } else {
                println!("Rows:            {}", report.total_rows);
                println!("Unique rows:     {}", report.unique_rows);
                println!("Duplicate rows:  {}", report.duplicate_rows);
                println!("Groups:          {}", report.duplicate_groups_count);
                for group in &report.groups {
                    println!("  [{}] x{} at rows {:?}", group.key, group.count, group.indices);
                }
            }
        }

        Command::Missing {
            input,
            column,
            operation,
            value,
            output,
        } => {
            let table = load(&input.input)?;
            match (column, operation) {
                (Some(column), Some(operation)) => {
                    table.require_column(&column)?;
                    let operation = missing_operation(operation, value)?;
                    let outcome = MissingValueImputer::apply(&table, &column, &operation);
                    save(outcome.table(), output.as_deref())?;
                    match &outcome {
                        RemediationOutcome::Removed(removed) if cli.json => print_json(&removed.removed)?,
                        RemediationOutcome::Filled(filled) if cli.json => {
                            print_json(&(&filled.fill_value, filled.cells_filled))?
                        }
                        RemediationOutcome::Removed(removed) => {
                            println!("Removed {} rows with missing '{}'", removed.removed.len(), column)
                        }
                        RemediationOutcome::Filled(filled) => println!(
                            "Filled {} cells in '{}' with '{}'",
                            filled.cells_filled, column, filled.fill_value
                        ),
                    }
                }
                _ => {
                    let counts = MissingValueImputer::missing_value_counts(&table);
                    if cli.json {
                        print_json(&counts)?;
                    } else {
                        for summary in &counts {
                            println!(
                                "{:<30} {:>8} ({:.1}%)",
                                summary.column, summary.missing_count, summary.missing_percentage
                            );
                        }
                    }
                }
            }
        }

        Command::Outliers {
            input,
            column,
            method,
            threshold,
            action,
            output,
        } => {
            let table = load(&input.input)?;
            table.require_column(&column)?;
            let method: OutlierMethod = method.into();
            let config = EngineConfig::builder()
                .outlier_method(method)
                .outlier_threshold(threshold.unwrap_or_else(|| method.default_threshold()))
                .build()?;
            let threshold = config.effective_outlier_threshold();

            let report = OutlierHandler::detect(&table, &column, method, threshold);
            match action {
                CliOutlierAction::Report => {}
                CliOutlierAction::Remove => {
                    let outcome = OutlierHandler::remove_outliers(&table, &column, method, threshold);
                    save(&outcome.table, output.as_deref())?;
                }
                CliOutlierAction::Cap => {
                    let (capped, _) = OutlierHandler::cap_outliers(&table, &column, method, threshold);
                    save(&capped, output.as_deref())?;
                }
            }
            if cli.json {
                print_json(&report)?;
            } else {
                println!(
                    "{} bounds for '{}': [{}, {}]",
                    method.as_str(),
                    column,
                    report.bounds.lower_bound,
                    report.bounds.upper_bound
                );
                println!(
                    "{} of {} values flagged at rows {:?}",
                    report.outlier_indices.len(),
                    report.values_checked,
                    report.outlier_indices
                );
            }
        }

        Command::Transform {
            input,
            column,
            kind,
            min,
            max,
            text,
            pattern,
            replacement,
            output,
        } => {
            let table = load(&input.input)?;
            for name in &column {
                table.require_column(name)?;
            }
            let config = EngineConfig::builder()
                .scale_range(
                    min.unwrap_or(DEFAULT_SCALE_RANGE.0),
                    max.unwrap_or(DEFAULT_SCALE_RANGE.1),
                )
                .build()?;
            let transform = match kind {
                CliTransform::Normalize => Transform::Normalize,
                CliTransform::Scale => Transform::Scale { min, max },
                CliTransform::Log => Transform::Log,
                CliTransform::SquareRoot => Transform::SquareRoot,
                CliTransform::Lowercase => Transform::Lowercase,
                CliTransform::Uppercase => Transform::Uppercase,
                CliTransform::Trim => Transform::Trim,
                CliTransform::AddPrefix => Transform::AddPrefix { prefix: text },
                CliTransform::AddSuffix => Transform::AddSuffix { suffix: text },
                CliTransform::RegexReplace => Transform::RegexReplace {
                    pattern,
                    replacement,
                },
                CliTransform::OneHot => Transform::OneHotEncoding,
                CliTransform::Label => Transform::LabelEncoding,
            };
            let transform = transform.with_scale_range(config.scale_range);
            let outcome = ColumnTransformer::apply(&table, &column, &transform);
            save(&outcome.table, output.as_deref())?;
            if cli.json {
                print_json(&outcome.table.headers)?;
            } else {
                println!(
                    "{}: {} cells changed, {} columns added",
                    transform.name(),
                    outcome.cells_changed,
                    outcome.columns_added.len()
                );
            }
        }

        Command::Regress {
            input,
            dependent,
            independent,
            model,
            max_iterations,
            tolerance,
        } => {
            let table = load(&input.input)?;
            let config = EngineConfig::builder()
                .logistic_max_iterations(max_iterations)
                .logistic_tolerance(tolerance)
                .build()?;
            let result = RegressionEngine::from_config(&config).fit(
                &table,
                &dependent,
                &independent,
                model.into(),
            )?;
            if cli.json {
                print_json(&result)?;
            } else {
                println!("{}", result.equation);
                println!("R²:             {:.4}", result.r2);
                println!("Adjusted R²:    {:.4}", result.adjusted_r2);
                println!("Standard error: {:.4}", result.standard_error);
                println!("Observations:   {}", result.observations);
            }
        }

        Command::Run {
            input,
            plan,
            output,
        } => {
            let table = load(&input.input)?;
            let plan_json = std::fs::read_to_string(&plan)
                .with_context(|| format!("Reading plan {}", plan.display()))?;
            let plan = PipelinePlan::from_json(&plan_json)?;
            let quiet = cli.quiet || cli.json;
            let result = Pipeline::builder()
                .config(plan.config)
                .operations(plan.operations)
                .on_progress(move |update| {
                    if !quiet {
                        debug!("[{:.0}%] {}", update.progress * 100.0, update.message);
                    }
                })
                .build()?
                .run(&table)?;
            save(&result.table, output.as_deref())?;
            if cli.json {
                print_json(&result.steps)?;
            } else {
                println!("{}", "=".repeat(60));
                println!("PIPELINE SUMMARY ({})", result.generated_at);
                println!("{}", "=".repeat(60));
                for (idx, step) in result.steps.iter().enumerate() {
                    println!(
                        "{:>2}. {:<20} {}",
                        idx + 1,
                        step.action_type.display_name(),
                        step.message
                    );
                }
                println!(
                    "Rows: {} -> {}  Duration: {} ms",
                    table.len(),
                    result.table.len(),
                    result.duration_ms
                );
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct ColumnStats {
    column: String,
    statistics: Vec<tabwash::StatisticResult>,
}

fn load(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Err(anyhow!("Input file not found: {}", path.display()));
    }
    let table = read_csv(path)?;
    info!(
        "Loaded {} ({} rows x {} columns)",
        path.display(),
        table.len(),
        table.width()
    );
    Ok(table)
}

fn save(table: &Table, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        write_csv(table, path)?;
        info!("Saved {} rows to {}", table.len(), path.display());
    }
    Ok(())
}

fn missing_operation(
    operation: CliMissingOperation,
    value: Option<String>,
) -> Result<MissingValueOperation> {
    Ok(match operation {
        CliMissingOperation::RemoveRows => MissingValueOperation::RemoveRows,
        CliMissingOperation::FillMean => MissingValueOperation::FillMean,
        CliMissingOperation::FillMedian => MissingValueOperation::FillMedian,
        CliMissingOperation::FillMode => MissingValueOperation::FillMode,
        CliMissingOperation::FillCustom => MissingValueOperation::FillCustom(
            value.ok_or_else(|| anyhow!("fill-custom needs --value"))?,
        ),
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_stats(reports: &[ColumnStats]) {
    for report in reports {
        println!("{}", "=".repeat(60));
        println!("{}", report.column);
        println!("{}", "=".repeat(60));
        let mut category = None;
        for stat in &report.statistics {
            if category != Some(stat.category) {
                category = Some(stat.category);
                println!("{}", stat.category.display_name());
            }
            let value = match &stat.value {
                StatisticValue::Null => "-".to_string(),
                StatisticValue::Number(n) => format!("{:.4}", n),
                StatisticValue::Text(s) => s.clone(),
                StatisticValue::List(values) => serde_json::to_string(values).unwrap_or_default(),
            };
            println!("  {:<28} {}", stat.name, value);
        }
    }
}
