//! Row-level cleaning operations.
//!
//! This module provides functionality for:
//! - Grouping rows by a composite key over selected columns
//! - Removing duplicate rows under a keep strategy

mod duplicates;

pub use duplicates::DuplicateDetector;
