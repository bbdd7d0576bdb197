//! Data loading and dataset implementations
//!
//! This module provides implementations of the Dataset trait for the text
//! formats commonly used in machine learning. Both loaders produce dense
//! rows with integer class ids.

pub mod csv;
pub mod libsvm;

pub use self::csv::CSVDataset;
pub use self::libsvm::LibSVMDataset;
