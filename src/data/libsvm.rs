//! LibSVM format dataset implementation
//!
//! Supports loading datasets in the libsvm format:
//! label index:value index:value ...
//!
//! Example:
//! 1 1:0.5 3:1.2 7:0.8
//! 3 2:0.3 5:2.1
//!
//! Indices are 1-based; rows are densified to the largest index seen,
//! missing entries are zero.

use crate::core::{Dataset, Result, SVMError, TrainingSet};
use crate::data::csv::parse_label;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Largest accepted 1-based feature index; rows are stored dense
pub const MAX_DIMENSION: usize = 1 << 24;

/// Dataset implementation for LibSVM format files
#[derive(Debug, Clone)]
pub struct LibSVMDataset {
    rows: Vec<Vec<f64>>,
    labels: Vec<i32>,
    dimensions: usize,
}

/// One parsed line: label and 0-based (index, value) pairs
type SparseLine = (i32, Vec<(usize, f64)>);

impl LibSVMDataset {
    /// Load a dataset from a LibSVM format file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dataset from a reader (for testing and flexibility)
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut parsed = Vec::new();
        let mut max_dimension = 0;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match Self::parse_line(line) {
                Ok((label, entries)) => {
                    if let Some(&(idx, _)) = entries.iter().max_by_key(|(idx, _)| *idx) {
                        max_dimension = max_dimension.max(idx + 1);
                    }
                    parsed.push((label, entries));
                }
                Err(e) => {
                    return Err(SVMError::ParseError(format!(
                        "Error parsing line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }

        if parsed.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        let mut rows = Vec::with_capacity(parsed.len());
        let mut labels = Vec::with_capacity(parsed.len());
        for (label, entries) in parsed {
            let mut row = vec![0.0; max_dimension];
            for (idx, value) in entries {
                row[idx] = value;
            }
            rows.push(row);
            labels.push(label);
        }

        Ok(LibSVMDataset {
            rows,
            labels,
            dimensions: max_dimension,
        })
    }

    /// Parse a single line in libsvm format
    fn parse_line(line: &str) -> Result<SparseLine> {
        let mut parts = line.split_whitespace();

        let label_str = parts
            .next()
            .ok_or_else(|| SVMError::ParseError("Empty line".to_string()))?;
        let label = parse_label(label_str)
            .ok_or_else(|| SVMError::ParseError(format!("Invalid label: {label_str}")))?;

        let mut entries = Vec::new();
        for feature_str in parts {
            let (index, value) = feature_str.split_once(':').ok_or_else(|| {
                SVMError::ParseError(format!("Invalid feature format: {feature_str}"))
            })?;

            let index = index
                .parse::<usize>()
                .map_err(|_| SVMError::ParseError(format!("Invalid feature index: {index}")))?;
            let value = value
                .parse::<f64>()
                .map_err(|_| SVMError::ParseError(format!("Invalid feature value: {value}")))?;

            // libsvm uses 1-based indexing, convert to 0-based
            let index = match index.checked_sub(1) {
                Some(idx) if index <= MAX_DIMENSION => idx,
                Some(_) => {
                    return Err(SVMError::ParseError(format!(
                        "Feature index {index} exceeds the maximum of {MAX_DIMENSION}"
                    )))
                }
                None => {
                    return Err(SVMError::ParseError(
                        "Feature index must be positive: 0".to_string(),
                    ))
                }
            };
            entries.push((index, value));
        }

        Ok((label, entries))
    }

    /// Widen every row to `dim` features
    ///
    /// Test files often omit trailing zero features; padding them lets the
    /// rows match a model trained on wider data.
    pub fn pad_to(mut self, dim: usize) -> Result<Self> {
        if dim < self.dimensions {
            return Err(SVMError::DimensionMismatch {
                expected: dim,
                actual: self.dimensions,
            });
        }
        for row in &mut self.rows {
            row.resize(dim, 0.0);
        }
        self.dimensions = dim;
        Ok(self)
    }

    /// Validated training set with the same rows and labels
    pub fn into_training_set(self) -> Result<TrainingSet> {
        TrainingSet::new(self.rows, self.labels)
    }
}

impl Dataset for LibSVMDataset {
    fn len(&self) -> usize {
        self.rows.len()
    }

    fn dim(&self) -> usize {
        self.dimensions
    }

    fn row(&self, i: usize) -> &[f64] {
        &self.rows[i]
    }

    fn label(&self, i: usize) -> i32 {
        self.labels[i]
    }

    fn labels(&self) -> Vec<i32> {
        self.labels.clone()
    }
}
