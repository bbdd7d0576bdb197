//! CSV format dataset implementation
//!
//! Supports loading datasets from CSV files where:
//! - The last column is the integer class id
//! - All other columns are features
//! - First row can be headers (automatically detected)
//! - Lines starting with `#` are comments

use crate::core::{Dataset, Result, SVMError, TrainingSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dataset implementation for CSV format files
#[derive(Debug, Clone)]
pub struct CSVDataset {
    rows: Vec<Vec<f64>>,
    labels: Vec<i32>,
    dimensions: usize,
}

impl CSVDataset {
    /// Load a dataset from a CSV file
    ///
    /// The last column is assumed to be the label.
    /// Headers are automatically detected if present.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dataset from a reader, detecting a header line
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, true)
    }

    /// Load a dataset from a reader with explicit header option
    pub fn from_reader_with_options<R: BufRead>(
        reader: R,
        auto_detect_header: bool,
    ) -> Result<Self> {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        let mut dimensions = None;
        let mut first_data_line = true;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if first_data_line {
                first_data_line = false;
                if auto_detect_header && Self::is_header_line(line) {
                    continue;
                }
            }

            let (features, label) = Self::parse_data_line(line, line_no + 1)?;
            match dimensions {
                None => dimensions = Some(features.len()),
                Some(dim) if dim != features.len() => {
                    return Err(SVMError::ParseError(format!(
                        "line {}: expected {dim} features, found {}",
                        line_no + 1,
                        features.len()
                    )));
                }
                Some(_) => {}
            }
            rows.push(features);
            labels.push(label);
        }

        match dimensions {
            Some(dimensions) => Ok(Self {
                rows,
                labels,
                dimensions,
            }),
            None => Err(SVMError::EmptyDataset),
        }
    }

    /// Check if a line appears to be a header
    fn is_header_line(line: &str) -> bool {
        let fields: Vec<&str> = line.split(',').collect();

        if fields.len() < 2 {
            return false;
        }

        // Most feature columns non-numeric
        let non_numeric_count = fields
            .iter()
            .take(fields.len() - 1)
            .filter(|field| field.trim().parse::<f64>().is_err())
            .count();

        non_numeric_count > fields.len() / 2
    }

    /// Parse a CSV data line into features and a class id
    fn parse_data_line(line: &str, line_no: usize) -> Result<(Vec<f64>, i32)> {
        let fields: Vec<&str> = line.split(',').map(|f| f.trim()).collect();

        if fields.len() < 2 {
            return Err(SVMError::ParseError(format!(
                "line {line_no}: too few fields: {line}"
            )));
        }

        let label_str = fields[fields.len() - 1];
        let label = parse_label(label_str)
            .ok_or_else(|| {
                SVMError::ParseError(format!("line {line_no}: invalid label: {label_str}"))
            })?;

        let features = fields[..fields.len() - 1]
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                field.parse::<f64>().map_err(|_| {
                    SVMError::ParseError(format!(
                        "line {line_no}: invalid feature value at column {}: {field}",
                        idx + 1
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok((features, label))
    }

    /// Validated training set with the same rows and labels
    pub fn into_training_set(self) -> Result<TrainingSet> {
        TrainingSet::new(self.rows, self.labels)
    }
}

/// Integer class id; integral floats such as `2.0` are accepted
pub(crate) fn parse_label(field: &str) -> Option<i32> {
    if let Ok(label) = field.parse::<i32>() {
        return Some(label);
    }
    let value = field.parse::<f64>().ok()?;
    if value.fract() == 0.0 && value >= i32::MIN as f64 && value <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

impl Dataset for CSVDataset {
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
