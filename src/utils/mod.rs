//! Utility functions for SVM operations

/// Feature normalization applied before kernel evaluation
pub mod scaling {
    use crate::core::TrainingSet;
    use serde::{Deserialize, Serialize};

    /// Affine transform `x' = (x - offset) * scale`
    ///
    /// `offset` is the per-feature mean of the training rows; `scale` is a
    /// single factor chosen so that the mean per-feature variance becomes 1.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Normalization {
        pub offset: Vec<f64>,
        pub scale: f64,
    }

    impl Normalization {
        /// Compute the transform from the training rows
        pub fn fit(data: &TrainingSet) -> Self {
            let n = data.len() as f64;
            let dim = data.dim();

            let mut mean = vec![0.0; dim];
            for row in data.rows() {
                for (m, &x) in mean.iter_mut().zip(row) {
                    *m += x;
                }
            }
            for m in &mut mean {
                *m /= n;
            }

            let mut variance = 0.0;
            for row in data.rows() {
                for (&m, &x) in mean.iter().zip(row) {
                    variance += (x - m).powi(2);
                }
            }
            // mean of the per-feature (population) variances
            let variance = variance / (n * dim as f64);

            let scale = if variance > 0.0 {
                1.0 / variance.sqrt()
            } else {
                1.0
            };

            Self {
                offset: mean,
                scale,
            }
        }

        /// Transform one feature vector
        pub fn transform(&self, x: &[f64]) -> Vec<f64> {
            let mut out = Vec::with_capacity(x.len());
            self.transform_into(x, &mut out);
            out
        }

        /// Transform `x` into a reusable buffer
        pub fn transform_into(&self, x: &[f64], out: &mut Vec<f64>) {
            out.clear();
            out.extend(
                x.iter()
                    .zip(&self.offset)
                    .map(|(&v, &o)| (v - o) * self.scale),
            );
        }

        /// Transformed copy of a whole training set
        pub fn apply(&self, data: &TrainingSet) -> TrainingSet {
            data.map_rows(|row| self.transform(row))
        }

        pub fn dim(&self) -> usize {
            self.offset.len()
        }
    }
}

/// Validation and preprocessing utilities
pub mod validation {
    use crate::core::{Result, SVMError};
    use std::collections::BTreeMap;

    /// Check that a feature vector has the training dimension
    pub fn check_dimension(expected: usize, feature: &[f64]) -> Result<()> {
        if feature.len() == expected {
            Ok(())
        } else {
            Err(SVMError::DimensionMismatch {
                expected,
                actual: feature.len(),
            })
        }
    }

    /// Per-class counts and share of the dataset, in ascending label order
    pub fn class_balance(labels: &[i32]) -> Vec<(i32, usize, f64)> {
        let mut counts = BTreeMap::new();
        for &label in labels {
            *counts.entry(label).or_insert(0usize) += 1;
        }
        let total = labels.len().max(1) as f64;
        counts
            .into_iter()
            .map(|(label, count)| (label, count, count as f64 / total))
            .collect()
    }
}
