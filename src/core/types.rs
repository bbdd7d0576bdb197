//! Core type definitions for SVM training and classification

use crate::core::{Result, SVMError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Training matrix (one row per sample) with one class id per row.
///
/// All rows have the same length. The set is never mutated after
/// construction; training shares it read-only between subproblems.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    rows: Vec<Vec<f64>>,
    labels: Vec<i32>,
    dim: usize,
}

impl TrainingSet {
    /// Create a training set, validating its shape
    pub fn new(rows: Vec<Vec<f64>>, labels: Vec<i32>) -> Result<Self> {
        if rows.is_empty() {
            return Err(SVMError::EmptyDataset);
        }
        if rows.len() != labels.len() {
            return Err(SVMError::InvalidDataset(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }

        let dim = rows[0].len();
        if dim == 0 {
            return Err(SVMError::InvalidDataset(
                "rows must have at least one feature".to_string(),
            ));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(SVMError::InvalidDataset(format!(
                    "row {i} has {} features, expected {dim}",
                    row.len()
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(SVMError::InvalidDataset(format!(
                    "row {i} contains a non-finite value"
                )));
            }
        }

        Ok(Self { rows, labels, dim })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false for a constructed set
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of features per row
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Feature vector of row `i`
    ///
    /// # Panics
    /// Panics if `i >= len()`
    pub fn row(&self, i: usize) -> &[f64] {
        &self.rows[i]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn label(&self, i: usize) -> i32 {
        self.labels[i]
    }

    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    /// Number of rows per class id, in ascending id order
    pub fn class_counts(&self) -> BTreeMap<i32, usize> {
        let mut counts = BTreeMap::new();
        for &label in &self.labels {
            *counts.entry(label).or_insert(0) += 1;
        }
        counts
    }

    /// Apply `f` to every row, keeping the labels
    pub(crate) fn map_rows<F: Fn(&[f64]) -> Vec<f64>>(&self, f: F) -> Self {
        Self {
            rows: self.rows.iter().map(|r| f(r)).collect(),
            labels: self.labels.clone(),
            dim: self.dim,
        }
    }
}

/// Multi-class decomposition scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decomposition {
    /// One machine per class, trained against all other classes
    OneVsAll,
    /// One machine per unordered pair of classes
    Pairwise,
}

/// Hyperparameters of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmParameters {
    /// Regularization parameter (upper bound for alpha)
    pub c: f64,
    /// Slack allowed when checking the KKT conditions
    pub tolerance: f64,
    /// Minimum meaningful change of an alpha value
    pub epsilon: f64,
    /// Initial threshold of every machine
    pub bias_init: f64,
    /// Train one machine per class pair instead of one per class
    pub use_pairwise: bool,
    /// Rescale classification scores to sum to one
    pub sum_to_one: bool,
    /// Shift/scale the training data to zero mean and unit variance first
    pub normalize_data: bool,
    /// Target number of support vectors per machine
    pub n_support: Option<usize>,
    /// Hard cap on outer SMO sweeps per machine
    pub max_sweeps: usize,
    /// Kernel cache size in bytes (per machine)
    pub cache_size: usize,
    /// Solve independent machines on worker threads
    pub parallel: bool,
}

impl Default for SvmParameters {
    fn default() -> Self {
        Self {
            c: 1.0,
            tolerance: 1e-3,
            epsilon: 1e-12,
            bias_init: 1.0,
            use_pairwise: false,
            sum_to_one: false,
            normalize_data: false,
            n_support: None,
            max_sweeps: 10_000,
            cache_size: 100_000_000, // 100MB
            parallel: false,
        }
    }
}

impl SvmParameters {
    /// Decomposition implied by `use_pairwise`
    pub fn decomposition(&self) -> Decomposition {
        if self.use_pairwise {
            Decomposition::Pairwise
        } else {
            Decomposition::OneVsAll
        }
    }

    /// Check the parameters before any optimization work is done
    pub fn validate(&self) -> Result<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "C must be positive and finite, got {}",
                self.c
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "epsilon must be non-negative, got {}",
                self.epsilon
            )));
        }
        if !self.bias_init.is_finite() {
            return Err(SVMError::InvalidParameter(format!(
                "bias_init must be finite, got {}",
                self.bias_init
            )));
        }
        if self.max_sweeps == 0 {
            return Err(SVMError::InvalidParameter(
                "max_sweeps must be at least 1".to_string(),
            ));
        }
        if self.n_support == Some(0) {
            return Err(SVMError::InvalidParameter(
                "n_support must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of optimizing one binary subproblem
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Lagrange multipliers, aligned with the subproblem rows
    pub alpha: Vec<f64>,
    /// Threshold of the decision function
    pub bias: f64,
    /// Subproblem-local indices where alpha > 0
    pub support_vectors: Vec<usize>,
    /// Number of outer sweeps performed
    pub sweeps: usize,
    /// Number of successful pair updates
    pub updates: usize,
    /// False if the sweep cap was reached first
    pub converged: bool,
    /// Dual objective value at termination
    pub objective_value: f64,
}

/// Non-fatal diagnostic attached to a trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TrainingWarning {
    /// The sweep cap was hit; the machine keeps its last alphas and bias
    NonConvergence { machine: usize, sweeps: usize },
    /// The machine uses more support vectors than `n_support`
    SupportVectorTarget {
        machine: usize,
        target: usize,
        actual: usize,
    },
}

impl std::fmt::Display for TrainingWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrainingWarning::NonConvergence { machine, sweeps } => write!(
                f,
                "machine {machine} did not converge within {sweeps} sweeps"
            ),
            TrainingWarning::SupportVectorTarget {
                machine,
                target,
                actual,
            } => write!(
                f,
                "machine {machine} uses {actual} support vectors (target {target})"
            ),
        }
    }
}

/// Per-call training diagnostics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub warnings: Vec<TrainingWarning>,
    /// Outer sweeps per machine
    pub sweeps: Vec<usize>,
    /// Dual objective per machine
    pub objective_values: Vec<f64>,
}

impl TrainingReport {
    /// True if every machine met the termination condition
    pub fn converged(&self) -> bool {
        !self
            .warnings
            .iter()
            .any(|w| matches!(w, TrainingWarning::NonConvergence { .. }))
    }
}

/// Classification result: the winning label and one score per class
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// External id of the winning class
    pub label: i32,
    /// (external id, score) in internal class order
    pub scores: Vec<(i32, f64)>,
}

impl Classification {
    /// Score of the winning class
    pub fn winner_score(&self) -> f64 {
        self.scores
            .iter()
            .find(|(label, _)| *label == self.label)
            .map(|&(_, s)| s)
            .unwrap_or(f64::NAN)
    }

    /// Score of a given class, if it is known to the model
    pub fn score_of(&self, label: i32) -> Option<f64> {
        self.scores
            .iter()
            .find(|(l, _)| *l == label)
            .map(|&(_, s)| s)
    }
}

/// Cooperative cancellation flag shared between a caller and a training run
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; running solvers stop at their next sweep
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
