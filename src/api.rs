//! High-level API for multi-class SVM training and classification
//!
//! This module provides a builder over [`Trainer`] and a [`TrainedModel`]
//! wrapper with prediction and evaluation helpers.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use msvm::api::SVM;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Train a one-vs-all model on data
//! let svm = SVM::new()
//!     .with_c(10.0)
//!     .with_tolerance(1e-3)
//!     .train_from_file("data.libsvm")?;
//!
//! // Make predictions
//! let predictions = svm.predict_from_file("test.libsvm")?;
//! println!("first label: {}", predictions[0].label);
//! println!("Accuracy: {:.2}%", svm.evaluate_from_file("test.libsvm")? * 100.0);
//! # Ok(())
//! # }
//! ```

use crate::core::{
    CancellationToken, Classification, Dataset, Decomposition, Result, SvmParameters,
    TrainingSet, TrainingWarning,
};
use crate::data::{CSVDataset, LibSVMDataset};
use crate::kernel::{KernelParams, KernelRef, KernelRegistry, LinearKernel};
use crate::model::{ClassifyScratch, SvmModel};
use crate::optimizer::Trainer;
use crate::partition::KernelAssignment;
use std::collections::BTreeSet;
use std::path::Path;

/// High-level SVM interface with builder pattern
#[derive(Debug, Clone)]
pub struct SVM<'k> {
    kernels: KernelAssignment<'k>,
    params: SvmParameters,
    cancel: Option<CancellationToken>,
}

impl SVM<'static> {
    /// Create a new SVM with linear kernel and default parameters
    pub fn new() -> Self {
        Self::with_kernel(KernelRef::copied(&LinearKernel::new()))
    }

    /// Create an SVM whose kernel is looked up by name in `registry`
    pub fn with_kernel_name(
        registry: &KernelRegistry,
        name: &str,
        params: &KernelParams,
    ) -> Result<Self> {
        let kernel = registry.create(name, params)?;
        Ok(Self::with_kernel(KernelRef::from(kernel)))
    }
}

impl Default for SVM<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'k> SVM<'k> {
    /// Create SVM with one kernel shared by every machine
    pub fn with_kernel(kernel: KernelRef<'k>) -> Self {
        Self::with_kernels(KernelAssignment::Shared(kernel))
    }

    /// Create SVM with per-class or per-pair kernels
    pub fn with_kernels(kernels: KernelAssignment<'k>) -> Self {
        Self {
            kernels,
            params: SvmParameters::default(),
            cancel: None,
        }
    }

    /// Replace all hyperparameters at once
    pub fn with_params(mut self, params: SvmParameters) -> Self {
        self.params = params;
        self
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.params.c = c;
        self
    }

    /// Set KKT tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.params.tolerance = tolerance;
        self
    }

    /// Set minimum alpha change
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.params.epsilon = epsilon;
        self
    }

    /// Set initial bias of every machine
    pub fn with_bias(mut self, bias: f64) -> Self {
        self.params.bias_init = bias;
        self
    }

    /// Use one machine per class pair
    pub fn pairwise(mut self, enabled: bool) -> Self {
        self.params.use_pairwise = enabled;
        self
    }

    /// Rescale classification scores to sum to one
    pub fn sum_to_one(mut self, enabled: bool) -> Self {
        self.params.sum_to_one = enabled;
        self
    }

    /// Normalize training data before optimization
    pub fn normalize_data(mut self, enabled: bool) -> Self {
        self.params.normalize_data = enabled;
        self
    }

    /// Warn when a machine uses more than `n` support vectors
    pub fn with_n_support(mut self, n: usize) -> Self {
        self.params.n_support = Some(n);
        self
    }

    /// Set maximum number of outer sweeps per machine
    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.params.max_sweeps = max_sweeps;
        self
    }

    /// Set kernel cache size in bytes
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.params.cache_size = cache_size;
        self
    }

    /// Solve machines on worker threads
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.params.parallel = enabled;
        self
    }

    /// Allow the caller to stop training
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn params(&self) -> &SvmParameters {
        &self.params
    }

    fn trainer(&self) -> Trainer<'k> {
        let trainer = Trainer::new(self.kernels.clone(), self.params.clone());
        match &self.cancel {
            Some(token) => trainer.with_cancellation(token.clone()),
            None => trainer,
        }
    }

    /// Train on a training set
    pub fn train(self, data: &TrainingSet) -> Result<TrainedModel<'k>> {
        let model = self.trainer().train(data)?;
        Ok(TrainedModel::from_model(model, self.params))
    }

    /// Train on any dataset
    pub fn train_dataset<D: Dataset + ?Sized>(self, dataset: &D) -> Result<TrainedModel<'k>> {
        self.train(&dataset.to_training_set()?)
    }

    /// Train from LibSVM format file
    pub fn train_from_file<P: AsRef<Path>>(self, path: P) -> Result<TrainedModel<'k>> {
        let dataset = LibSVMDataset::from_file(path)?;
        self.train(&dataset.into_training_set()?)
    }

    /// Train from CSV file (automatically detects headers)
    pub fn train_from_csv<P: AsRef<Path>>(self, path: P) -> Result<TrainedModel<'k>> {
        let dataset = CSVDataset::from_file(path)?;
        self.train(&dataset.into_training_set()?)
    }
}

/// Trained SVM model with high-level prediction interface
#[derive(Debug, Clone)]
pub struct TrainedModel<'k> {
    model: SvmModel<'k>,
    params: SvmParameters,
}

impl<'k> TrainedModel<'k> {
    /// Wrap a model together with the parameters it was trained with
    pub fn from_model(model: SvmModel<'k>, params: SvmParameters) -> Self {
        Self { model, params }
    }

    /// Classify a single feature vector
    pub fn predict(&self, feature: &[f64]) -> Result<Classification> {
        self.model.classify(feature)
    }

    /// Classify multiple feature vectors
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<Classification>> {
        let mut scratch = ClassifyScratch::new();
        features
            .iter()
            .map(|f| self.model.classify_with(f, &mut scratch))
            .collect()
    }

    /// Classify every row of a dataset
    pub fn predict_dataset<D: Dataset + ?Sized>(&self, dataset: &D) -> Result<Vec<Classification>> {
        let mut scratch = ClassifyScratch::new();
        (0..dataset.len())
            .map(|i| self.model.classify_with(dataset.row(i), &mut scratch))
            .collect()
    }

    /// Predict from LibSVM file
    pub fn predict_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Classification>> {
        let dataset = self.load_libsvm(path)?;
        self.predict_dataset(&dataset)
    }

    /// Predict from CSV file
    pub fn predict_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Classification>> {
        let dataset = CSVDataset::from_file(path)?;
        self.predict_dataset(&dataset)
    }

    /// Fraction of correctly classified rows
    pub fn evaluate<D: Dataset + ?Sized>(&self, dataset: &D) -> Result<f64> {
        Ok(self.evaluate_detailed(dataset)?.accuracy())
    }

    /// Evaluate accuracy from LibSVM file
    pub fn evaluate_from_file<P: AsRef<Path>>(&self, path: P) -> Result<f64> {
        let dataset = self.load_libsvm(path)?;
        self.evaluate(&dataset)
    }

    /// Evaluate accuracy from CSV file
    pub fn evaluate_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<f64> {
        let dataset = CSVDataset::from_file(path)?;
        self.evaluate(&dataset)
    }

    /// Confusion counts over the dataset
    pub fn evaluate_detailed<D: Dataset + ?Sized>(&self, dataset: &D) -> Result<EvaluationMetrics> {
        let predictions = self.predict_dataset(dataset)?;
        let predicted: Vec<i32> = predictions.iter().map(|p| p.label).collect();
        Ok(EvaluationMetrics::from_labels(&dataset.labels(), &predicted))
    }

    /// Get model information
    pub fn info(&self) -> ModelInfo {
        let machines = self.model.machines();
        ModelInfo {
            class_ids: self.model.id_map().external_ids().to_vec(),
            decomposition: self.model.decomposition(),
            n_machines: machines.len(),
            n_support_vectors: self.model.n_support_vectors(),
            support_vectors_per_machine: machines.iter().map(|m| m.n_support_vectors()).collect(),
            biases: self.model.biases(),
            kernels: self.model.kernels().iter().map(|k| k.name().to_string()).collect(),
            dim: self.model.dim(),
            warnings: self.model.report().warnings.clone(),
        }
    }

    /// Parameters the model was trained with
    pub fn params(&self) -> &SvmParameters {
        &self.params
    }

    /// Get the underlying model
    pub fn inner(&self) -> &SvmModel<'k> {
        &self.model
    }

    pub fn into_inner(self) -> SvmModel<'k> {
        self.model
    }

    /// LibSVM files may omit trailing zero features
    fn load_libsvm<P: AsRef<Path>>(&self, path: P) -> Result<LibSVMDataset> {
        let dataset = LibSVMDataset::from_file(path)?;
        if dataset.dim() < self.model.dim() {
            dataset.pad_to(self.model.dim())
        } else {
            Ok(dataset)
        }
    }
}

/// Multi-class confusion counts
///
/// `counts[a][p]` is the number of rows of actual class `classes[a]` that
/// were predicted as `classes[p]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationMetrics {
    pub classes: Vec<i32>,
    pub counts: Vec<Vec<usize>>,
}

impl EvaluationMetrics {
    /// Tally actual against predicted labels
    pub fn from_labels(actual: &[i32], predicted: &[i32]) -> Self {
        let classes: Vec<i32> = actual
            .iter()
            .chain(predicted)
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mut counts = vec![vec![0; classes.len()]; classes.len()];
        for (a, p) in actual.iter().zip(predicted) {
            if let (Ok(ai), Ok(pi)) = (classes.binary_search(a), classes.binary_search(p)) {
                counts[ai][pi] += 1;
            }
        }
        Self { classes, counts }
    }

    fn position(&self, class: i32) -> Option<usize> {
        self.classes.binary_search(&class).ok()
    }

    /// Number of evaluated rows
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Number of correctly classified rows
    pub fn correct(&self) -> usize {
        (0..self.classes.len()).map(|i| self.counts[i][i]).sum()
    }

    /// Rows of class `actual` predicted as `predicted`
    pub fn count(&self, actual: i32, predicted: i32) -> usize {
        match (self.position(actual), self.position(predicted)) {
            (Some(a), Some(p)) => self.counts[a][p],
            _ => 0,
        }
    }

    /// Calculate accuracy: correct / total
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.correct() as f64 / total as f64
        }
    }

    /// Calculate precision of one class: TP / (TP + FP)
    pub fn precision(&self, class: i32) -> f64 {
        let Some(c) = self.position(class) else {
            return 0.0;
        };
        let predicted: usize = self.counts.iter().map(|row| row[c]).sum();
        if predicted == 0 {
            0.0
        } else {
            self.counts[c][c] as f64 / predicted as f64
        }
    }

    /// Calculate recall of one class: TP / (TP + FN)
    pub fn recall(&self, class: i32) -> f64 {
        let Some(c) = self.position(class) else {
            return 0.0;
        };
        let actual: usize = self.counts[c].iter().sum();
        if actual == 0 {
            0.0
        } else {
            self.counts[c][c] as f64 / actual as f64
        }
    }

    /// Calculate F1 score of one class
    pub fn f1_score(&self, class: i32) -> f64 {
        let p = self.precision(class);
        let r = self.recall(class);
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * (p * r) / (p + r)
        }
    }

    /// Unweighted mean of the per-class F1 scores
    pub fn macro_f1(&self) -> f64 {
        if self.classes.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.classes.iter().map(|&c| self.f1_score(c)).sum();
        sum / self.classes.len() as f64
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub class_ids: Vec<i32>,
    pub decomposition: Decomposition,
    pub n_machines: usize,
    pub n_support_vectors: usize,
    pub support_vectors_per_machine: Vec<usize>,
    pub biases: Vec<f64>,
    /// Kernel name per kernel slot
    pub kernels: Vec<String>,
    pub dim: usize,
    pub warnings: Vec<TrainingWarning>,
}
