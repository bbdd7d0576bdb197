//! Core traits for SVM implementation

use crate::core::{Classification, Result, TrainingSet};

/// Dataset abstraction over labeled dense feature rows
pub trait Dataset: Send + Sync {
    /// Number of samples in the dataset
    fn len(&self) -> usize;

    /// Number of features (dimensionality)
    fn dim(&self) -> usize;

    /// Feature vector of a single sample
    ///
    /// # Panics
    /// Panics if index >= len()
    fn row(&self, i: usize) -> &[f64];

    /// Class id of a single sample
    fn label(&self, i: usize) -> i32;

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All class ids, in row order
    fn labels(&self) -> Vec<i32> {
        (0..self.len()).map(|i| self.label(i)).collect()
    }

    /// Copy the dataset into a validated training set
    fn to_training_set(&self) -> Result<TrainingSet> {
        let rows = (0..self.len()).map(|i| self.row(i).to_vec()).collect();
        TrainingSet::new(rows, self.labels())
    }
}

impl Dataset for TrainingSet {
    fn len(&self) -> usize {
        TrainingSet::len(self)
    }

    fn dim(&self) -> usize {
        TrainingSet::dim(self)
    }

    fn row(&self, i: usize) -> &[f64] {
        TrainingSet::row(self, i)
    }

    fn label(&self, i: usize) -> i32 {
        TrainingSet::label(self, i)
    }

    fn labels(&self) -> Vec<i32> {
        TrainingSet::labels(self).to_vec()
    }

    fn to_training_set(&self) -> Result<TrainingSet> {
        Ok(self.clone())
    }
}

/// Trained multi-class classifier
pub trait Classifier: Send + Sync {
    /// Classify a single feature vector
    fn classify(&self, feature: &[f64]) -> Result<Classification>;

    /// Classify several feature vectors
    fn classify_batch(&self, features: &[Vec<f64>]) -> Result<Vec<Classification>> {
        features.iter().map(|f| self.classify(f)).collect()
    }

    /// Number of classes known to the classifier
    fn n_classes(&self) -> usize;
}
