//! Trained multi-class SVM model
//!
//! A model holds one binary machine per subproblem together with the
//! training rows its alphas refer to. It is immutable once built: all
//! per-call buffers live in a caller-owned [`ClassifyScratch`], so one model
//! can serve concurrent queries.

use crate::core::{
    Classification, Classifier, Decomposition, Result, SVMError, TrainingReport, TrainingSet,
};
use crate::kernel::{Kernel, KernelRef};
use crate::partition::{machine_count, IdMap};
use crate::utils::scaling::Normalization;
use crate::utils::validation::check_dimension;
use std::sync::Arc;

/// Solution of one binary subproblem
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMachine {
    /// Internal id of the class with target +1
    pub positive: usize,
    /// Internal id of the class with target -1 (pairwise only)
    pub negative: Option<usize>,
    /// Training rows of the subproblem
    pub rows: Vec<usize>,
    /// ±1 targets aligned with `rows`
    pub targets: Vec<f64>,
    /// Lagrange multipliers aligned with `rows`
    pub alpha: Vec<f64>,
    pub bias: f64,
    /// Index into the model's kernel list
    pub kernel: usize,
}

impl BinaryMachine {
    /// Number of rows with a non-zero alpha
    pub fn n_support_vectors(&self) -> usize {
        self.alpha.iter().filter(|&&a| a > 0.0).count()
    }

    /// Training-set indices of the support vectors
    pub fn support_vectors(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows
            .iter()
            .zip(&self.alpha)
            .filter(|(_, &a)| a > 0.0)
            .map(|(&row, _)| row)
    }

    /// f(x) = Σ alpha_i y_i K(x_i, x) - bias over already-normalized `x`
    pub fn decision_value(&self, data: &TrainingSet, kernel: &dyn Kernel, x: &[f64]) -> f64 {
        let mut sum = 0.0;
        for ((&row, &alpha), &y) in self.rows.iter().zip(&self.alpha).zip(&self.targets) {
            if alpha > 0.0 {
                sum += alpha * y * kernel.apply(data.row(row), x);
            }
        }
        sum - self.bias
    }
}

/// Everything needed to assemble a model
#[derive(Debug, Clone)]
pub struct ModelParts<'k> {
    pub kernels: Vec<KernelRef<'k>>,
    /// Training rows as seen by the kernels (after normalization)
    pub data: Arc<TrainingSet>,
    pub machines: Vec<BinaryMachine>,
    pub ids: IdMap,
    pub decomposition: Decomposition,
    pub normalization: Option<Normalization>,
    pub sum_to_one: bool,
    pub report: TrainingReport,
}

/// Reusable buffers for [`SvmModel::classify_with`]
#[derive(Debug, Clone, Default)]
pub struct ClassifyScratch {
    feature: Vec<f64>,
    values: Vec<f64>,
}

impl ClassifyScratch {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Trained multi-class SVM
#[derive(Debug, Clone)]
pub struct SvmModel<'k> {
    kernels: Vec<KernelRef<'k>>,
    data: Arc<TrainingSet>,
    machines: Vec<BinaryMachine>,
    ids: IdMap,
    decomposition: Decomposition,
    normalization: Option<Normalization>,
    sum_to_one: bool,
    report: TrainingReport,
}

impl<'k> SvmModel<'k> {
    /// Assemble a model, checking that the parts fit together
    pub fn from_parts(parts: ModelParts<'k>) -> Result<Self> {
        let ModelParts {
            kernels,
            data,
            machines,
            ids,
            decomposition,
            normalization,
            sum_to_one,
            report,
        } = parts;

        let invalid = |msg: String| -> Result<Self> { Err(SVMError::InvalidParameter(msg)) };

        if ids.len() < 2 {
            return invalid(format!("a model needs two classes, got {}", ids.len()));
        }
        let expected = machine_count(decomposition, ids.len());
        if machines.len() != expected {
            return invalid(format!(
                "{} classes need {expected} machines, got {}",
                ids.len(),
                machines.len()
            ));
        }
        if let Some(norm) = &normalization {
            if norm.dim() != data.dim() {
                return invalid(format!(
                    "normalization has {} features, training data {}",
                    norm.dim(),
                    data.dim()
                ));
            }
        }

        for (m, machine) in machines.iter().enumerate() {
            let n = machine.rows.len();
            if machine.targets.len() != n || machine.alpha.len() != n {
                return invalid(format!(
                    "machine {m}: {n} rows, {} targets, {} alphas",
                    machine.targets.len(),
                    machine.alpha.len()
                ));
            }
            if machine.kernel >= kernels.len() {
                return invalid(format!("machine {m}: no kernel slot {}", machine.kernel));
            }
            if machine.rows.iter().any(|&r| r >= data.len()) {
                return invalid(format!("machine {m}: row index out of range"));
            }
            if machine.positive >= ids.len() || machine.negative.is_some_and(|c| c >= ids.len())
            {
                return invalid(format!("machine {m}: class id out of range"));
            }
            if machine.negative.is_some() != (decomposition == Decomposition::Pairwise) {
                return invalid(format!(
                    "machine {m}: class pair does not match {decomposition:?}"
                ));
            }
            if !machine.bias.is_finite() || machine.alpha.iter().any(|a| !a.is_finite()) {
                return invalid(format!("machine {m}: non-finite coefficients"));
            }
        }

        Ok(Self {
            kernels,
            data,
            machines,
            ids,
            decomposition,
            normalization,
            sum_to_one,
            report,
        })
    }

    /// Alpha vector of every machine
    pub fn alphas(&self) -> Vec<&[f64]> {
        self.machines.iter().map(|m| m.alpha.as_slice()).collect()
    }

    /// Bias of every machine
    pub fn biases(&self) -> Vec<f64> {
        self.machines.iter().map(|m| m.bias).collect()
    }

    pub fn machines(&self) -> &[BinaryMachine] {
        &self.machines
    }

    pub fn kernels(&self) -> &[KernelRef<'k>] {
        &self.kernels
    }

    /// Kernel used by machine `m`, `None` past the last machine
    pub fn kernel_of(&self, m: usize) -> Option<&dyn Kernel> {
        let slot = self.machines.get(m)?.kernel;
        self.kernels.get(slot).map(|k| k.kernel())
    }

    pub fn id_map(&self) -> &IdMap {
        &self.ids
    }

    pub fn decomposition(&self) -> Decomposition {
        self.decomposition
    }

    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    pub fn normalization(&self) -> Option<&Normalization> {
        self.normalization.as_ref()
    }

    pub fn sum_to_one(&self) -> bool {
        self.sum_to_one
    }

    /// Training rows the alphas refer to (normalized if enabled)
    pub fn training_data(&self) -> &TrainingSet {
        &self.data
    }

    /// Feature dimension expected by `classify`
    pub fn dim(&self) -> usize {
        self.data.dim()
    }

    /// Total number of support vectors over all machines
    pub fn n_support_vectors(&self) -> usize {
        self.machines.iter().map(BinaryMachine::n_support_vectors).sum()
    }

    /// Raw decision value of every machine for `feature`
    pub fn decision_values(&self, feature: &[f64]) -> Result<Vec<f64>> {
        let mut scratch = ClassifyScratch::new();
        self.evaluate(feature, &mut scratch)?;
        Ok(scratch.values)
    }

    /// Classify one feature vector
    pub fn classify(&self, feature: &[f64]) -> Result<Classification> {
        self.classify_with(feature, &mut ClassifyScratch::new())
    }

    /// Classify using caller-owned buffers
    pub fn classify_with(
        &self,
        feature: &[f64],
        scratch: &mut ClassifyScratch,
    ) -> Result<Classification> {
        self.evaluate(feature, scratch)?;
        let values = &scratch.values;
        let k = self.ids.len();

        let mut scores = vec![0.0; k];
        match self.decomposition {
            Decomposition::OneVsAll => {
                for (machine, &value) in self.machines.iter().zip(values) {
                    scores[machine.positive] = value;
                }
            }
            Decomposition::Pairwise => {
                for (machine, &value) in self.machines.iter().zip(values) {
                    let winner = match machine.negative {
                        Some(negative) if value < 0.0 => negative,
                        _ => machine.positive,
                    };
                    scores[winner] += 1.0;
                }
            }
        }

        // ties go to the lowest internal id
        let mut winner = 0;
        for (class, &score) in scores.iter().enumerate().skip(1) {
            if score > scores[winner] {
                winner = class;
            }
        }

        if self.sum_to_one {
            normalize_scores(self.decomposition, &mut scores, self.machines.len());
        }

        let external = self.ids.external_ids();
        Ok(Classification {
            label: external[winner],
            scores: external.iter().copied().zip(scores).collect(),
        })
    }

    /// Fill `scratch.values` with one decision value per machine
    fn evaluate(&self, feature: &[f64], scratch: &mut ClassifyScratch) -> Result<()> {
        check_dimension(self.data.dim(), feature)?;

        let ClassifyScratch { feature: buf, values } = scratch;
        let x: &[f64] = match &self.normalization {
            Some(norm) => {
                norm.transform_into(feature, buf);
                buf.as_slice()
            }
            None => feature,
        };

        values.clear();
        for machine in &self.machines {
            let kernel = self.kernels[machine.kernel].kernel();
            values.push(machine.decision_value(&self.data, kernel, x));
        }
        Ok(())
    }
}

fn normalize_scores(decomposition: Decomposition, scores: &mut [f64], n_machines: usize) {
    match decomposition {
        Decomposition::OneVsAll => {
            let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
            let shift = if min < 0.0 { -min } else { 0.0 };
            let sum: f64 = scores.iter().map(|s| s + shift).sum();
            if sum > 0.0 {
                for s in scores.iter_mut() {
                    *s = (*s + shift) / sum;
                }
            } else {
                let uniform = 1.0 / scores.len() as f64;
                scores.iter_mut().for_each(|s| *s = uniform);
            }
        }
        Decomposition::Pairwise => {
            let pairs = n_machines.max(1) as f64;
            for s in scores.iter_mut() {
                *s /= pairs;
            }
        }
    }
}

impl Classifier for SvmModel<'_> {
    fn classify(&self, feature: &[f64]) -> Result<Classification> {
        SvmModel::classify(self, feature)
    }

    fn n_classes(&self) -> usize {
        self.ids.len()
    }
}
