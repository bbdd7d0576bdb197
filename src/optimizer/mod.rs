//! Multi-class training
//!
//! The trainer validates the input, decomposes the labels into binary
//! subproblems, solves each with SMO (sequentially or on the rayon pool)
//! and assembles the solutions into an [`SvmModel`].

use crate::core::{
    CancellationToken, Dataset, OptimizationResult, Result, SvmParameters,
    TrainingReport, TrainingSet, TrainingWarning,
};
use crate::kernel::{Kernel, KernelRef};
use crate::model::{BinaryMachine, ModelParts, SvmModel};
use crate::partition::{BinarySubproblem, ClassPartitioner, KernelAssignment};
use crate::solver::SmoSolver;
use crate::utils::scaling::Normalization;
use log::{info, warn};
use rayon::prelude::*;
use std::sync::Arc;

/// Trains multi-class SVM models with fixed kernels and parameters
#[derive(Debug, Clone)]
pub struct Trainer<'k> {
    kernels: KernelAssignment<'k>,
    params: SvmParameters,
    cancel: Option<CancellationToken>,
}

impl<'k> Trainer<'k> {
    /// Create a trainer with the given kernels and configuration
    pub fn new(kernels: KernelAssignment<'k>, params: SvmParameters) -> Self {
        Self {
            kernels,
            params,
            cancel: None,
        }
    }

    /// One shared kernel, default configuration
    pub fn with_kernel(kernel: KernelRef<'k>) -> Self {
        Self::new(KernelAssignment::Shared(kernel), SvmParameters::default())
    }

    /// Stop at the next sweep once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn params(&self) -> &SvmParameters {
        &self.params
    }

    pub fn kernels(&self) -> &KernelAssignment<'k> {
        &self.kernels
    }

    /// Train on any dataset
    pub fn train_dataset<D: Dataset + ?Sized>(&self, dataset: &D) -> Result<SvmModel<'k>> {
        self.train(&dataset.to_training_set()?)
    }

    /// Train one machine per subproblem
    ///
    /// Fails before any optimization on invalid parameters or labels, and
    /// as a whole if any machine fails: no partially trained model is
    /// returned. Hitting the sweep cap only adds a warning to the report.
    pub fn train(&self, data: &TrainingSet) -> Result<SvmModel<'k>> {
        self.params.validate()?;

        let partitioner = ClassPartitioner::new(data.labels())?;
        let decomposition = self.params.decomposition();
        let subproblems = partitioner.partition(decomposition);
        let resolved = self
            .kernels
            .resolve(partitioner.id_map(), decomposition, &subproblems)?;

        let normalization = self.params.normalize_data.then(|| Normalization::fit(data));
        let data = Arc::new(match &normalization {
            Some(norm) => norm.apply(data),
            None => data.clone(),
        });

        info!(
            "training {} {:?} machines on {} rows x {} features ({} classes, C = {})",
            subproblems.len(),
            decomposition,
            data.len(),
            data.dim(),
            partitioner.n_classes(),
            self.params.c
        );

        let results = {
            let jobs: Vec<Job<'_>> = subproblems
                .iter()
                .enumerate()
                .map(|(index, problem)| Job {
                    index,
                    problem,
                    kernel: resolved.kernels[resolved.slots[index]].kernel(),
                })
                .collect();

            if self.params.parallel && jobs.len() > 1 {
                self.solve_parallel(&data, &jobs)?
            } else {
                jobs.iter()
                    .map(|job| self.solve_one(&data, job))
                    .collect::<Result<Vec<_>>>()?
            }
        };

        let mut report = TrainingReport::default();
        let mut machines = Vec::with_capacity(results.len());
        for ((index, problem), result) in subproblems.into_iter().enumerate().zip(results) {
            self.collect_warnings(index, &result, &mut report);
            report.sweeps.push(result.sweeps);
            report.objective_values.push(result.objective_value);
            machines.push(BinaryMachine {
                positive: problem.positive,
                negative: problem.negative,
                rows: problem.rows,
                targets: problem.targets,
                alpha: result.alpha,
                bias: result.bias,
                kernel: resolved.slots[index],
            });
        }

        let model = SvmModel::from_parts(ModelParts {
            kernels: resolved.kernels,
            data,
            machines,
            ids: partitioner.id_map().clone(),
            decomposition,
            normalization,
            sum_to_one: self.params.sum_to_one,
            report,
        })?;

        info!(
            "trained {} machines, {} support vectors, {} warnings",
            model.machines().len(),
            model.n_support_vectors(),
            model.report().warnings.len()
        );
        Ok(model)
    }

    fn solve_one(&self, data: &TrainingSet, job: &Job<'_>) -> Result<OptimizationResult> {
        let solver =
            SmoSolver::new(data, job.problem, job.kernel, &self.params).with_index(job.index);
        match &self.cancel {
            Some(token) => solver.with_cancellation(token).solve(),
            None => solver.solve(),
        }
    }

    /// Solve on the rayon pool; results come back in job order
    fn solve_parallel(
        &self,
        data: &TrainingSet,
        jobs: &[Job<'_>],
    ) -> Result<Vec<OptimizationResult>> {
        let results: Vec<Result<OptimizationResult>> = jobs
            .par_iter()
            .map(|job| self.solve_one(data, job))
            .collect();
        // first failure in job order, as in a sequential run
        results.into_iter().collect()
    }

    fn collect_warnings(
        &self,
        index: usize,
        result: &OptimizationResult,
        report: &mut TrainingReport,
    ) {
        let mut push = |warning: TrainingWarning| {
            warn!("{warning}");
            report.warnings.push(warning);
        };

        if !result.converged {
            push(TrainingWarning::NonConvergence {
                machine: index,
                sweeps: result.sweeps,
            });
        }
        if let Some(target) = self.params.n_support {
            let actual = result.support_vectors.len();
            if actual > target {
                push(TrainingWarning::SupportVectorTarget {
                    machine: index,
                    target,
                    actual,
                });
            }
        }
    }
}

/// One subproblem with its resolved kernel
struct Job<'a> {
    index: usize,
    problem: &'a BinarySubproblem,
    kernel: &'a dyn Kernel,
}
