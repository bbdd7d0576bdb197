//! Sequential Minimal Optimization (SMO) solver implementation
//!
//! Platt's SMO for one binary subproblem: the outer loop alternates between
//! sweeps over all examples and sweeps over non-bound examples, each KKT
//! violator is paired with a second multiplier by a three-level heuristic,
//! and every pair is optimized analytically.
//!
//! The decision function is `f(x) = Σ alpha_i y_i K(x_i, x) - bias`.

use crate::cache::KernelCache;
use crate::core::{
    CancellationToken, OptimizationResult, Result, SVMError, SvmParameters, TrainingSet,
};
use crate::kernel::Kernel;
use crate::partition::BinarySubproblem;
use log::debug;

/// New alphas closer than this fraction of C to 0 or C are put on the bound
const BOUND_SNAP: f64 = 1e-8;

/// SMO solver for one binary subproblem
///
/// The solver borrows everything it reads; all mutable optimization state
/// lives in a private workspace created by [`SmoSolver::solve`], so one
/// solver can be run several times with identical results.
pub struct SmoSolver<'a> {
    data: &'a TrainingSet,
    problem: &'a BinarySubproblem,
    kernel: &'a dyn Kernel,
    params: &'a SvmParameters,
    cancel: Option<&'a CancellationToken>,
    index: usize,
}

/// Mutable state of one optimization run
struct Workspace {
    alpha: Vec<f64>,
    bias: f64,
    /// E_i = f(x_i) - y_i, valid only while alpha_i is non-bound
    errors: Vec<f64>,
    cache: KernelCache,
    /// Start counter for the rotating second-choice loops
    rotation: usize,
    updates: usize,
}

impl<'a> SmoSolver<'a> {
    /// Create a solver for `problem`, whose rows index into `data`
    pub fn new(
        data: &'a TrainingSet,
        problem: &'a BinarySubproblem,
        kernel: &'a dyn Kernel,
        params: &'a SvmParameters,
    ) -> Self {
        Self {
            data,
            problem,
            kernel,
            params,
            cancel: None,
            index: 0,
        }
    }

    /// Check `token` once per outer sweep
    pub fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Machine index reported in errors and log lines
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Solve the dual problem
    ///
    /// Returns the alphas and bias once an all-examples sweep makes no
    /// update. If `max_sweeps` is reached first the current solution is
    /// returned with `converged == false`.
    pub fn solve(&self) -> Result<OptimizationResult> {
        self.validate()?;

        let n = self.problem.len();
        let mut ws = self.workspace();
        let mut examine_all = true;
        let mut sweeps = 0;
        let mut converged = false;

        while sweeps < self.params.max_sweeps {
            if self.cancel.is_some_and(|t| t.is_cancelled()) {
                debug!("machine {}: cancelled after {} sweeps", self.index, sweeps);
                return Err(SVMError::Cancelled);
            }

            let mut num_changed = 0;
            for i in 0..n {
                if (examine_all || self.is_non_bound(ws.alpha[i]))
                    && self.examine_example(&mut ws, i)?
                {
                    num_changed += 1;
                }
            }
            sweeps += 1;

            debug!(
                "machine {}: sweep {} ({}) changed {} alphas",
                self.index,
                sweeps,
                if examine_all { "all" } else { "non-bound" },
                num_changed
            );

            if examine_all {
                if num_changed == 0 {
                    converged = true;
                    break;
                }
                examine_all = false;
            } else if num_changed == 0 {
                examine_all = true;
            }
        }

        let objective_value = self.objective(&mut ws)?;
        let support_vectors = (0..n).filter(|&i| ws.alpha[i] > 0.0).collect();

        debug!(
            "machine {}: {} sweeps, {} updates, objective {:.6}, cache hit rate {:.2}",
            self.index,
            sweeps,
            ws.updates,
            objective_value,
            ws.cache.hit_rate()
        );

        Ok(OptimizationResult {
            alpha: ws.alpha,
            bias: ws.bias,
            support_vectors,
            sweeps,
            updates: ws.updates,
            converged,
            objective_value,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.problem.is_empty() {
            return Err(SVMError::EmptyDataset);
        }
        if self.problem.rows.len() != self.problem.targets.len() {
            return Err(SVMError::InvalidDataset(format!(
                "{} rows but {} targets",
                self.problem.rows.len(),
                self.problem.targets.len()
            )));
        }
        if let Some(&row) = self.problem.rows.iter().find(|&&r| r >= self.data.len()) {
            return Err(SVMError::InvalidDataset(format!(
                "row index {row} out of range for {} rows",
                self.data.len()
            )));
        }
        if let Some(&t) = self.problem.targets.iter().find(|&&t| t != 1.0 && t != -1.0) {
            return Err(SVMError::InvalidDataset(format!(
                "targets must be +1 or -1, got {t}"
            )));
        }
        Ok(())
    }

    fn workspace(&self) -> Workspace {
        let n = self.problem.len();
        Workspace {
            alpha: vec![0.0; n],
            bias: self.params.bias_init,
            errors: vec![0.0; n],
            cache: KernelCache::for_problem(n, self.params.cache_size),
            rotation: 0,
            updates: 0,
        }
    }

    fn is_non_bound(&self, alpha: f64) -> bool {
        alpha > 0.0 && alpha < self.params.c
    }

    fn degenerate(&self, message: String) -> SVMError {
        SVMError::NumericalDegeneracy {
            subproblem: self.index,
            message,
        }
    }

    /// Kernel value between subproblem rows `i` and `j`
    fn k(&self, ws: &mut Workspace, i: usize, j: usize) -> Result<f64> {
        let a = self.data.row(self.problem.rows[i]);
        let b = self.data.row(self.problem.rows[j]);
        let value = ws.cache.get_or_compute(i, j, || self.kernel.apply(a, b));
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.degenerate(format!(
                "kernel '{}' returned {value} for rows {} and {}",
                self.kernel.name(),
                self.problem.rows[i],
                self.problem.rows[j]
            )))
        }
    }

    /// f(x_i) from the current alphas
    fn output(&self, ws: &mut Workspace, i: usize) -> Result<f64> {
        let mut sum = 0.0;
        for j in 0..ws.alpha.len() {
            if ws.alpha[j] > 0.0 {
                sum += ws.alpha[j] * self.problem.targets[j] * self.k(ws, j, i)?;
            }
        }
        Ok(sum - ws.bias)
    }

    /// E_i, from the error cache for non-bound rows
    fn error(&self, ws: &mut Workspace, i: usize) -> Result<f64> {
        if self.is_non_bound(ws.alpha[i]) {
            Ok(ws.errors[i])
        } else {
            Ok(self.output(ws, i)? - self.problem.targets[i])
        }
    }

    /// Examine a single example; true if a pair step was taken
    fn examine_example(&self, ws: &mut Workspace, i2: usize) -> Result<bool> {
        let y2 = self.problem.targets[i2];
        let alpha2 = ws.alpha[i2];
        let e2 = self.error(ws, i2)?;
        let r2 = e2 * y2;
        let tol = self.params.tolerance;

        if !((r2 < -tol && alpha2 < self.params.c) || (r2 > tol && alpha2 > 0.0)) {
            return Ok(false);
        }

        let n = ws.alpha.len();

        // 1. non-bound example with the largest |E1 - E2|
        let mut best = None;
        let mut best_gap = -1.0;
        for i1 in 0..n {
            if i1 != i2 && self.is_non_bound(ws.alpha[i1]) {
                let gap = (ws.errors[i1] - e2).abs();
                if gap > best_gap {
                    best_gap = gap;
                    best = Some(i1);
                }
            }
        }
        if let Some(i1) = best {
            if self.take_step(ws, i1, i2)? {
                return Ok(true);
            }
        }

        // 2. every non-bound example, from a rotating start
        let start = ws.next_start(n);
        for k in 0..n {
            let i1 = (start + k) % n;
            if self.is_non_bound(ws.alpha[i1]) && self.take_step(ws, i1, i2)? {
                return Ok(true);
            }
        }

        // 3. every example, from a rotating start
        let start = ws.next_start(n);
        for k in 0..n {
            let i1 = (start + k) % n;
            if self.take_step(ws, i1, i2)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Jointly optimize alpha[i1] and alpha[i2]; false if no progress
    fn take_step(&self, ws: &mut Workspace, i1: usize, i2: usize) -> Result<bool> {
        if i1 == i2 {
            return Ok(false);
        }

        let c = self.params.c;
        let eps = self.params.epsilon;
        let alpha1 = ws.alpha[i1];
        let alpha2 = ws.alpha[i2];
        let y1 = self.problem.targets[i1];
        let y2 = self.problem.targets[i2];
        let e1 = self.error(ws, i1)?;
        let e2 = self.error(ws, i2)?;
        let s = y1 * y2;

        let (low, high) = if y1 != y2 {
            ((alpha2 - alpha1).max(0.0), (c + alpha2 - alpha1).min(c))
        } else {
            ((alpha1 + alpha2 - c).max(0.0), (alpha1 + alpha2).min(c))
        };
        if low >= high {
            return Ok(false);
        }

        let k11 = self.k(ws, i1, i1)?;
        let k12 = self.k(ws, i1, i2)?;
        let k22 = self.k(ws, i2, i2)?;
        let eta = k11 + k22 - 2.0 * k12;
        if !eta.is_finite() {
            return Err(self.degenerate(format!("eta is {eta} for pair ({i1}, {i2})")));
        }

        let mut a2 = if eta > 0.0 {
            (alpha2 + y2 * (e1 - e2) / eta).clamp(low, high)
        } else {
            // Objective along the constraint line is linear or concave:
            // the optimum is one of the endpoints.
            let f1 = y1 * (e1 + ws.bias) - alpha1 * k11 - s * alpha2 * k12;
            let f2 = y2 * (e2 + ws.bias) - s * alpha1 * k12 - alpha2 * k22;
            let endpoint = |a2: f64| {
                let a1 = alpha1 + s * (alpha2 - a2);
                a1 * f1
                    + a2 * f2
                    + 0.5 * a1 * a1 * k11
                    + 0.5 * a2 * a2 * k22
                    + s * a1 * a2 * k12
            };
            let low_obj = endpoint(low);
            let high_obj = endpoint(high);
            if !(low_obj.is_finite() && high_obj.is_finite()) {
                return Err(self.degenerate(format!(
                    "objective is not finite at the endpoints of pair ({i1}, {i2})"
                )));
            }

            if low_obj < high_obj - eps {
                low
            } else if low_obj > high_obj + eps {
                high
            } else if eta < 0.0 {
                return Err(self.degenerate(format!(
                    "eta = {eta} for pair ({i1}, {i2}) and neither endpoint improves the objective"
                )));
            } else {
                alpha2
            }
        };

        let snap = BOUND_SNAP * c;
        if a2 < snap {
            a2 = 0.0;
        } else if a2 > c - snap {
            a2 = c;
        }

        if (a2 - alpha2).abs() < eps * (a2 + alpha2 + eps) {
            return Ok(false);
        }

        let mut a1 = alpha1 + s * (alpha2 - a2);
        if a1 < snap {
            a2 += s * a1;
            a1 = 0.0;
        } else if a1 > c - snap {
            a2 += s * (a1 - c);
            a1 = c;
        }
        let a2 = a2.clamp(0.0, c);

        let t1 = y1 * (a1 - alpha1);
        let t2 = y2 * (a2 - alpha2);

        let b1 = e1 + t1 * k11 + t2 * k12 + ws.bias;
        let b2 = e2 + t1 * k12 + t2 * k22 + ws.bias;
        let bias = if self.is_non_bound(a1) {
            b1
        } else if self.is_non_bound(a2) {
            b2
        } else {
            0.5 * (b1 + b2)
        };
        if !bias.is_finite() {
            return Err(self.degenerate(format!("bias became {bias} at pair ({i1}, {i2})")));
        }
        let delta_b = bias - ws.bias;

        ws.alpha[i1] = a1;
        ws.alpha[i2] = a2;
        ws.bias = bias;

        for k in 0..ws.alpha.len() {
            if k == i1 || k == i2 || !self.is_non_bound(ws.alpha[k]) {
                continue;
            }
            let k1 = self.k(ws, i1, k)?;
            let k2 = self.k(ws, i2, k)?;
            ws.errors[k] += t1 * k1 + t2 * k2 - delta_b;
        }
        ws.errors[i1] = e1 + t1 * k11 + t2 * k12 - delta_b;
        ws.errors[i2] = e2 + t1 * k12 + t2 * k22 - delta_b;

        ws.updates += 1;
        Ok(true)
    }

    /// Dual objective Σ alpha_i - ½ Σ Σ alpha_i alpha_j y_i y_j K_ij
    fn objective(&self, ws: &mut Workspace) -> Result<f64> {
        let support: Vec<usize> = (0..ws.alpha.len()).filter(|&i| ws.alpha[i] > 0.0).collect();
        let mut linear = 0.0;
        let mut quadratic = 0.0;
        for &i in &support {
            linear += ws.alpha[i];
            let ai_yi = ws.alpha[i] * self.problem.targets[i];
            for &j in &support {
                quadratic += ai_yi * ws.alpha[j] * self.problem.targets[j] * self.k(ws, i, j)?;
            }
        }
        Ok(linear - 0.5 * quadratic)
    }
}

impl Workspace {
    fn next_start(&mut self, n: usize) -> usize {
        let start = self.rotation % n;
        self.rotation = self.rotation.wrapping_add(1);
        start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{LinearKernel, PolynomialKernel, RBFKernel};

    fn problem_for(targets: &[f64]) -> BinarySubproblem {
        BinarySubproblem {
            positive: 0,
            negative: Some(1),
            rows: (0..targets.len()).collect(),
            targets: targets.to_vec(),
        }
    }

    fn separable() -> (TrainingSet, BinarySubproblem) {
        let data = TrainingSet::new(
            vec![
                vec![0.0, 0.0],
                vec![0.0, 1.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
            ],
            vec![0, 0, 1, 1],
        )
        .expect("valid set");
        (data, problem_for(&[1.0, 1.0, -1.0, -1.0]))
    }

    fn overlapping() -> (TrainingSet, BinarySubproblem) {
        let rows: Vec<Vec<f64>> = (0..24)
            .map(|i| {
                let t = i as f64;
                vec![(t * 0.37).sin() * 2.0, (t * 0.91).cos() * 2.0]
            })
            .collect();
        let targets: Vec<f64> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| {
                // noisy linear rule with a few flipped labels
                let side = r[0] + 0.5 * r[1] > 0.0;
                if side ^ (i % 7 == 0) {
                    1.0
                } else {
                    -1.0
                }
            })
            .collect();
        let labels = targets.iter().map(|&t| t as i32).collect();
        let data = TrainingSet::new(rows, labels).expect("valid set");
        (data, problem_for(&targets))
    }

    fn decision(
        data: &TrainingSet,
        problem: &BinarySubproblem,
        kernel: &dyn Kernel,
        result: &OptimizationResult,
        x: &[f64],
    ) -> f64 {
        let mut sum = 0.0;
        for (i, &row) in problem.rows.iter().enumerate() {
            sum += result.alpha[i] * problem.targets[i] * kernel.apply(data.row(row), x);
        }
        sum - result.bias
    }

    #[test]
    fn test_separable_max_margin() {
        let (data, problem) = separable();
        let kernel = LinearKernel::new();
        let params = SvmParameters::default();
        let result = SmoSolver::new(&data, &problem, &kernel, &params)
            .solve()
            .expect("should solve");

        assert!(result.converged);
        // w = (-2, 0), b = -1: f(x) = 1 - 2 x1
        let f = |x: &[f64]| decision(&data, &problem, &kernel, &result, x);
        approx::assert_abs_diff_eq!(f(&[0.0, 0.5]), 1.0, epsilon = 1e-2);
        approx::assert_abs_diff_eq!(f(&[1.0, 0.5]), -1.0, epsilon = 1e-2);
        for (i, &row) in problem.rows.iter().enumerate() {
            assert!(f(data.row(row)) * problem.targets[i] > 0.0);
        }
        // the dual optimum of this problem is 2
        approx::assert_abs_diff_eq!(result.objective_value, 2.0, epsilon = 1e-2);
    }

    #[test]
    fn test_alpha_bounds_after_every_step() {
        let (data, problem) = overlapping();
        let kernel = RBFKernel::new(0.5);
        let mut params = SvmParameters::default();
        params.c = 0.7;
        let solver = SmoSolver::new(&data, &problem, &kernel, &params);
        let mut ws = solver.workspace();
        let n = problem.len();

        for _ in 0..3 {
            for i1 in 0..n {
                for i2 in 0..n {
                    solver.take_step(&mut ws, i1, i2).expect("finite kernel");
                    for &a in &ws.alpha {
                        assert!((0.0..=params.c).contains(&a), "alpha {a} out of [0, C]");
                    }
                }
            }
        }
        assert!(ws.updates > 0);

        // equality constraint Σ alpha_i y_i = 0 is preserved
        let balance: f64 = ws
            .alpha
            .iter()
            .zip(&problem.targets)
            .map(|(a, y)| a * y)
            .sum();
        approx::assert_abs_diff_eq!(balance, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_error_cache_matches_fresh_evaluation() {
        let (data, problem) = overlapping();
        let kernel = LinearKernel::new();
        let mut params = SvmParameters::default();
        params.c = 5.0;
        let solver = SmoSolver::new(&data, &problem, &kernel, &params);
        let mut ws = solver.workspace();

        for i in 0..problem.len() {
            solver.examine_example(&mut ws, i).expect("finite kernel");
        }
        for i in 0..problem.len() {
            if solver.is_non_bound(ws.alpha[i]) {
                let fresh = solver.output(&mut ws, i).expect("finite") - problem.targets[i];
                approx::assert_abs_diff_eq!(ws.errors[i], fresh, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_kkt_after_convergence() {
        let (data, problem) = overlapping();
        let kernel = RBFKernel::new(0.5);
        let mut params = SvmParameters::default();
        params.c = 2.0;
        let result = SmoSolver::new(&data, &problem, &kernel, &params)
            .solve()
            .expect("should solve");
        assert!(result.converged);

        let slack = 1e-2;
        for (i, &row) in problem.rows.iter().enumerate() {
            let margin =
                problem.targets[i] * decision(&data, &problem, &kernel, &result, data.row(row));
            let a = result.alpha[i];
            if a == 0.0 {
                assert!(margin >= 1.0 - slack, "row {i}: alpha 0, margin {margin}");
            } else if a == params.c {
                assert!(margin <= 1.0 + slack, "row {i}: alpha C, margin {margin}");
            } else {
                assert!((margin - 1.0).abs() <= slack, "row {i}: margin {margin}");
            }
        }
    }

    #[test]
    fn test_tiny_c_still_moves_alphas() {
        let (data, problem) = separable();
        let kernel = LinearKernel::new();
        for c in [1e-9, 5e-9] {
            let mut params = SvmParameters::default();
            params.c = c;
            let result = SmoSolver::new(&data, &problem, &kernel, &params)
                .solve()
                .expect("should solve");
            assert!(result.converged);
            assert!(result.alpha.iter().any(|&a| a > 0.0), "C = {c}: all alphas are 0");

            // every row is pulled to the upper bound; KKT then only needs margin <= 1
            for (i, &row) in problem.rows.iter().enumerate() {
                let a = result.alpha[i];
                assert!((0.0..=c).contains(&a));
                let margin =
                    problem.targets[i] * decision(&data, &problem, &kernel, &result, data.row(row));
                if a == 0.0 {
                    assert!(margin >= 1.0 - 1e-2, "C = {c}, row {i}: margin {margin}");
                } else {
                    assert!(margin <= 1.0 + 1e-2, "C = {c}, row {i}: margin {margin}");
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let (data, problem) = overlapping();
        let kernel = PolynomialKernel::new(3, 0.5, 1.0);
        let params = SvmParameters::default();
        let solver = SmoSolver::new(&data, &problem, &kernel, &params);

        let first = solver.solve().expect("should solve");
        let second = solver.solve().expect("should solve");
        assert_eq!(first.alpha, second.alpha);
        assert_eq!(first.bias.to_bits(), second.bias.to_bits());
        assert_eq!(first.sweeps, second.sweeps);
    }

    #[test]
    fn test_sweep_cap_is_soft() {
        let (data, problem) = overlapping();
        let kernel = RBFKernel::new(1.0);
        let mut params = SvmParameters::default();
        params.max_sweeps = 1;
        let result = SmoSolver::new(&data, &problem, &kernel, &params)
            .solve()
            .expect("non-convergence is not an error");

        assert!(!result.converged);
        assert_eq!(result.sweeps, 1);
        assert!(result.alpha.iter().all(|&a| (0.0..=params.c).contains(&a)));
    }

    #[test]
    fn test_duplicate_rows_with_zero_eta() {
        let data = TrainingSet::new(
            vec![vec![1.0, 1.0], vec![1.0, 1.0], vec![-1.0, -1.0], vec![-1.0, -1.0]],
            vec![1, 1, -1, -1],
        )
        .expect("valid set");
        let problem = problem_for(&[1.0, 1.0, -1.0, -1.0]);
        let kernel = LinearKernel::new();
        let params = SvmParameters::default();
        let result = SmoSolver::new(&data, &problem, &kernel, &params)
            .solve()
            .expect("eta = 0 only rejects the pair");
        assert!(result.converged);
        for (i, &row) in problem.rows.iter().enumerate() {
            let value = decision(&data, &problem, &kernel, &result, data.row(row));
            assert!(value * problem.targets[i] > 0.0);
        }
    }

    #[derive(Debug)]
    struct BrokenKernel;

    impl Kernel for BrokenKernel {
        fn apply(&self, a: &[f64], b: &[f64]) -> f64 {
            if a == b {
                f64::NAN
            } else {
                1.0
            }
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn test_non_finite_kernel_is_degenerate() {
        let (data, problem) = separable();
        let params = SvmParameters::default();
        let err = SmoSolver::new(&data, &problem, &BrokenKernel, &params)
            .with_index(3)
            .solve()
            .unwrap_err();
        match err {
            SVMError::NumericalDegeneracy { subproblem, message } => {
                assert_eq!(subproblem, 3);
                assert!(message.contains("broken"));
            }
            other => panic!("expected NumericalDegeneracy, got {other:?}"),
        }
    }

    #[derive(Debug)]
    struct NegativeKernel;

    impl Kernel for NegativeKernel {
        // -K_linear: eta = -|a - b|² < 0 for distinct rows
        fn apply(&self, a: &[f64], b: &[f64]) -> f64 {
            -a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>()
        }

        fn name(&self) -> &str {
            "negative"
        }
    }

    #[test]
    fn test_negative_eta_uses_endpoints() {
        let (data, problem) = separable();
        let params = SvmParameters::default();
        let solver = SmoSolver::new(&data, &problem, &NegativeKernel, &params);
        let mut ws = solver.workspace();

        // rows 0 and 2 have opposite labels and distinct features
        let stepped = solver.take_step(&mut ws, 0, 2).expect("an endpoint improves");
        assert!(stepped);
        assert!(ws.alpha[2] == 0.0 || ws.alpha[2] == params.c);
        assert_eq!(ws.alpha[0], ws.alpha[2]);
    }

    #[test]
    fn test_cancellation() {
        let (data, problem) = overlapping();
        let kernel = LinearKernel::new();
        let params = SvmParameters::default();
        let token = CancellationToken::new();
        token.cancel();
        let result = SmoSolver::new(&data, &problem, &kernel, &params)
            .with_cancellation(&token)
            .solve();
        assert!(matches!(result, Err(SVMError::Cancelled)));
    }

    #[test]
    fn test_invalid_targets() {
        let (data, mut problem) = separable();
        problem.targets[1] = 0.5;
        let kernel = LinearKernel::new();
        let params = SvmParameters::default();
        let result = SmoSolver::new(&data, &problem, &kernel, &params).solve();
        assert!(matches!(result, Err(SVMError::InvalidDataset(_))));
    }

    #[test]
    fn test_row_subset() {
        // only rows 1..=4 take part
        let data = TrainingSet::new(
            vec![
                vec![50.0],
                vec![-2.0],
                vec![-1.0],
                vec![1.0],
                vec![2.0],
                vec![-50.0],
            ],
            vec![9, 0, 0, 1, 1, 9],
        )
        .expect("valid set");
        let problem = BinarySubproblem {
            positive: 0,
            negative: Some(1),
            rows: vec![1, 2, 3, 4],
            targets: vec![1.0, 1.0, -1.0, -1.0],
        };
        let kernel = LinearKernel::new();
        let params = SvmParameters::default();
        let result = SmoSolver::new(&data, &problem, &kernel, &params)
            .solve()
            .expect("should solve");
        assert_eq!(result.alpha.len(), 4);
        assert!(decision(&data, &problem, &kernel, &result, &[-1.5]) > 0.0);
        assert!(decision(&data, &problem, &kernel, &result, &[1.5]) < 0.0);
    }
}
