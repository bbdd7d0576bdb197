//! Gaussian ("radial") kernel: K(a, b) = exp(-gamma * ||a - b||^2)

use crate::core::{Result, SVMError};
use crate::kernel::linear::squared_distance;
use crate::kernel::{Kernel, KernelParams};

/// Radial basis function kernel; values lie in (0, 1]
#[derive(Debug, Clone, Copy)]
pub struct RBFKernel {
    gamma: f64,
}

impl RBFKernel {
    /// # Panics
    /// Panics unless `gamma` is finite and positive
    pub fn new(gamma: f64) -> Self {
        match Self::try_new(gamma) {
            Ok(kernel) => kernel,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_new(gamma: f64) -> Result<Self> {
        if gamma.is_finite() && gamma > 0.0 {
            Ok(Self { gamma })
        } else {
            Err(SVMError::InvalidParameter(format!(
                "radial gamma must be positive, got {gamma}"
            )))
        }
    }

    /// gamma = 1 / dim, the usual default when no width is given
    pub fn for_dimension(dim: usize) -> Result<Self> {
        Self::try_new(1.0 / dim.max(1) as f64)
    }

    /// Registry construction; a missing gamma defaults to 1
    pub fn from_params(params: &KernelParams) -> Result<Self> {
        Self::try_new(params.gamma.unwrap_or(1.0))
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for RBFKernel {
    fn default() -> Self {
        Self { gamma: 1.0 }
    }
}

impl Kernel for RBFKernel {
    fn apply(&self, a: &[f64], b: &[f64]) -> f64 {
        (-self.gamma * squared_distance(a, b)).exp()
    }

    fn name(&self) -> &str {
        "radial"
    }

    fn params(&self) -> KernelParams {
        KernelParams::new().with_gamma(self.gamma)
    }
}
