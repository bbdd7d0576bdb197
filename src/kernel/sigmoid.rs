//! Sigmoid (Tanh) Kernel Implementation
//!
//! K(a, b) = tanh(γ * <a, b> + r)
//!
//! The sigmoid kernel is not positive semi-definite for every parameter
//! choice, so the SMO solver may meet pairs with a non-positive second
//! derivative (eta <= 0) when it is used.

use crate::core::{Result, SVMError};
use crate::kernel::linear::dot;
use crate::kernel::traits::{Kernel, KernelParams};

/// Sigmoid (Hyperbolic Tangent) kernel
#[derive(Debug, Clone)]
pub struct SigmoidKernel {
    /// Scaling parameter for the dot product (must be positive)
    pub gamma: f64,
    /// Bias/offset parameter
    pub coef0: f64,
}

impl SigmoidKernel {
    /// Creates a new Sigmoid kernel with specified parameters
    ///
    /// # Panics
    /// Panics if gamma is not positive
    pub fn new(gamma: f64, coef0: f64) -> Self {
        assert!(gamma > 0.0, "Gamma must be positive");
        Self { gamma, coef0 }
    }

    /// Fallible constructor used when parameters come from user input
    pub fn try_new(gamma: f64, coef0: f64) -> Result<Self> {
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "sigmoid gamma must be positive, got {gamma}"
            )));
        }
        if !coef0.is_finite() {
            return Err(SVMError::InvalidParameter(format!(
                "sigmoid coef0 must be finite, got {coef0}"
            )));
        }
        Ok(Self { gamma, coef0 })
    }

    /// Build from registry parameters (defaults: gamma 1, coef0 0)
    pub fn from_params(params: &KernelParams) -> Result<Self> {
        Self::try_new(params.gamma.unwrap_or(1.0), params.coef0.unwrap_or(0.0))
    }
}

impl Kernel for SigmoidKernel {
    fn apply(&self, a: &[f64], b: &[f64]) -> f64 {
        (self.gamma * dot(a, b) + self.coef0).tanh()
    }

    fn name(&self) -> &str {
        "sigmoid"
    }

    fn params(&self) -> KernelParams {
        KernelParams::new()
            .with_gamma(self.gamma)
            .with_coef0(self.coef0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sigmoid_known_value() {
        let kernel = SigmoidKernel::new(0.5, -1.0);
        // dot = 2, tanh(0.5 * 2 - 1) = tanh(0) = 0
        assert_relative_eq!(kernel.apply(&[1.0, 1.0], &[1.0, 1.0]), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_sigmoid_bounded() {
        let kernel = SigmoidKernel::new(10.0, 0.0);
        let k = kernel.apply(&[100.0], &[100.0]);
        assert!(k <= 1.0 && k > 0.99);
        let k = kernel.apply(&[100.0], &[-100.0]);
        assert!(k >= -1.0 && k < -0.99);
    }

    #[test]
    fn test_sigmoid_params_roundtrip() {
        let kernel = SigmoidKernel::new(0.25, 0.5);
        let rebuilt = SigmoidKernel::from_params(&kernel.params()).expect("valid");
        assert_eq!(rebuilt.gamma, 0.25);
        assert_eq!(rebuilt.coef0, 0.5);
    }

    #[test]
    fn test_sigmoid_rejects_bad_gamma() {
        assert!(SigmoidKernel::try_new(0.0, 1.0).is_err());
        assert!(SigmoidKernel::try_new(1.0, f64::NAN).is_err());
    }
}
