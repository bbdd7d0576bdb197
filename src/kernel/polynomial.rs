//! Polynomial kernel: K(a, b) = (gamma * <a, b> + coef0)^degree

use crate::core::{Result, SVMError};
use crate::kernel::linear::dot;
use crate::kernel::traits::{Kernel, KernelParams};

#[derive(Debug, Clone)]
pub struct PolynomialKernel {
    pub degree: u32,
    pub gamma: f64,
    pub coef0: f64,
}

impl PolynomialKernel {
    /// Kernel from trusted parameters
    ///
    /// # Panics
    /// Panics on a zero degree, a non-positive gamma or a non-finite coef0
    ///
    /// ```
    /// use msvm::kernel::PolynomialKernel;
    ///
    /// // (a·b + 1)^3
    /// let cubic = PolynomialKernel::new(3, 1.0, 1.0);
    /// assert_eq!(cubic.degree, 3);
    /// ```
    pub fn new(degree: u32, gamma: f64, coef0: f64) -> Self {
        match Self::try_new(degree, gamma, coef0) {
            Ok(kernel) => kernel,
            Err(e) => panic!("{e}"),
        }
    }

    /// Kernel from user-supplied parameters
    pub fn try_new(degree: u32, gamma: f64, coef0: f64) -> Result<Self> {
        let problem = if degree == 0 {
            Some("polynomial degree must be positive".to_string())
        } else if !(gamma.is_finite() && gamma > 0.0) {
            Some(format!("polynomial gamma must be positive, got {gamma}"))
        } else if !coef0.is_finite() {
            Some(format!("polynomial coef0 must be finite, got {coef0}"))
        } else {
            None
        };
        match problem {
            Some(message) => Err(SVMError::InvalidParameter(message)),
            None => Ok(Self {
                degree,
                gamma,
                coef0,
            }),
        }
    }

    /// Registry construction; missing values default to degree 2, gamma 1, coef0 1
    pub fn from_params(params: &KernelParams) -> Result<Self> {
        Self::try_new(
            params.degree.unwrap_or(2),
            params.gamma.unwrap_or(1.0),
            params.coef0.unwrap_or(1.0),
        )
    }
}

impl Default for PolynomialKernel {
    fn default() -> Self {
        Self::new(2, 1.0, 1.0)
    }
}

impl Kernel for PolynomialKernel {
    fn apply(&self, a: &[f64], b: &[f64]) -> f64 {
        (self.gamma * dot(a, b) + self.coef0).powi(self.degree as i32)
    }

    fn name(&self) -> &str {
        "polynomial"
    }

    fn params(&self) -> KernelParams {
        KernelParams::new()
            .with_degree(self.degree)
            .with_gamma(self.gamma)
            .with_coef0(self.coef0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_polynomial_known_values() {
        // <a, b> = 4, (4 + 1)^2
        let quadratic = PolynomialKernel::default();
        assert_relative_eq!(quadratic.apply(&[1.0, 2.0], &[2.0, 1.0]), 25.0, epsilon = 1e-10);

        // <a, a> = 25, (0.5 * 25 + 2)^3
        let cubic = PolynomialKernel::new(3, 0.5, 2.0);
        assert_relative_eq!(cubic.apply(&[3.0, 4.0], &[3.0, 4.0]), 3048.625, epsilon = 1e-6);
    }

    #[test]
    fn test_polynomial_kernel_negative_base() {
        // Odd degree keeps the sign of the base
        let kernel = PolynomialKernel::new(3, 1.0, 0.0);
        let result = kernel.apply(&[1.0], &[-2.0]);
        assert_relative_eq!(result, -8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_polynomial_from_params_defaults() {
        let kernel = PolynomialKernel::from_params(&KernelParams::default()).expect("defaults");
        assert_eq!(kernel.degree, 2);
        assert_eq!(kernel.gamma, 1.0);
        assert_eq!(kernel.coef0, 1.0);
        assert_eq!(kernel.params().degree, Some(2));
    }

    #[test]
    fn test_polynomial_try_new_rejects_bad_input() {
        assert!(PolynomialKernel::try_new(0, 1.0, 1.0).is_err());
        assert!(PolynomialKernel::try_new(2, 0.0, 1.0).is_err());
        assert!(PolynomialKernel::try_new(2, 1.0, f64::INFINITY).is_err());
    }

    #[test]
    #[should_panic(expected = "polynomial gamma must be positive")]
    fn test_new_panics_on_bad_gamma() {
        PolynomialKernel::new(2, -1.0, 1.0);
    }
}
