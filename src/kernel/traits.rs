//! Kernel trait definition and kernel ownership

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Kernel function trait
///
/// A kernel K(a, b) must be deterministic, symmetric and finite for finite
/// inputs. Implementations are shared read-only between training threads,
/// so they must not keep unsynchronized mutable state.
pub trait Kernel: Send + Sync + fmt::Debug {
    /// Compute kernel value K(a, b)
    fn apply(&self, a: &[f64], b: &[f64]) -> f64;

    /// Registry name of this kernel type
    fn name(&self) -> &str;

    /// Parameters needed to rebuild this kernel through a registry
    fn params(&self) -> KernelParams {
        KernelParams::default()
    }
}

/// Named kernel hyperparameters; unset values fall back to kernel defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KernelParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coef0: Option<f64>,
}

impl KernelParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_degree(mut self, degree: u32) -> Self {
        self.degree = Some(degree);
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = Some(gamma);
        self
    }

    pub fn with_coef0(mut self, coef0: f64) -> Self {
        self.coef0 = Some(coef0);
        self
    }
}

/// A kernel held by a model, either owned or borrowed from the caller.
///
/// The ownership mode is chosen once, at construction:
/// - [`KernelRef::copied`] clones the caller's instance,
/// - [`KernelRef::transferred`] takes over a boxed instance,
/// - [`KernelRef::borrowed`] keeps a reference; the caller's kernel must
///   outlive every model built from it, which the lifetime `'k` enforces.
#[derive(Clone)]
pub enum KernelRef<'k> {
    Owned(Arc<dyn Kernel>),
    Borrowed(&'k dyn Kernel),
}

impl<'k> KernelRef<'k> {
    /// Owned copy of the caller's kernel
    pub fn copied<K: Kernel + Clone + 'static>(kernel: &K) -> Self {
        KernelRef::Owned(Arc::new(kernel.clone()))
    }

    /// Take ownership of a heap-allocated kernel
    pub fn transferred(kernel: Box<dyn Kernel>) -> Self {
        KernelRef::Owned(Arc::from(kernel))
    }

    /// Use the caller's kernel without taking ownership
    pub fn borrowed(kernel: &'k dyn Kernel) -> Self {
        KernelRef::Borrowed(kernel)
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, KernelRef::Owned(_))
    }

    pub fn kernel(&self) -> &dyn Kernel {
        match self {
            KernelRef::Owned(k) => k.as_ref(),
            KernelRef::Borrowed(k) => *k,
        }
    }
}

impl<'k> Deref for KernelRef<'k> {
    type Target = dyn Kernel + 'k;

    fn deref(&self) -> &Self::Target {
        match self {
            KernelRef::Owned(k) => k.as_ref(),
            KernelRef::Borrowed(k) => *k,
        }
    }
}

impl From<Arc<dyn Kernel>> for KernelRef<'static> {
    fn from(kernel: Arc<dyn Kernel>) -> Self {
        KernelRef::Owned(kernel)
    }
}

impl fmt::Debug for KernelRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.is_owned() { "owned" } else { "borrowed" };
        write!(f, "KernelRef({mode}, {:?})", self.kernel())
    }
}
