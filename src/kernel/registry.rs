//! Explicit name → factory registry for kernel construction
//!
//! Kernel names are resolved once, when a trainer is configured or a model
//! is loaded. There is no global registry: callers pass the one they want.

use crate::core::{Result, SVMError};
use crate::kernel::{
    Kernel, KernelParams, LinearKernel, PolynomialKernel, RBFKernel, SigmoidKernel,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Builds a kernel instance from its parameters
pub type KernelFactory = Box<dyn Fn(&KernelParams) -> Result<Arc<dyn Kernel>> + Send + Sync>;

pub struct KernelRegistry {
    factories: BTreeMap<String, KernelFactory>,
}

impl KernelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with the built-in kernels: `linear`, `polynomial`,
    /// `radial` (alias `rbf`) and `sigmoid`
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("linear", |_| Ok(Arc::new(LinearKernel::new()) as Arc<dyn Kernel>));
        registry.register("polynomial", |p| {
            Ok(Arc::new(PolynomialKernel::from_params(p)?) as Arc<dyn Kernel>)
        });
        registry.register("radial", |p| {
            Ok(Arc::new(RBFKernel::from_params(p)?) as Arc<dyn Kernel>)
        });
        registry.register("rbf", |p| {
            Ok(Arc::new(RBFKernel::from_params(p)?) as Arc<dyn Kernel>)
        });
        registry.register("sigmoid", |p| {
            Ok(Arc::new(SigmoidKernel::from_params(p)?) as Arc<dyn Kernel>)
        });
        registry
    }

    /// Register (or replace) a factory under `name`
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&KernelParams) -> Result<Arc<dyn Kernel>> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    /// Instantiate the kernel registered under `name`
    pub fn create(&self, name: &str, params: &KernelParams) -> Result<Arc<dyn Kernel>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| SVMError::UnknownKernel(name.to_string()))?;
        factory(params)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl Default for KernelRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl fmt::Debug for KernelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
