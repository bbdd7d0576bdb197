//! Multi-class Support Vector Machine trained with Sequential Minimal Optimization
//!
//! Labels are decomposed into binary subproblems (one-vs-all or pairwise),
//! each solved with Platt's SMO, and the binary decisions are combined into
//! one class label plus per-class scores.

pub mod api;
pub mod cache;
pub mod core;
pub mod data;
pub mod kernel;
pub mod model;
pub mod optimizer;
pub mod partition;
pub mod persistence;
pub mod solver;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{EvaluationMetrics, ModelInfo, TrainedModel, SVM};
pub use crate::cache::{CacheStats, KernelCache};
pub use crate::core::error::{Result, SVMError};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::data::{CSVDataset, LibSVMDataset};
pub use crate::kernel::{
    Kernel, KernelParams, KernelRef, KernelRegistry, LinearKernel, PolynomialKernel, RBFKernel,
    SigmoidKernel,
};
pub use crate::model::{ClassifyScratch, SvmModel};
pub use crate::optimizer::Trainer;
pub use crate::partition::{IdMap, KernelAssignment};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
