//! Optimization solvers for SVM training

pub mod smo;

pub use smo::SmoSolver;
