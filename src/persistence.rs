//! Model serialization and persistence
//!
//! This module provides functionality to save and load trained SVM models
//! for use with the CLI application and other scenarios where model persistence is needed.
//!
//! Kernels are stored by registry name and parameters; loading resolves them
//! again through a [`KernelRegistry`], so custom kernels load as long as the
//! same registry entries exist.

use crate::api::TrainedModel;
use crate::core::{Decomposition, Result, SVMError, SvmParameters, TrainingReport, TrainingSet};
use crate::kernel::{KernelParams, KernelRef, KernelRegistry};
use crate::model::{BinaryMachine, ModelParts, SvmModel};
use crate::partition::IdMap;
use crate::utils::scaling::Normalization;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

/// Bumped whenever the layout below changes incompatibly
pub const FORMAT_VERSION: u32 = 1;

/// Serializable representation of a trained SVM model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableModel {
    /// Kernel of every kernel slot
    pub kernels: Vec<SerializableKernel>,
    /// One entry per binary machine
    pub machines: Vec<SerializableMachine>,
    /// External class ids in internal order
    pub class_ids: IdMap,
    pub decomposition: Decomposition,
    pub normalization: Option<Normalization>,
    pub sum_to_one: bool,
    /// Training rows the alphas refer to (after normalization)
    pub training_rows: Vec<Vec<f64>>,
    pub training_labels: Vec<i32>,
    pub report: TrainingReport,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Kernel stored by registry name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableKernel {
    pub name: String,
    #[serde(default)]
    pub params: KernelParams,
}

/// One binary machine; targets are rebuilt from the training labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableMachine {
    /// External id of the +1 class
    pub positive: i32,
    /// External id of the -1 class (pairwise only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative: Option<i32>,
    pub rows: Vec<usize>,
    pub alpha: Vec<f64>,
    pub bias: f64,
    pub kernel: usize,
}

/// Model metadata for tracking and validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub format_version: u32,
    /// Library version used to create the model
    pub library_version: String,
    /// Number of support vectors over all machines
    pub n_support_vectors: usize,
    /// Training parameters used
    pub training_params: SvmParameters,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl SerializableModel {
    /// Create a serializable model from a trained model
    pub fn from_trained_model(model: &TrainedModel<'_>) -> Self {
        Self::from_model(model.inner(), model.params())
    }

    /// Create a serializable model from a model and its parameters
    pub fn from_model(model: &SvmModel<'_>, params: &SvmParameters) -> Self {
        let ids = model.id_map();
        let external = |internal: usize| ids.external_ids()[internal];

        let machines = model
            .machines()
            .iter()
            .map(|m| SerializableMachine {
                positive: external(m.positive),
                negative: m.negative.map(external),
                rows: m.rows.clone(),
                alpha: m.alpha.clone(),
                bias: m.bias,
                kernel: m.kernel,
            })
            .collect();

        let kernels = model
            .kernels()
            .iter()
            .map(|k| SerializableKernel {
                name: k.name().to_string(),
                params: k.params(),
            })
            .collect();

        let data = model.training_data();
        Self {
            kernels,
            machines,
            class_ids: ids.clone(),
            decomposition: model.decomposition(),
            normalization: model.normalization().cloned(),
            sum_to_one: model.sum_to_one(),
            training_rows: data.rows().to_vec(),
            training_labels: data.labels().to_vec(),
            report: model.report().clone(),
            metadata: ModelMetadata {
                format_version: FORMAT_VERSION,
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                n_support_vectors: model.n_support_vectors(),
                training_params: params.clone(),
                created_at: Utc::now(),
            },
        }
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SVMError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let model: Self = serde_json::from_reader(reader)
            .map_err(|e| SVMError::SerializationError(e.to_string()))?;
        if model.metadata.format_version != FORMAT_VERSION {
            return Err(SVMError::SerializationError(format!(
                "unsupported model format version {} (expected {FORMAT_VERSION})",
                model.metadata.format_version
            )));
        }
        Ok(model)
    }

    /// Rebuild a trained model, resolving kernels through `registry`
    pub fn to_trained_model(&self, registry: &KernelRegistry) -> Result<TrainedModel<'static>> {
        let model = self.to_model(registry)?;
        Ok(TrainedModel::from_model(
            model,
            self.metadata.training_params.clone(),
        ))
    }

    /// Rebuild the model, resolving kernels through `registry`
    pub fn to_model(&self, registry: &KernelRegistry) -> Result<SvmModel<'static>> {
        let kernels = self
            .kernels
            .iter()
            .map(|k| registry.create(&k.name, &k.params).map(KernelRef::from))
            .collect::<Result<Vec<_>>>()?;

        let data = TrainingSet::new(self.training_rows.clone(), self.training_labels.clone())?;
        let internal = |class: i32| {
            self.class_ids.internal(class).ok_or_else(|| {
                SVMError::SerializationError(format!("machine refers to unknown class {class}"))
            })
        };

        let mut machines = Vec::with_capacity(self.machines.len());
        for (m, machine) in self.machines.iter().enumerate() {
            let targets = machine
                .rows
                .iter()
                .map(|&row| match data.labels().get(row) {
                    Some(&label) if label == machine.positive => Ok(1.0),
                    Some(_) => Ok(-1.0),
                    None => Err(SVMError::SerializationError(format!(
                        "machine {m}: row {row} out of range"
                    ))),
                })
                .collect::<Result<Vec<f64>>>()?;

            machines.push(BinaryMachine {
                positive: internal(machine.positive)?,
                negative: machine.negative.map(internal).transpose()?,
                rows: machine.rows.clone(),
                targets,
                alpha: machine.alpha.clone(),
                bias: machine.bias,
                kernel: machine.kernel,
            });
        }

        SvmModel::from_parts(ModelParts {
            kernels,
            data: Arc::new(data),
            machines,
            ids: self.class_ids.clone(),
            decomposition: self.decomposition,
            normalization: self.normalization.clone(),
            sum_to_one: self.sum_to_one,
            report: self.report.clone(),
        })
    }

    /// Print model summary
    pub fn print_summary(&self) {
        let params = &self.metadata.training_params;
        println!("=== SVM Model Summary ===");
        println!("Classes: {:?}", self.class_ids.external_ids());
        println!("Decomposition: {:?}", self.decomposition);
        println!("Machines: {}", self.machines.len());
        for kernel in &self.kernels {
            println!("Kernel: {} {:?}", kernel.name, kernel.params);
        }
        println!("Features: {}", self.training_rows.first().map_or(0, Vec::len));
        println!("Support Vectors: {}", self.metadata.n_support_vectors);
        println!("Normalized: {}", self.normalization.is_some());
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at.to_rfc3339());
        println!("Training Parameters:");
        println!("  C: {}", params.c);
        println!("  Tolerance: {}", params.tolerance);
        println!("  Epsilon: {}", params.epsilon);
        println!("  Max Sweeps: {}", params.max_sweeps);
        if !self.report.warnings.is_empty() {
            println!("Warnings:");
            for warning in &self.report.warnings {
                println!("  {warning}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SVM;
    use crate::kernel::{Kernel, PolynomialKernel};
    use approx::assert_relative_eq;
    use tempfile::NamedTempFile;

    fn two_class_set() -> TrainingSet {
        TrainingSet::new(
            vec![
                vec![2.0, 0.0],
                vec![1.5, 0.5],
                vec![-2.0, 0.0],
                vec![-1.5, -0.5],
            ],
            vec![4, 4, 9, 9],
        )
        .expect("valid set")
    }

    #[test]
    fn test_model_serialization() -> Result<()> {
        let data = two_class_set();
        let model = SVM::new().with_c(5.0).train(&data)?;
        let serializable = SerializableModel::from_trained_model(&model);

        // Test saving and loading
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        serializable.save_to_file(temp_file.path())?;

        let loaded = SerializableModel::load_from_file(temp_file.path())?;
        assert_eq!(loaded.kernels, serializable.kernels);
        assert_eq!(loaded.machines, serializable.machines);
        assert_eq!(loaded.class_ids.external_ids(), &[4, 9]);
        assert_eq!(loaded.metadata.training_params.c, 5.0);
        assert_eq!(loaded.metadata.created_at, serializable.metadata.created_at);

        let restored = loaded.to_trained_model(&KernelRegistry::with_builtin())?;
        for (a, b) in restored.inner().biases().iter().zip(model.inner().biases()) {
            assert_relative_eq!(*a, b, epsilon = 1e-12);
        }
        for (a, b) in restored.inner().alphas().iter().zip(model.inner().alphas()) {
            assert_eq!(a.len(), b.len());
            for (x, y) in a.iter().zip(b) {
                assert_relative_eq!(*x, *y, epsilon = 1e-12);
            }
        }
        for query in [[1.0, 1.0], [-1.0, 0.3], [0.1, -2.0]] {
            assert_eq!(restored.predict(&query)?.label, model.predict(&query)?.label);
        }
        Ok(())
    }

    #[test]
    fn test_pairwise_normalized_roundtrip() -> Result<()> {
        let data = TrainingSet::new(
            vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![10.0, 10.0],
                vec![11.0, 10.0],
                vec![0.0, 10.0],
                vec![1.0, 11.0],
            ],
            vec![1, 1, 2, 2, 3, 3],
        )?;
        let poly = PolynomialKernel::new(2, 0.1, 1.0);
        let model = SVM::with_kernel(KernelRef::copied(&poly))
            .pairwise(true)
            .normalize_data(true)
            .sum_to_one(true)
            .train(&data)?;

        let json = serde_json::to_string(&SerializableModel::from_trained_model(&model))
            .expect("serializable");
        let loaded: SerializableModel = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(loaded.kernels[0].name, "polynomial");
        assert!(loaded.normalization.is_some());

        let restored = loaded.to_model(&KernelRegistry::with_builtin())?;
        assert_eq!(restored.kernels()[0].params(), poly.params());
        for row in data.rows() {
            assert_eq!(restored.classify(row)?.label, model.predict(row)?.label);
        }
        Ok(())
    }

    #[test]
    fn test_unknown_kernel_on_load() -> Result<()> {
        let model = SVM::new().train(&two_class_set())?;
        let mut serializable = SerializableModel::from_trained_model(&model);
        serializable.kernels[0].name = "custom".to_string();

        let err = serializable
            .to_model(&KernelRegistry::with_builtin())
            .unwrap_err();
        assert!(matches!(err, SVMError::UnknownKernel(name) if name == "custom"));
        Ok(())
    }

    #[test]
    fn test_corrupt_machine_rejected() -> Result<()> {
        let model = SVM::new().train(&two_class_set())?;
        let mut serializable = SerializableModel::from_trained_model(&model);
        serializable.machines[0].rows[0] = 99;
        assert!(matches!(
            serializable.to_model(&KernelRegistry::with_builtin()),
            Err(SVMError::SerializationError(_))
        ));

        let mut serializable = SerializableModel::from_trained_model(&model);
        serializable.machines[0].positive = 5;
        assert!(serializable.to_model(&KernelRegistry::with_builtin()).is_err());
        Ok(())
    }

    #[test]
    fn test_format_version_checked() -> Result<()> {
        let model = SVM::new().train(&two_class_set())?;
        let mut serializable = SerializableModel::from_trained_model(&model);
        serializable.metadata.format_version = FORMAT_VERSION + 1;

        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        serializable.save_to_file(temp_file.path())?;
        assert!(matches!(
            SerializableModel::load_from_file(temp_file.path()),
            Err(SVMError::SerializationError(_))
        ));
        Ok(())
    }
}
