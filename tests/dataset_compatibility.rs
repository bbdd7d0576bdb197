//! Dataset compatibility and format validation tests
//!
//! Tests for ensuring different data formats work correctly across the pipeline

use msvm::utils::validation::class_balance;
use msvm::{api::SVM, CSVDataset, Dataset, KernelCache, LibSVMDataset};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(data: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    write!(temp_file, "{data}").expect("Failed to write");
    temp_file.flush().expect("Failed to flush");
    temp_file
}

/// Test LibSVM format variations
#[test]
fn test_libsvm_format_variations() {
    let test_cases = vec![
        // Basic format
        (
            "+1 1:0.5 3:1.2 7:0.8\n-1 2:0.3 5:2.1\n+1 1:0.4 3:1.0\n-1 2:0.2 5:1.9\n",
            "basic format",
        ),
        // With comments and empty lines
        (
            "# This is a comment\n+1 1:0.5 3:1.2\n\n# Another comment\n-1 2:0.3\n+1 1:0.6\n-1 2:0.4\n",
            "with comments",
        ),
        // Multi-class integer labels
        (
            "0 1:0.0\n0 1:0.2\n4 1:2.0\n4 1:2.2\n9 1:4.0\n9 1:4.2\n",
            "multi-class labels",
        ),
        // Integral float labels
        (
            "1.0 1:0.5 2:1.0\n1.0 1:0.4 2:1.1\n2.0 1:-0.5 2:-1.0\n2.0 1:-0.4 2:-1.1\n",
            "float labels",
        ),
        // Sparse indices (non-consecutive)
        (
            "+1 1:1.0 10:2.0 100:3.0\n+1 1:1.1 10:2.1\n-1 5:1.5 50:2.5\n-1 5:1.4 99:3.5\n",
            "sparse indices",
        ),
        // Single feature
        (
            "+1 1:2.0\n-1 1:-2.0\n+1 1:1.8\n-1 1:-1.8\n",
            "single feature",
        ),
    ];

    for (data, description) in test_cases {
        let temp_file = write_temp(data);

        // Test dataset loading
        let dataset = LibSVMDataset::from_file(temp_file.path())
            .unwrap_or_else(|e| panic!("Failed to load LibSVM dataset ({description}): {e}"));
        assert!(dataset.len() >= 4, "too few samples: {description}");
        assert!(dataset.dim() > 0, "no dimensions: {description}");

        // Test training
        let model = SVM::new()
            .train_dataset(&dataset)
            .unwrap_or_else(|e| panic!("Training failed for {description}: {e}"));

        // Predictions are always one of the training labels
        let labels = dataset.labels();
        let prediction = model.predict(dataset.row(0)).expect("dim ok");
        assert!(
            labels.contains(&prediction.label),
            "unexpected label {} for {description}",
            prediction.label
        );
    }
}

/// Test CSV format variations
#[test]
fn test_csv_format_variations() {
    let test_cases = vec![
        // With header
        (
            "feature1,feature2,label\n1.0,2.0,1\n-1.0,-2.0,-1\n2.0,1.0,1\n-2.0,-1.0,-1\n",
            "with header",
        ),
        // Without header
        ("1.0,2.0,1\n-1.0,-2.0,-1\n2.0,1.0,1\n-2.0,-1.0,-1\n", "without header"),
        // Multiple features
        (
            "1.0,2.0,3.0,1\n-1.0,-2.0,-3.0,2\n0.5,1.5,2.5,1\n-0.5,-1.5,-2.5,2\n",
            "multiple features",
        ),
        // Floating point labels
        (
            "1.0,2.0,1.0\n-1.0,-2.0,3.0\n1.2,2.0,1.0\n-1.2,-2.0,3.0\n",
            "floating point labels",
        ),
        // Three classes
        (
            "0.0,0.0,1\n0.2,0.1,1\n3.0,0.0,2\n3.1,0.2,2\n0.0,3.0,3\n0.1,3.2,3\n",
            "three classes",
        ),
    ];

    for (data, description) in test_cases {
        let temp_file = write_temp(data);

        let dataset = CSVDataset::from_file(temp_file.path())
            .unwrap_or_else(|e| panic!("Failed to load CSV dataset ({description}): {e}"));
        assert!(dataset.len() >= 4, "too few samples: {description}");
        assert!(dataset.dim() > 0, "no dimensions: {description}");

        let result = SVM::new().train_dataset(&dataset);
        assert!(result.is_ok(), "Training should succeed for: {description}");
    }
}

/// Test cross-format compatibility
#[test]
fn test_cross_format_compatibility() {
    // Create the same logical dataset in both formats
    let libsvm_data = "1 1:2.0 2:1.0\n1 1:1.8 2:1.1\n2 1:-2.0 2:-1.0\n2 1:-1.8 2:-1.1\n3 1:0.0 2:3.0\n3 1:0.2 2:3.1\n";
    let csv_data = "feature1,feature2,label\n2.0,1.0,1\n1.8,1.1,1\n-2.0,-1.0,2\n-1.8,-1.1,2\n0.0,3.0,3\n0.2,3.1,3\n";

    let libsvm_file = write_temp(libsvm_data);
    let csv_file = write_temp(csv_data);

    let libsvm_set = LibSVMDataset::from_file(libsvm_file.path())
        .and_then(LibSVMDataset::into_training_set)
        .expect("Failed to load LibSVM dataset");
    let csv_set = CSVDataset::from_file(csv_file.path())
        .and_then(CSVDataset::into_training_set)
        .expect("Failed to load CSV dataset");

    // Dense rows make both formats load to the same training set
    assert_eq!(libsvm_set, csv_set);

    // Train models on both datasets
    let libsvm_model = SVM::new()
        .pairwise(true)
        .train(&libsvm_set)
        .expect("LibSVM training should succeed");
    let csv_model = SVM::new()
        .pairwise(true)
        .train(&csv_set)
        .expect("CSV training should succeed");

    assert_eq!(libsvm_model.inner().alphas(), csv_model.inner().alphas());
    assert_eq!(libsvm_model.inner().biases(), csv_model.inner().biases());
    assert_eq!(libsvm_model.evaluate(&libsvm_set).expect("dim ok"), 1.0);
}

/// Test large dimension handling
#[test]
fn test_large_dimensions() {
    let mut libsvm_data = String::new();

    // Features at high indices are densified
    libsvm_data.push_str("1 100:1.0 1000:2.0 5000:1.5\n");
    libsvm_data.push_str("1 150:1.2 1500:1.8 4000:1.3\n");
    libsvm_data.push_str("2 200:1.0 2000:2.0 3000:1.5\n");
    libsvm_data.push_str("2 250:1.2 2500:1.8 3500:1.3\n");

    let temp_file = write_temp(&libsvm_data);
    let dataset = LibSVMDataset::from_file(temp_file.path())
        .expect("Failed to load high-dimensional dataset");

    assert_eq!(dataset.len(), 4);
    assert_eq!(dataset.dim(), 5000); // Max index was 4999 (0-based), so dim is 5000
    assert_eq!(dataset.row(0)[99], 1.0);
    assert_eq!(dataset.row(0)[100], 0.0);

    let model = SVM::new()
        .with_max_sweeps(100)
        .train_dataset(&dataset)
        .expect("Training on high-dimensional data should succeed");

    assert_eq!(model.evaluate(&dataset).expect("dim ok"), 1.0);
}

/// Test malformed data handling
#[test]
fn test_malformed_data_handling() {
    let libsvm_cases = vec![
        ("invalid_label 1:1.0\n", "invalid label"),
        ("0.5 1:1.0\n", "fractional label"),
        ("+1 invalid_feature\n", "invalid feature format"),
        ("+1 0:1.0\n", "zero-based index"),
        ("+1 1:invalid_value\n", "invalid feature value"),
        ("1 1:1 18446744073709551615:1\n2 1:2\n", "index past the maximum dimension"),
        ("1 99999999999999999999999:1\n", "index overflowing usize"),
        ("", "empty file"),
    ];
    for (data, description) in libsvm_cases {
        let temp_file = write_temp(data);
        assert!(
            LibSVMDataset::from_file(temp_file.path()).is_err(),
            "LibSVM should reject malformed data: {description}"
        );
    }

    let csv_cases = vec![
        ("1,invalid_number,1\n", "invalid number"),
        ("1.0,2.0,1\n1.0,1\n", "ragged rows"),
        ("1.0,2.0,x\n", "invalid label"),
        ("", "empty file"),
    ];
    for (data, description) in csv_cases {
        let temp_file = write_temp(data);
        assert!(
            CSVDataset::from_file(temp_file.path()).is_err(),
            "CSV should reject malformed data: {description}"
        );
    }
}

/// Test dataset statistics and validation
#[test]
fn test_dataset_validation() {
    let data = "1 1:3.0 2:4.0\n1 1:2.8 2:4.2\n1 1:3.2 2:3.8\n2 1:-3.0 2:-4.0\n2 1:-2.8 2:-4.2\n3 1:0.0 2:9.0\n";
    let temp_file = write_temp(data);
    let dataset = LibSVMDataset::from_file(temp_file.path()).expect("Failed to load dataset");

    let balance = class_balance(&dataset.labels());
    assert_eq!(balance.len(), 3);
    assert_eq!(balance[0], (1, 3, 0.5));
    assert_eq!(balance[1].1, 2);
    assert_eq!(balance[2].1, 1);

    // class 3 has a single example
    let err = SVM::new().train_dataset(&dataset).unwrap_err();
    assert!(err.is_invalid_input());
    assert!(err.to_string().contains("Class 3"));
}

/// Test kernel cache sizing against the problem size
#[test]
fn test_cache_sizing() {
    // 10 rows have 45 distinct off-diagonal pairs
    let small = KernelCache::for_problem(10, 1 << 20);
    assert_eq!(small.stats().capacity, 45);

    // capped by memory once the diagonal is paid for
    let diagonal = 1000 * std::mem::size_of::<Option<f64>>();
    let capped = KernelCache::for_problem(1000, diagonal + 2400);
    assert_eq!(capped.stats().capacity, 100);

    let tiny = KernelCache::for_problem(1000, 0);
    assert_eq!(tiny.stats().capacity, 1);
}
