//! msvm Command Line Interface
//!
//! A command-line interface for training, evaluating, and using multi-class
//! SVM models with LibSVM and CSV data formats.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info, warn};
use msvm::api::{EvaluationMetrics, TrainedModel, SVM};
use msvm::core::Result;
use msvm::persistence::SerializableModel;
use msvm::{CSVDataset, Dataset, KernelParams, KernelRegistry, LibSVMDataset, TrainingSet};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "msvm")]
#[command(about = "Multi-class Support Vector Machine trained with SMO")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new SVM model
    Train(TrainArgs),
    /// Make predictions using a trained model
    Predict(PredictArgs),
    /// Evaluate a model on test data
    Evaluate(EvaluateArgs),
    /// Display model information
    Info(InfoArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum DataFormat {
    /// Guess from the file extension
    Auto,
    Libsvm,
    Csv,
}

#[derive(Args)]
struct TrainArgs {
    /// Training data file (LibSVM or CSV format)
    #[arg(long)]
    data: PathBuf,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    /// Data format
    #[arg(short, long, value_enum, default_value = "auto")]
    format: DataFormat,

    /// Kernel name: linear, polynomial, radial (rbf) or sigmoid
    #[arg(short, long, default_value = "linear")]
    kernel: String,

    /// Polynomial degree
    #[arg(long)]
    degree: Option<u32>,

    /// Kernel gamma
    #[arg(long)]
    gamma: Option<f64>,

    /// Kernel coef0
    #[arg(long)]
    coef0: Option<f64>,

    /// Regularization parameter C
    #[arg(short = 'C', long, default_value = "1.0")]
    c: f64,

    /// KKT tolerance
    #[arg(short, long, default_value = "0.001")]
    tolerance: f64,

    /// Minimum alpha change
    #[arg(short, long, default_value = "1e-12")]
    epsilon: f64,

    /// Initial bias of every machine
    #[arg(long, default_value = "1.0")]
    bias: f64,

    /// Train one machine per class pair instead of one per class
    #[arg(long)]
    pairwise: bool,

    /// Rescale scores to sum to one
    #[arg(long)]
    sum_to_one: bool,

    /// Normalize the training data first
    #[arg(long)]
    normalize: bool,

    /// Warn when a machine exceeds this many support vectors
    #[arg(long)]
    n_support: Option<usize>,

    /// Maximum outer sweeps per machine
    #[arg(long, default_value = "10000")]
    max_sweeps: usize,

    /// Kernel cache size in MB
    #[arg(long, default_value = "100")]
    cache_size: usize,

    /// Solve machines on worker threads
    #[arg(long)]
    parallel: bool,
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Input data file
    #[arg(long)]
    data: PathBuf,

    /// Output predictions file (optional, prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Data format
    #[arg(short, long, value_enum, default_value = "auto")]
    format: DataFormat,

    /// Show per-class scores
    #[arg(long)]
    scores: bool,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Test data file
    #[arg(long)]
    data: PathBuf,

    /// Data format
    #[arg(short, long, value_enum, default_value = "auto")]
    format: DataFormat,

    /// Show confusion matrix and per-class metrics
    #[arg(long)]
    detailed: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Info(args) => info_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn train_command(args: TrainArgs) -> Result<()> {
    info!("Training SVM model from {:?}", args.data);

    let data = load_training_set(&args.data, args.format)?;
    info!(
        "Loaded {} samples with {} dimensions",
        data.len(),
        data.dim()
    );

    let mut kernel_params = KernelParams::new();
    kernel_params.degree = args.degree;
    kernel_params.gamma = args.gamma;
    kernel_params.coef0 = args.coef0;

    let registry = KernelRegistry::with_builtin();
    let mut svm = SVM::with_kernel_name(&registry, &args.kernel, &kernel_params)?
        .with_c(args.c)
        .with_tolerance(args.tolerance)
        .with_epsilon(args.epsilon)
        .with_bias(args.bias)
        .pairwise(args.pairwise)
        .sum_to_one(args.sum_to_one)
        .normalize_data(args.normalize)
        .with_max_sweeps(args.max_sweeps)
        .with_cache_size(args.cache_size * 1024 * 1024) // Convert MB to bytes
        .parallel(args.parallel);
    if let Some(n) = args.n_support {
        svm = svm.with_n_support(n);
    }

    let model = svm.train(&data)?;
    let info = model.info();
    info!(
        "Trained {} machines with {} support vectors",
        info.n_machines, info.n_support_vectors
    );
    for warning in &info.warnings {
        warn!("{warning}");
    }

    // Save model
    SerializableModel::from_trained_model(&model).save_to_file(&args.output)?;
    info!("Model saved to: {:?}", args.output);

    // Quick evaluation on training data
    let accuracy = model.evaluate(&data)?;
    info!("Training accuracy: {:.2}%", accuracy * 100.0);

    Ok(())
}

fn load_model(path: &Path) -> Result<(SerializableModel, TrainedModel<'static>)> {
    info!("Loading model from: {path:?}");
    let serializable = SerializableModel::load_from_file(path)?;
    let model = serializable.to_trained_model(&KernelRegistry::with_builtin())?;
    Ok((serializable, model))
}

fn predict_command(args: PredictArgs) -> Result<()> {
    let (_, model) = load_model(&args.model)?;

    info!("Loading prediction data from: {:?}", args.data);
    let data = load_dataset(&args.data, args.format, model.inner().dim())?;
    let predictions = model.predict_dataset(data.as_ref())?;

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    writeln!(writer, "# Predictions for {} samples", predictions.len())?;
    writeln!(
        writer,
        "# Format: sample_index predicted_label{}",
        if args.scores { " class:score ..." } else { "" }
    )?;
    for (i, pred) in predictions.iter().enumerate() {
        write!(writer, "{} {}", i, pred.label)?;
        if args.scores {
            for (class, score) in &pred.scores {
                write!(writer, " {class}:{score:.6}")?;
            }
        }
        writeln!(writer)?;
    }
    writer.flush()?;

    if let Some(path) = args.output {
        info!("Predictions saved to: {path:?}");
    }
    Ok(())
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    let (serializable, model) = load_model(&args.model)?;

    info!("Loading test data from: {:?}", args.data);
    let data = load_dataset(&args.data, args.format, model.inner().dim())?;
    let metrics = model.evaluate_detailed(data.as_ref())?;

    // Show evaluation results
    println!("=== Model Evaluation ===");
    serializable.print_summary();

    println!("\nTest Results:");
    println!("  Samples:  {}", metrics.total());
    println!("  Accuracy: {:.2}%", metrics.accuracy() * 100.0);

    if args.detailed {
        print_detailed(&metrics);
    }

    Ok(())
}

fn print_detailed(metrics: &EvaluationMetrics) {
    println!("\nConfusion Matrix (rows: actual, columns: predicted):");
    print!("{:>8}", "");
    for class in &metrics.classes {
        print!("{class:>8}");
    }
    println!();
    for (class, row) in metrics.classes.iter().zip(&metrics.counts) {
        print!("{class:>8}");
        for count in row {
            print!("{count:>8}");
        }
        println!();
    }

    println!("\nPer-class Metrics:");
    for &class in &metrics.classes {
        println!(
            "  {class:>6}: precision {:.4}  recall {:.4}  f1 {:.4}",
            metrics.precision(class),
            metrics.recall(class),
            metrics.f1_score(class)
        );
    }
    println!("  Macro F1: {:.4}", metrics.macro_f1());
}

fn info_command(args: InfoArgs) -> Result<()> {
    let (serializable, model) = load_model(&args.model)?;

    serializable.print_summary();

    let info = model.info();
    println!("\nMachines:");
    for (m, machine) in serializable.machines.iter().enumerate() {
        let pair = match machine.negative {
            Some(negative) => format!("{} vs {}", machine.positive, negative),
            None => format!("{} vs rest", machine.positive),
        };
        println!(
            "  #{m}: {pair:<16} support vectors {:>5}  bias {:.6}",
            info.support_vectors_per_machine[m], info.biases[m]
        );
    }

    Ok(())
}

fn resolve_format(path: &Path, format: DataFormat) -> DataFormat {
    match format {
        DataFormat::Auto => detect_format(path),
        other => other,
    }
}

fn load_training_set(path: &Path, format: DataFormat) -> Result<TrainingSet> {
    match resolve_format(path, format) {
        DataFormat::Csv => CSVDataset::from_file(path)?.into_training_set(),
        _ => LibSVMDataset::from_file(path)?.into_training_set(),
    }
}

/// Load data for a model trained on `dim` features
fn load_dataset(path: &Path, format: DataFormat, dim: usize) -> Result<Box<dyn Dataset>> {
    match resolve_format(path, format) {
        DataFormat::Csv => Ok(Box::new(CSVDataset::from_file(path)?)),
        _ => {
            let data = LibSVMDataset::from_file(path)?;
            if data.dim() < dim {
                Ok(Box::new(data.pad_to(dim)?))
            } else {
                Ok(Box::new(data))
            }
        }
    }
}

fn detect_format(path: &Path) -> DataFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => DataFormat::Csv,
        Some("libsvm") | Some("svm") => DataFormat::Libsvm,
        Some(_) => {
            warn!("Unknown file extension, assuming LibSVM format");
            DataFormat::Libsvm
        }
        None => {
            warn!("No file extension, assuming LibSVM format");
            DataFormat::Libsvm
        }
    }
}
