//! Semibayes - semi-supervised Naive Bayes trainer and predictor
//!
//! The main entry point, handling:
//! - CSV ingestion of partially labeled binary feature tables
//! - Bayesian training to posterior distributions (train)
//! - Posterior predictive classification (predict)
//! - Priors/artifact validation (check)

use clap::{Args, Parser, Subcommand};
use sb_common::error::format_error_human;
use sb_common::{Error, OutputFormat, Result};
use sb_core::config::{load_priors, Priors};
use sb_core::data::load_csv;
use sb_core::exit_codes::ExitCode;
use sb_core::inference::{train, Termination, TrainOptions};
use sb_core::logging::{generate_run_id, init_logging, LogConfig};
use sb_core::model::ModelArtifact;
use sb_core::output::{
    render_predictions, CheckReport, ModelCheck, PredictReport, PredictionRecord, TrainReport,
};
use sb_core::predict::{predict_probs, predicted_class};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{info, warn};

/// Semibayes - Bayesian Naive Bayes over binary features with
/// semi-supervised training
#[derive(Parser)]
#[command(name = "semibayes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Output format for reports and prediction payloads
    #[arg(long, short = 'f', global = true, default_value = "csv")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from CSV and save the model artifact
    Train(TrainArgs),

    /// Load a model artifact and predict unlabeled instances from CSV
    Predict(PredictArgs),

    /// Validate a priors file and/or a model artifact
    Check(CheckArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Training CSV file (features then label as last column; blank label
    /// means unlabeled)
    #[arg(long = "train", value_name = "CSV")]
    train: PathBuf,

    /// Output model JSON file
    #[arg(long, value_name = "FILE", default_value = "model.json")]
    out_model: PathBuf,

    /// Also write soft posteriors for unlabeled training rows to FILE
    #[arg(long, value_name = "FILE")]
    predict_unlabeled: Option<PathBuf>,

    /// Number of classes
    #[arg(long, default_value_t = 2)]
    classes: usize,

    /// Convergence tolerance on posterior means
    #[arg(long, default_value_t = 1e-6)]
    tolerance: f64,

    /// Maximum training cycles
    #[arg(long, default_value_t = 100)]
    max_cycles: usize,

    /// Priors JSON file (feature_alpha, feature_beta, class_alpha)
    #[arg(long, value_name = "FILE")]
    priors: Option<PathBuf>,

    /// Override the Beta prior alpha for features
    #[arg(long, value_name = "A")]
    feature_alpha: Option<f64>,

    /// Override the Beta prior beta for features
    #[arg(long, value_name = "B")]
    feature_beta: Option<f64>,

    /// Override the symmetric Dirichlet concentration for classes
    #[arg(long, value_name = "A")]
    class_alpha: Option<f64>,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Model JSON file produced by training
    #[arg(long, value_name = "FILE")]
    model: PathBuf,

    /// Input CSV file (rows with a blank label are scored)
    #[arg(long, value_name = "CSV")]
    input: PathBuf,

    /// Output file for predictions
    #[arg(long, value_name = "FILE")]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Priors JSON file to validate
    #[arg(long, value_name = "FILE")]
    priors: Option<PathBuf>,

    /// Model artifact to validate
    #[arg(long, value_name = "FILE")]
    model: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_flags(cli.global.verbose, cli.global.quiet, cli.global.no_color);
    init_logging(&log_config);

    let run_id = generate_run_id();
    let span = tracing::info_span!("run", id = %run_id);
    let _guard = span.enter();

    let outcome = match &cli.command {
        Commands::Train(args) => cmd_train(args, &cli.global),
        Commands::Predict(args) => cmd_predict(args, &cli.global),
        Commands::Check(args) => cmd_check(args, &cli.global),
        Commands::Version => {
            println!("semibayes {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::Clean)
        }
    };

    let code = match outcome {
        Ok(code) => code,
        Err(err) => {
            let use_color = !cli.global.no_color && std::io::stderr().is_terminal();
            eprintln!("{}", format_error_human(&err, use_color));
            ExitCode::from(&err)
        }
    };
    std::process::exit(code.as_i32());
}

fn resolve_priors(args: &TrainArgs) -> Result<Priors> {
    let mut priors = match &args.priors {
        Some(path) => load_priors(path)?,
        None => Priors::default(),
    };
    if let Some(alpha) = args.feature_alpha {
        priors.feature_alpha = alpha;
    }
    if let Some(beta) = args.feature_beta {
        priors.feature_beta = beta;
    }
    if let Some(alpha) = args.class_alpha {
        priors.class_alpha = alpha;
    }
    priors.validate()?;
    Ok(priors)
}

fn cmd_train(args: &TrainArgs, global: &GlobalOpts) -> Result<ExitCode> {
    let priors = resolve_priors(args)?;
    let dataset = load_csv(&args.train)?;
    let unlabeled = dataset.unlabeled_indices();
    info!(
        instances = dataset.len(),
        features = dataset.num_features(),
        unlabeled = unlabeled.len(),
        "training data loaded"
    );

    let options = TrainOptions {
        num_classes: args.classes,
        tolerance: args.tolerance,
        max_cycles: args.max_cycles,
    };
    let result = train(&dataset, &priors, &options)?;
    match result.termination {
        Termination::Converged => info!(cycles = result.cycles, "training converged"),
        Termination::MaxCycles => warn!(
            cycles = result.cycles,
            "cycle cap reached before convergence; posteriors may still be moving"
        ),
    }

    let artifact =
        ModelArtifact::from_training(&result, &dataset, args.predict_unlabeled.is_some());
    artifact.save(&args.out_model)?;

    if let Some(path) = &args.predict_unlabeled {
        let records: Vec<PredictionRecord> = unlabeled
            .iter()
            .map(|&i| {
                let probs = result.responsibilities.row(i).to_vec();
                PredictionRecord {
                    instance: i,
                    predicted: predicted_class(&probs),
                    probs,
                }
            })
            .collect();
        let payload = render_predictions(global.format, &records, args.classes)?;
        std::fs::write(path, payload)?;
        info!(count = records.len(), path = %path.display(), "soft posteriors written");
    }

    let report = TrainReport {
        model: args.out_model.display().to_string(),
        converged: result.termination == Termination::Converged,
        cycles: result.cycles,
        instances: dataset.len(),
        features: dataset.num_features(),
        classes: args.classes,
        unlabeled: unlabeled.len(),
        soft_labels: args
            .predict_unlabeled
            .as_ref()
            .map(|p| p.display().to_string()),
    };
    println!("{}", report.render(global.format)?);

    Ok(match result.termination {
        Termination::Converged => ExitCode::Clean,
        Termination::MaxCycles => ExitCode::MaxCycles,
    })
}

fn cmd_predict(args: &PredictArgs, global: &GlobalOpts) -> Result<ExitCode> {
    let artifact = ModelArtifact::load(&args.model)?;
    let model = artifact.point_model();
    let dataset = load_csv(&args.input)?;

    // Fail before any output is produced.
    if dataset.num_features() != model.num_features() {
        return Err(Error::DimensionMismatch {
            what: "feature vector",
            expected: model.num_features(),
            actual: dataset.num_features(),
        });
    }

    let unlabeled = dataset.unlabeled_indices();
    if unlabeled.is_empty() {
        warn!("no unlabeled instances found in input CSV");
    }

    let mut records = Vec::with_capacity(unlabeled.len());
    for &i in &unlabeled {
        let probs = predict_probs(&model, &dataset.instances()[i].features)?;
        records.push(PredictionRecord {
            instance: i,
            predicted: predicted_class(&probs),
            probs,
        });
    }

    let payload = render_predictions(global.format, &records, model.num_classes())?;
    std::fs::write(&args.output, payload)?;

    let report = PredictReport {
        output: args.output.display().to_string(),
        scored: records.len(),
        total: dataset.len(),
    };
    println!("{}", report.render(global.format)?);
    Ok(ExitCode::Clean)
}

fn cmd_check(args: &CheckArgs, global: &GlobalOpts) -> Result<ExitCode> {
    if args.priors.is_none() && args.model.is_none() {
        return Err(Error::Config(
            "nothing to check; pass --priors and/or --model".into(),
        ));
    }

    let mut report = CheckReport {
        priors_ok: None,
        model: None,
    };

    if let Some(path) = &args.priors {
        load_priors(path)?;
        report.priors_ok = Some(true);
    }

    if let Some(path) = &args.model {
        let artifact = ModelArtifact::load(path)?;
        report.model = Some(ModelCheck {
            classes: artifact.num_classes,
            features: artifact.num_features,
            repaired_cells: artifact.degenerate_cells(),
            converged: artifact.converged,
            cycles: artifact.cycles,
        });
    }

    println!("{}", report.render(global.format)?);
    Ok(ExitCode::Clean)
}
