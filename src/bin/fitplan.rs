//! Fitplan CLI - Command-line harness for the Fitplan engine
//!
//! Commands:
//! - meals: Recommend meal plans from a catalog and a user context
//! - exercises: Recommend exercises from a catalog and an exercise profile
//! - target: Print the energy target for a user context
//! - doctor: Check configuration and catalog files

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use fitplan_engine::energy::EnergyCalculator;
use fitplan_engine::{
    EngineConfig, EngineError, ExerciseProfile, Recommender, StaticCatalog, UserContext,
    ENGINE_NAME, ENGINE_VERSION,
};

/// Fitplan - Rank exercises and meals retrieved from a knowledge graph
#[derive(Parser)]
#[command(name = "fitplan")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Recommend exercises and meal plans", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend meal plans for the user's current meal slot
    Meals {
        /// Candidate catalog JSON file
        #[arg(short, long)]
        catalog: PathBuf,

        /// User context JSON file (use - for stdin)
        #[arg(short, long)]
        user: PathBuf,

        /// Number of plans to return (defaults to the configured value)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Engine configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Recommend exercises for a target body part
    Exercises {
        /// Candidate catalog JSON file
        #[arg(short, long)]
        catalog: PathBuf,

        /// Exercise profile JSON file (use - for stdin)
        #[arg(short, long)]
        profile: PathBuf,

        /// Number of exercises to return (defaults to the configured value)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Engine configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Print BMR, TDEE and the meal target for a user context
    Target {
        /// User context JSON file (use - for stdin)
        #[arg(short, long)]
        user: PathBuf,
    },

    /// Check configuration and catalog files
    Doctor {
        /// Engine configuration JSON file to check
        #[arg(long)]
        config: Option<PathBuf>,

        /// Candidate catalog JSON file to check
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), FitplanCliError> {
    match cli.command {
        Commands::Meals {
            catalog,
            user,
            top_k,
            config,
            output_format,
        } => cmd_meals(&catalog, &user, top_k, config.as_deref(), output_format),

        Commands::Exercises {
            catalog,
            profile,
            top_k,
            config,
            output_format,
        } => cmd_exercises(&catalog, &profile, top_k, config.as_deref(), output_format),

        Commands::Target { user } => cmd_target(&user),

        Commands::Doctor {
            config,
            catalog,
            json,
        } => cmd_doctor(config.as_deref(), catalog.as_deref(), json),
    }
}

fn cmd_meals(
    catalog: &Path,
    user: &Path,
    top_k: Option<usize>,
    config: Option<&Path>,
    output_format: OutputFormat,
) -> Result<(), FitplanCliError> {
    let recommender = load_recommender(config)?;
    let catalog = StaticCatalog::from_file(catalog)?;
    let user: UserContext = serde_json::from_str(&read_input(user)?)?;

    let top_k = top_k.unwrap_or(recommender.config().limits.default_meal_top_k);
    let plans = recommender.recommend_meals_at(&user, &catalog, top_k, chrono::Utc::now())?;

    println!("{}", format_output(&plans, &output_format)?);
    Ok(())
}

fn cmd_exercises(
    catalog: &Path,
    profile: &Path,
    top_k: Option<usize>,
    config: Option<&Path>,
    output_format: OutputFormat,
) -> Result<(), FitplanCliError> {
    let recommender = load_recommender(config)?;
    let catalog = StaticCatalog::from_file(catalog)?;
    let profile: ExerciseProfile = serde_json::from_str(&read_input(profile)?)?;

    let top_k = top_k.unwrap_or(recommender.config().limits.default_exercise_top_k);
    let recommendation =
        recommender.recommend_exercises_detailed(&profile, &catalog, top_k, chrono::Utc::now())?;

    println!("{}", format_output(&recommendation, &output_format)?);
    Ok(())
}

fn cmd_target(user: &Path) -> Result<(), FitplanCliError> {
    let user: UserContext = serde_json::from_str(&read_input(user)?)?;
    let target = EnergyCalculator::compute(&user);
    println!("{}", serde_json::to_string_pretty(&target)?);
    Ok(())
}

fn cmd_doctor(
    config: Option<&Path>,
    catalog: Option<&Path>,
    json: bool,
) -> Result<(), FitplanCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Engine version {}", ENGINE_VERSION),
    });

    match config {
        Some(path) if !path.exists() => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: "Config file does not exist".to_string(),
        }),
        Some(path) => match EngineConfig::from_file(path) {
            Ok(config) => checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Config valid (meal cap {}, retrieval limit {})",
                    config.limits.max_meal_candidates, config.limits.retrieval_limit
                ),
            }),
            Err(e) => checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            }),
        },
        None => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: "No config file given; using defaults".to_string(),
        }),
    }

    if let Some(path) = catalog {
        if path.exists() {
            match StaticCatalog::from_file(path) {
                Ok(catalog) if catalog.is_empty() => checks.push(DoctorCheck {
                    name: "catalog".to_string(),
                    status: CheckStatus::Warning,
                    message: "Catalog contains no records".to_string(),
                }),
                Ok(catalog) => checks.push(DoctorCheck {
                    name: "catalog".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Catalog valid ({} recipes, {} exercises)",
                        catalog.recipes.len(),
                        catalog.exercises.len()
                    ),
                }),
                Err(e) => checks.push(DoctorCheck {
                    name: "catalog".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Invalid catalog: {}", e),
                }),
            }
        } else {
            checks.push(DoctorCheck {
                name: "catalog".to_string(),
                status: CheckStatus::Warning,
                message: "Catalog file does not exist".to_string(),
            });
        }
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass input files explicitly)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (`-` inputs ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        engine: ENGINE_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Fitplan Doctor Report");
        println!("=====================");
        println!("Engine:  {}", report.engine);
        println!("Version: {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(FitplanCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn load_recommender(config: Option<&Path>) -> Result<Recommender, FitplanCliError> {
    match config {
        Some(path) => Ok(Recommender::with_config(EngineConfig::from_file(path)?)?),
        None => Ok(Recommender::new()),
    }
}

fn read_input(path: &Path) -> Result<String, FitplanCliError> {
    let content = if path.as_os_str() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(FitplanCliError::NoInput);
        }
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        content
    } else {
        fs::read_to_string(path)?
    };

    if content.trim().is_empty() {
        return Err(EngineError::ParseError(format!("{} is empty", path.display())).into());
    }
    Ok(content)
}

fn format_output<T: Serialize>(value: &T, format: &OutputFormat) -> Result<String, FitplanCliError> {
    let output = match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
    };
    Ok(output)
}

// Error types

#[derive(Debug)]
enum FitplanCliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    NoInput,
    DoctorFailed,
}

impl From<io::Error> for FitplanCliError {
    fn from(e: io::Error) -> Self {
        FitplanCliError::Io(e)
    }
}

impl From<EngineError> for FitplanCliError {
    fn from(e: EngineError) -> Self {
        FitplanCliError::Engine(e)
    }
}

impl From<serde_json::Error> for FitplanCliError {
    fn from(e: serde_json::Error) -> Self {
        FitplanCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<FitplanCliError> for CliError {
    fn from(e: FitplanCliError) -> Self {
        match e {
            FitplanCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            FitplanCliError::Engine(EngineError::InvalidConfig(msg)) => CliError {
                code: "INVALID_CONFIG".to_string(),
                message: msg,
                hint: Some("Run 'fitplan doctor --config <file>' for details".to_string()),
            },
            FitplanCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check that the catalog file is a valid record document".to_string()),
            },
            FitplanCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax and required fields".to_string()),
            },
            FitplanCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "stdin is a terminal; nothing to read".to_string(),
                hint: Some("Pipe a JSON document or pass a file path".to_string()),
            },
            FitplanCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct DoctorReport {
    engine: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
