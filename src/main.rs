use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use medjourney::config::Config;
use medjourney::logging;
use medjourney::progress::{JourneyBoard, PatientProgressTracker};
use medjourney::rest::{self, ApiState};
use medjourney::store::JsonFileStore;
use medjourney::workflow::StepRegistry;

#[derive(Parser)]
#[command(name = "medjourney")]
#[command(about = "Patient journey workflow and intake service for medical tourism")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// Port to listen on (default: rest_api.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List workflow steps
    Steps {
        /// Include inactive steps
        #[arg(short, long)]
        all: bool,
    },

    /// Show patients grouped by their current step
    Board,

    /// Add the default journey to an empty workflow
    Seed,

    /// Write the effective configuration to ./medjourney.toml
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;

    let is_server = matches!(cli.command, Commands::Serve { .. });
    let logging_handle = logging::init_logging(&config, is_server, cli.debug)?;
    if let Some(path) = &logging_handle.log_file_path {
        eprintln!("Logging to {}", path.display());
    }

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.rest_api.port = port;
            }
            cmd_serve(config).await?;
        }
        Commands::Steps { all } => cmd_steps(&config, all).await?,
        Commands::Board => cmd_board(&config).await?,
        Commands::Seed => cmd_seed(&config).await?,
        Commands::InitConfig => {
            config.save()?;
            println!("Wrote {}", Config::local_config_path().display());
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> Arc<JsonFileStore> {
    Arc::new(JsonFileStore::new(config.state_path()))
}

async fn cmd_serve(config: Config) -> Result<()> {
    let state = ApiState::open(config).await?;
    rest::serve(state).await
}

async fn cmd_steps(config: &Config, all: bool) -> Result<()> {
    let registry = StepRegistry::load(open_store(config))
        .await
        .context("Failed to load workflow steps")?;
    let steps = if all {
        registry.list_all()
    } else {
        registry.list_active()
    };

    if steps.is_empty() {
        println!("No workflow steps (run 'medjourney seed' to add the default journey)");
        return Ok(());
    }

    println!("Workflow ({} steps)", steps.len());
    println!("{}", "─".repeat(60));
    for step in &steps {
        let marker = if step.is_active { " " } else { "x" };
        println!(
            "{} {:>2}. {:<28} [{}]",
            marker, step.step_number, step.title, step.phase
        );
    }

    Ok(())
}

async fn cmd_board(config: &Config) -> Result<()> {
    let store = open_store(config);
    let registry = StepRegistry::load(store.clone())
        .await
        .context("Failed to load workflow steps")?;
    let tracker = PatientProgressTracker::load(store)
        .await
        .context("Failed to load patient progress")?;

    let board = JourneyBoard::build(registry.steps(), &tracker.list());
    println!("Journey board ({} patients)", board.total_patients);
    println!("{}", "─".repeat(60));
    for column in &board.columns {
        let inactive = if column.step.is_active { "" } else { " (inactive)" };
        println!(
            "{}. {}{} - {}",
            column.step.step_number,
            column.step.title,
            inactive,
            column.patients.len()
        );
        for patient in &column.patients {
            println!("     {}", patient.patient_id);
        }
    }
    if !board.unplaced.is_empty() {
        println!("Unplaced: {}", board.unplaced.len());
    }

    Ok(())
}

async fn cmd_seed(config: &Config) -> Result<()> {
    tokio::fs::create_dir_all(config.state_path())
        .await
        .context("Failed to create state directory")?;
    let mut registry = StepRegistry::load(open_store(config))
        .await
        .context("Failed to load workflow steps")?;
    let added = registry.seed_defaults().await?;
    if added == 0 {
        println!("Workflow already has {} steps; nothing seeded", registry.len());
    } else {
        println!("Seeded {} default steps", added);
    }
    Ok(())
}
