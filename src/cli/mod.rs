use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Instrument;

use crate::config::WorkshopYardConfig;
use crate::telemetry::{create_command_span, generate_correlation_id, init_telemetry};

pub mod commands;

use commands::{
    board::BoardCommand, create::CreateCommand, depart::DepartCommand, history::HistoryCommand,
    init::InitCommand, schedule::ScheduleCommand, stages::StagesCommand, status::SetStatusCommand,
    Command,
};

#[derive(Parser)]
#[command(name = "workshop-yard")]
#[command(about = "Shared service-order board for a repair shop yard")]
#[command(long_about = "Tracks vehicles through the workshop: a live board grouped by stage, \
                       status changes, same-day departure marking and order registration. \
                       Every session reads and writes the same store file.")]
pub struct Cli {
    /// Configuration file (defaults to ./workshop-yard.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the order store and its schema
    Init {
        /// Also write the effective configuration to this TOML file
        #[arg(long, value_name = "PATH")]
        write_config: Option<PathBuf>,
    },
    /// Show active orders grouped by stage
    Board {
        /// Print the board as JSON
        #[arg(long)]
        json: bool,
        /// Keep polling every N seconds until Ctrl-C
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
    /// Register a new service order
    Create {
        order_number: String,
        plate: String,
        customer: String,
        /// Free-text note shown under the order
        #[arg(long)]
        note: Option<String>,
    },
    /// Move an order to another workflow stage
    SetStatus { order_number: String, status: String },
    /// Toggle the same-day departure flag
    Depart { order_number: String },
    /// Set or clear the scheduled completion time
    Schedule {
        order_number: String,
        /// Date and time, e.g. "2024-01-01 17:30"
        #[arg(required_unless_present = "clear")]
        when: Option<String>,
        /// Remove the current estimate
        #[arg(long, conflicts_with = "when")]
        clear: bool,
    },
    /// List every order, completed ones included
    History {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the configured workflow stages
    Stages,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Init { .. } => "init",
            Commands::Board { .. } => "board",
            Commands::Create { .. } => "create",
            Commands::SetStatus { .. } => "set-status",
            Commands::Depart { .. } => "depart",
            Commands::Schedule { .. } => "schedule",
            Commands::History { .. } => "history",
            Commands::Stages => "stages",
        }
    }

    fn order_number(&self) -> Option<&str> {
        match self {
            Commands::Create { order_number, .. }
            | Commands::SetStatus { order_number, .. }
            | Commands::Depart { order_number }
            | Commands::Schedule { order_number, .. } => Some(order_number.as_str()),
            _ => None,
        }
    }
}

/// Load configuration and logging, then run the selected command
pub async fn run(cli: Cli) -> Result<()> {
    WorkshopYardConfig::load_env_file()?;
    let config = WorkshopYardConfig::load(cli.config.as_deref())?;
    init_telemetry(&config.observability)?;

    let correlation_id = generate_correlation_id();
    let span = create_command_span(cli.command.name(), cli.command.order_number(), &correlation_id);

    dispatch(cli.command, config).instrument(span).await
}

async fn dispatch(command: Commands, config: WorkshopYardConfig) -> Result<()> {
    match command {
        Commands::Init { write_config } => InitCommand::new(config, write_config).execute().await,
        Commands::Board { json, watch } => {
            BoardCommand::new(config)
                .with_json(json)
                .with_watch(watch)
                .execute()
                .await
        }
        Commands::Create {
            order_number,
            plate,
            customer,
            note,
        } => {
            CreateCommand::new(config, order_number, plate, customer, note)
                .execute()
                .await
        }
        Commands::SetStatus {
            order_number,
            status,
        } => SetStatusCommand::new(config, order_number, status).execute().await,
        Commands::Depart { order_number } => DepartCommand::new(config, order_number).execute().await,
        Commands::Schedule {
            order_number,
            when,
            clear,
        } => {
            let when = if clear { None } else { when };
            ScheduleCommand::new(config, order_number, when).execute().await
        }
        Commands::History { json } => HistoryCommand::new(config).with_json(json).execute().await,
        Commands::Stages => StagesCommand::new(config).execute().await,
    }
}
