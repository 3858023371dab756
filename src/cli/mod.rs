pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::{self, AdminConfig};

#[derive(Parser)]
#[command(name = "gym-admin")]
#[command(about = "GYM MATCH admin CLI - demo accounts, demo data seeding and cleanup")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Gym (tenant) id to operate on")]
    pub gym_id: Option<String>,

    #[arg(long, global = true, help = "Gym display name used in role claims")]
    pub gym_name: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication accounts for the manager app")]
    Accounts {
        #[command(subcommand)]
        cmd: commands::accounts::AccountCommands,
    },

    #[command(about = "Insert demo members, sessions and workout logs")]
    Seed(commands::seed::SeedArgs),

    #[command(about = "Delete all demo data of a gym")]
    Purge(commands::purge::PurgeArgs),

    #[command(about = "Session inspection and fixes")]
    Sessions {
        #[command(subcommand)]
        cmd: commands::sessions::SessionCommands,
    },

    #[command(about = "Gym-level settings")]
    Gyms {
        #[command(subcommand)]
        cmd: commands::gyms::GymCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = config::config().with_tenant(cli.gym_id.clone(), cli.gym_name.clone());

    dispatch(cli.command, &config, output_format).await
}

async fn dispatch(command: Commands, config: &AdminConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match command {
        Commands::Accounts { cmd } => commands::accounts::handle(cmd, config, output_format).await,
        Commands::Seed(args) => commands::seed::handle(args, config, output_format).await,
        Commands::Purge(args) => commands::purge::handle(args, config, output_format).await,
        Commands::Sessions { cmd } => commands::sessions::handle(cmd, config, output_format).await,
        Commands::Gyms { cmd } => commands::gyms::handle(cmd, config, output_format).await,
    }
}
