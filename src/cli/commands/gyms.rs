use clap::Subcommand;

use crate::cli::utils::output_report;
use crate::cli::OutputFormat;
use crate::clients::Clients;
use crate::config::AdminConfig;
use crate::services::maintenance::{self, DEFAULT_PT_PASSWORD};

#[derive(Subcommand)]
pub enum GymCommands {
    #[command(about = "Set the shared personal-training password on all gyms and enable it for all users")]
    PtPassword {
        #[arg(long, help = "Shared password", default_value = DEFAULT_PT_PASSWORD)]
        password: String,
    },
}

pub async fn handle(cmd: GymCommands, config: &AdminConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        GymCommands::PtPassword { password } => {
            let clients = Clients::connect(config)?;
            let report = maintenance::apply_pt_password_defaults(&clients.store, &password).await?;

            let lines = vec![
                format!("🏢 Gyms updated: {}", report.gyms_updated),
                format!("👥 Users updated: {}", report.users_updated),
                format!("   - shared password: {}", password),
                "   - password type: common".to_string(),
                format!("   - failed: {}", report.failed),
            ];
            output_report(&output_format, "PT password defaults", &lines, &report)
        }
    }
}
