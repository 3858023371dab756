use clap::Subcommand;

use crate::cli::utils::output_report;
use crate::cli::OutputFormat;
use crate::clients::Clients;
use crate::config::AdminConfig;
use crate::services::maintenance;

#[derive(Subcommand)]
pub enum SessionCommands {
    #[command(about = "Show sessions shared with members")]
    Shared {
        #[arg(long, help = "Maximum number of sessions to show", default_value = "5")]
        limit: u32,
    },

    #[command(about = "Add memberEmail to sessions that lack it, using the member's email")]
    BackfillEmails,
}

pub async fn handle(cmd: SessionCommands, config: &AdminConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let clients = Clients::connect(config)?;

    match cmd {
        SessionCommands::Shared { limit } => {
            let sessions = maintenance::shared_sessions(&clients.store, limit).await?;

            let mut lines = vec![format!("📊 Shared sessions: {}", sessions.len()), String::new()];
            for session in &sessions {
                lines.push(format!("✅ Session: {}", session.id));
                lines.push(format!(
                    "   Member email: {}",
                    session.member_email.as_deref().unwrap_or("unset")
                ));
                lines.push(format!(
                    "   Date: {}",
                    session
                        .date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "-".to_string())
                ));
                lines.push(format!("   Log: {}", if session.has_workout_log { "yes" } else { "no" }));
                lines.push(format!("   Exercises: {}", session.exercise_count));
                lines.push(String::new());
            }

            output_report(&output_format, "Shared sessions", &lines, &sessions)
        }
        SessionCommands::BackfillEmails => {
            let report = maintenance::backfill_member_emails(&clients.store).await?;
            let lines = vec![
                format!("📊 Sessions: {}", report.total),
                format!("   - updated: {}", report.updated),
                format!("   - skipped: {}", report.skipped),
                format!("   - failed: {}", report.failed),
            ];
            output_report(&output_format, "memberEmail backfill", &lines, &report)
        }
    }
}
