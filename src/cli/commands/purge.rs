use clap::Args;
use serde_json::json;
use std::io::{BufRead, Write};

use crate::cli::utils::{output_report, output_success, read_confirmation};
use crate::cli::OutputFormat;
use crate::clients::Clients;
use crate::config::AdminConfig;
use crate::firestore::{SESSIONS, USERS, WORKOUT_LOGS};
use crate::services::DataPurger;

#[derive(Args)]
pub struct PurgeArgs {
    #[arg(long, help = "Skip the confirmation prompt")]
    pub yes: bool,
}

fn confirm_purge<R: BufRead, W: Write>(input: &mut R, prompt_out: &mut W, gym_id: &str) -> std::io::Result<bool> {
    writeln!(prompt_out, "📍 Gym: {}", gym_id)?;
    read_confirmation(
        input,
        prompt_out,
        "⚠️  Delete all members, sessions and workout logs of this gym?",
    )
}

pub async fn handle(args: PurgeArgs, config: &AdminConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let gym_id = &config.tenant.gym_id;

    if !args.yes {
        // stdout carries only the report
        let stdin = std::io::stdin();
        let confirmed = confirm_purge(&mut stdin.lock(), &mut std::io::stderr(), gym_id)?;
        if !confirmed {
            return output_success(&output_format, "Cancelled, nothing deleted", Some(json!({ "cancelled": true })));
        }
    }

    // Credentials are only resolved once the operator has agreed
    let clients = Clients::connect(config)?;
    let report = DataPurger::new(&clients.store, gym_id.as_str()).purge().await;

    let mut lines = vec![
        format!("👥 Members: {}", report.deleted(USERS)),
        format!("📅 Sessions: {}", report.deleted(SESSIONS)),
        format!("🏋️ Workout logs: {}", report.deleted(WORKOUT_LOGS)),
    ];
    for collection in &report.collections {
        if collection.failed > 0 {
            lines.push(format!("⚠️  {}: {} deletes failed", collection.collection, collection.failed));
        }
        if let Some(error) = &collection.error {
            lines.push(format!("⚠️  {}: not purged ({})", collection.collection, error));
        }
    }

    output_report(&output_format, "Demo data deleted", &lines, &report)?;

    if report.has_failures() {
        anyhow::bail!("purge of gym '{}' incomplete", gym_id);
    }
    Ok(())
}
