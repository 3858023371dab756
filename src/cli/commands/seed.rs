use chrono::Utc;
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cli::utils::output_report;
use crate::cli::OutputFormat;
use crate::clients::Clients;
use crate::config::AdminConfig;
use crate::services::DemoSeeder;

#[derive(Args)]
pub struct SeedArgs {
    #[arg(long, help = "Seed even if the gym already has members (duplicates everything)")]
    pub append: bool,

    #[arg(long, help = "RNG seed for reproducible data")]
    pub rng_seed: Option<u64>,
}

pub async fn handle(args: SeedArgs, config: &AdminConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let clients = Clients::connect(config)?;
    let mut rng = match args.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    tracing::info!(gym_id = %config.tenant.gym_id, gym_name = %config.tenant.gym_name, "Seeding demo data");
    let report = DemoSeeder::new(&clients.store, config.tenant.clone())
        .allow_duplicates(args.append)
        .seed(&mut rng, Utc::now())
        .await?;

    let mut lines = vec![
        format!("📍 Gym: {} ({})", config.tenant.gym_id, config.tenant.gym_name),
        format!("👥 Members: {}", report.members),
        format!("📅 Sessions: {}", report.sessions),
        format!("🏋️ Workout logs: {}", report.workout_logs),
    ];
    if report.failures > 0 {
        lines.push(format!("⚠️  Failed inserts: {}", report.failures));
    }
    if let Some(url) = &config.app_url {
        lines.push(format!("🔗 Check the manager app: {}", url));
    }
    lines.push("🗑️  Remove with: gym-admin purge".to_string());

    output_report(&output_format, "Demo data seeded", &lines, &report)
}
