use clap::Subcommand;

use crate::cli::utils::output_report;
use crate::cli::OutputFormat;
use crate::clients::Clients;
use crate::config::AdminConfig;
use crate::services::{AccountProvisioner, ProvisionStatus, DEMO_ACCOUNTS};

#[derive(Subcommand)]
pub enum AccountCommands {
    #[command(about = "Create the owner/manager/staff demo logins, or refresh their role claims")]
    Provision,
}

pub async fn handle(cmd: AccountCommands, config: &AdminConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AccountCommands::Provision => {
            let clients = Clients::connect(config)?;
            let report = AccountProvisioner::new(&clients.auth, config.tenant.clone())
                .provision(&DEMO_ACCOUNTS)
                .await;

            let mut lines = vec![
                format!(
                    "created: {}, updated: {}, failed: {}",
                    report.count(ProvisionStatus::Created),
                    report.count(ProvisionStatus::Updated),
                    report.count(ProvisionStatus::Failed)
                ),
                String::new(),
            ];
            for account in &report.accounts {
                match account.status {
                    ProvisionStatus::Failed => {
                        lines.push(format!("✗ {}", account.email));
                        if let Some(error) = &account.error {
                            lines.push(format!("   Error: {}", error));
                        }
                    }
                    _ => {
                        lines.push(format!("👤 {}", account.display_name));
                        lines.push(format!("   Email: {}", account.email));
                        lines.push(format!("   Password: {}", account.password));
                        lines.push(format!("   Role: {}", account.role.as_str()));
                        lines.push(format!("   Gym: {}", account.gym_name));
                    }
                }
                lines.push(String::new());
            }
            lines.push("Role claims can take a few seconds to show up after the first login.".to_string());

            output_report(&output_format, "Demo accounts", &lines, &report)
        }
    }
}
