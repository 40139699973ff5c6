use clap::Args;
use colored::Colorize;
use svcmod_import::{HealthCheckOutcome, ImportClient};
use tracing::debug;

use super::Credentials;

#[derive(Args)]
pub struct ProbeCommand {
    /// Base URL of the import deploy service
    #[arg(long, env = "SVCMOD_IMPORT_DEPLOY_URL")]
    pub deploy_url: String,

    #[command(flatten)]
    pub credentials: Credentials,

    /// Id of the import instance
    pub import_id: String,
}

impl ProbeCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let token = self
            .credentials
            .token()
            .ok_or_else(|| anyhow::anyhow!("--jwt is required to probe an import"))?;

        let client = ImportClient::new(&self.deploy_url)?;
        debug!("Probing {}", client.instance_url(&self.import_id));

        let rt = tokio::runtime::Runtime::new()?;
        let code = rt.block_on(client.check_health(&token, &self.import_id))?;
        let outcome = HealthCheckOutcome::from_status(code);

        if outcome.degraded {
            println!("{} {}", "degraded:".bright_red().bold(), outcome.detail);
        } else {
            println!("{} {}", "healthy:".bright_green().bold(), outcome.detail);
        }

        Ok(())
    }
}
