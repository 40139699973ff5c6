use clap::Args;
use colored::Colorize;
use svcmod_import::ImportClient;
use tracing::info;

use super::Credentials;

#[derive(Args)]
pub struct DeleteCommand {
    /// Instance url as recorded in the module's delete info
    #[arg(long)]
    pub url: String,

    #[command(flatten)]
    pub credentials: Credentials,
}

impl DeleteCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        // Any parseable base works; the recorded url is used as-is
        let client = ImportClient::new(&self.url)?;
        let token = self.credentials.token();

        info!("Deleting import instance {}", self.url);
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(client.delete(token.as_ref(), &self.url))?;

        println!("{} {}", "deleted:".bright_green().bold(), self.url);
        Ok(())
    }
}
