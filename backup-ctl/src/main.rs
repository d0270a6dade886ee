use anyhow::Result;
use clap::Parser;
use cstor_backup_ctl::config::Config;
use cstor_backup_ctl::ctl::BackupCtl;
use kube::Client;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let config = Config::parse();
    let kube_client: Client = Client::try_default().await?;
    BackupCtl::new(config, kube_client).run().await
}
