use anyhow::Result;
use cstor_backup_ctl::ctl::BackupCtl;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    BackupCtl::generate_crds()
}
