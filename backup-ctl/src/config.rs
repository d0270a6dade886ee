use clap::{Args, Parser, Subcommand};
use crd_api::v1::{CStorBackupSpec, CStorBackupStatus};

/// CStorBackup command line config
#[derive(Debug, Parser)]
#[non_exhaustive]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The namespace to work in, default to the namespace of the kube config
    #[arg(long, short = 'n', global = true, value_parser = namespace_mode_parser, default_value = "")]
    pub namespace: Namespace,
    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The namespace to work in
#[allow(clippy::exhaustive_enums)] // it is clear that this enum is exhaustive
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Namespace {
    /// A single namespace
    Single(String),
    /// The default namespace of the kube config
    Default,
}

/// parse namespace mode
#[allow(clippy::unnecessary_wraps)] // required by clap
fn namespace_mode_parser(value: &str) -> Result<Namespace, String> {
    if value.is_empty() {
        return Ok(Namespace::Default);
    }
    Ok(Namespace::Single(value.to_owned()))
}

/// parse a status given on the command line, unknown statuses are refused
fn status_parser(value: &str) -> Result<CStorBackupStatus, String> {
    let status = CStorBackupStatus::from(value);
    if !status.is_known() {
        return Err(format!(
            "unknown status {value:?}, expect one of \"\", Init, Pending, InProgress, Done, Failed, Invalid"
        ));
    }
    Ok(status)
}

/// Commands
#[allow(clippy::exhaustive_enums)] // commands are matched in the ctl
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Install or update the CStorBackup CRD
    Install,
    /// Create a backup
    Create(CreateArgs),
    /// List backups
    List {
        /// Only list backups of this volume
        #[arg(long)]
        volume: Option<String>,
        /// Only list backups of this backup or schedule
        #[arg(long)]
        backup: Option<String>,
        /// List backups of all namespaces
        #[arg(long, short = 'A')]
        all_namespaces: bool,
    },
    /// Print a backup as YAML
    Get {
        /// Name of the CStorBackup resource
        name: String,
    },
    /// Overwrite the status of a backup
    SetStatus {
        /// Name of the CStorBackup resource
        name: String,
        /// The new status, an empty string requests re-initialization
        #[arg(value_parser = status_parser)]
        status: CStorBackupStatus,
        /// Skip the lifecycle check
        #[arg(long)]
        force: bool,
    },
}

/// Arguments of `create`
#[derive(Debug, Args)]
#[non_exhaustive]
pub struct CreateArgs {
    /// Name of the CStorBackup resource
    pub name: String,
    /// The volume to back up
    #[arg(long)]
    pub volume: String,
    /// The snapshot taken for this backup
    #[arg(long)]
    pub snap: String,
    /// The backup or schedule name, default to the resource name
    #[arg(long)]
    pub backup: Option<String>,
    /// The snapshot of the last completed backup, makes the backup incremental
    #[arg(long)]
    pub prev_snap: Option<String>,
    /// The remote address to transfer the backup to
    #[arg(long, conflicts_with = "local", required_unless_present = "local")]
    pub dest: Option<String>,
    /// Only take a local snapshot
    #[arg(long)]
    pub local: bool,
}

impl CreateArgs {
    /// Build the backup spec from the arguments
    #[inline]
    #[must_use]
    pub fn spec(&self) -> CStorBackupSpec {
        let backup_name = self.backup.clone().unwrap_or_else(|| self.name.clone());
        let spec = match self.dest {
            Some(ref dest) if !self.local => {
                CStorBackupSpec::remote(backup_name, &self.volume, &self.snap, dest)
            }
            _ => CStorBackupSpec::local(backup_name, &self.volume, &self.snap),
        };
        match self.prev_snap {
            Some(ref prev) => spec.with_prev_snap(prev),
            None => spec,
        }
    }
}

#[cfg(test)]
mod test {
    use clap::Parser;
    use crd_api::v1::CStorBackupStatus;

    use super::{Command, Config, Namespace};

    #[test]
    fn default_namespace() {
        let config = Config::try_parse_from(["cstor-backup", "install"]).unwrap();
        assert_eq!(config.namespace, Namespace::Default);
        assert!(matches!(config.command, Command::Install));
    }

    #[test]
    fn namespace_after_subcommand() {
        let config =
            Config::try_parse_from(["cstor-backup", "get", "bk1", "-n", "openebs"]).unwrap();
        assert_eq!(config.namespace, Namespace::Single("openebs".to_owned()));
    }

    #[test]
    fn create_remote() {
        let config = Config::try_parse_from([
            "cstor-backup",
            "create",
            "bk1-snap2",
            "--volume",
            "vol1",
            "--snap",
            "snap2",
            "--prev-snap",
            "snap1",
            "--dest",
            "10.0.0.1:9000",
        ])
        .unwrap();
        let Command::Create(args) = config.command else {
            panic!("expect create command");
        };
        let spec = args.spec();
        assert_eq!(spec.backup_name, "bk1-snap2");
        assert_eq!(spec.volume_name, "vol1");
        assert_eq!(spec.prev_snap_name, "snap1");
        assert_eq!(spec.destination(), Some("10.0.0.1:9000"));
        assert!(spec.check().is_ok());
    }

    #[test]
    fn create_local() {
        let config = Config::try_parse_from([
            "cstor-backup",
            "create",
            "bk1-snap1",
            "--backup",
            "bk1",
            "--volume",
            "vol1",
            "--snap",
            "snap1",
            "--local",
        ])
        .unwrap();
        let Command::Create(args) = config.command else {
            panic!("expect create command");
        };
        let spec = args.spec();
        assert_eq!(spec.backup_name, "bk1");
        assert!(spec.local_snap);
        assert!(!spec.is_incremental());
    }

    #[test]
    fn create_needs_destination_or_local() {
        assert!(Config::try_parse_from([
            "cstor-backup",
            "create",
            "bk1",
            "--volume",
            "vol1",
            "--snap",
            "snap1",
        ])
        .is_err());
        assert!(Config::try_parse_from([
            "cstor-backup",
            "create",
            "bk1",
            "--volume",
            "vol1",
            "--snap",
            "snap1",
            "--local",
            "--dest",
            "10.0.0.1:9000",
        ])
        .is_err());
    }

    #[test]
    fn set_status() {
        let config =
            Config::try_parse_from(["cstor-backup", "set-status", "bk1", "InProgress"]).unwrap();
        let Command::SetStatus {
            name,
            status,
            force,
        } = config.command
        else {
            panic!("expect set-status command");
        };
        assert_eq!(name, "bk1");
        assert_eq!(status, CStorBackupStatus::InProgress);
        assert!(!force);

        let reset = Config::try_parse_from(["cstor-backup", "set-status", "bk1", "", "--force"])
            .unwrap();
        assert!(matches!(
            reset.command,
            Command::SetStatus {
                status: CStorBackupStatus::Empty,
                force: true,
                ..
            }
        ));
    }

    #[test]
    fn set_status_refuses_unknown() {
        assert!(
            Config::try_parse_from(["cstor-backup", "set-status", "bk1", "Rebuilding"]).is_err()
        );
    }
}
