use anyhow::Result;
use crd_api::v1::{label_selector, CStorBackup, CStorBackupList, CStorBackupStatus};
use kube::api::{ListParams, Patch, PatchParams, PostParams};
use kube::{Api, Client, ResourceExt};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::{Command, Config, CreateArgs, Namespace};

/// Placeholder printed for empty table cells
const NONE_CELL: &str = "<none>";

/// Runs one command against the cluster
pub struct BackupCtl {
    /// Config of this run
    config: Config,
    /// Kubernetes client
    kube_client: Client,
}

impl BackupCtl {
    /// Constructor
    #[inline]
    #[must_use]
    pub fn new(config: Config, kube_client: Client) -> Self {
        Self {
            config,
            kube_client,
        }
    }

    /// Print the CRD as YAML
    ///
    /// # Errors
    ///
    /// Return `Err` when the CRD cannot be serialized
    #[inline]
    pub fn generate_crds() -> Result<()> {
        print!("{}", serde_yaml::to_string(&CStorBackup::crd())?);
        Ok(())
    }

    /// Run the configured command
    ///
    /// # Errors
    ///
    /// Return `Err` when the command failed
    #[inline]
    pub async fn run(&self) -> Result<()> {
        match self.config.command {
            Command::Install => {
                crd_api::v1::set_up(&self.kube_client).await?;
            }
            Command::Create(ref args) => self.create(args).await?,
            Command::List {
                ref volume,
                ref backup,
                all_namespaces,
            } => {
                self.list(volume.as_deref(), backup.as_deref(), all_namespaces)
                    .await?;
            }
            Command::Get { ref name } => {
                let backup = self.backup_api().get(name).await?;
                print!("{}", serde_yaml::to_string(&backup)?);
            }
            Command::SetStatus {
                ref name,
                ref status,
                force,
            } => self.set_status(name, status, force).await?,
        }
        Ok(())
    }

    /// The api of backups in the configured namespace
    fn backup_api(&self) -> Api<CStorBackup> {
        match self.config.namespace {
            Namespace::Single(ref namespace) => {
                Api::namespaced(self.kube_client.clone(), namespace.as_str())
            }
            Namespace::Default => Api::default_namespaced(self.kube_client.clone()),
        }
    }

    /// Create a backup
    async fn create(&self, args: &CreateArgs) -> Result<()> {
        let spec = args.spec();
        spec.check()?;
        if spec.is_incremental() {
            debug!(
                "backup {} is incremental on top of {}",
                args.name, spec.prev_snap_name
            );
        }
        let backup = CStorBackup::new(&args.name, spec).with_labels();
        let created = self
            .backup_api()
            .create(&PostParams::default(), &backup)
            .await?;
        info!(
            "backup {} of {} created",
            created.name_any(),
            created.spec.snapshot_full_name()
        );
        Ok(())
    }

    /// List backups, filtered by backup and volume name
    async fn list(
        &self,
        volume: Option<&str>,
        backup: Option<&str>,
        all_namespaces: bool,
    ) -> Result<()> {
        let api = if all_namespaces {
            Api::all(self.kube_client.clone())
        } else {
            self.backup_api()
        };
        let mut params = ListParams::default();
        if let Some(selector) = label_selector(backup, volume) {
            debug!("list backups with selector {selector}");
            params = params.labels(&selector);
        }
        let list = CStorBackupList::from(api.list(&params).await?);
        print!("{}", render_table(&list));
        Ok(())
    }

    /// Overwrite the status of a backup
    ///
    /// The CRD has no status subresource, so the status is merged into the
    /// resource itself.
    async fn set_status(&self, name: &str, status: &CStorBackupStatus, force: bool) -> Result<()> {
        let api = self.backup_api();
        let backup = api.get(name).await?;
        let current = backup.backup_status();
        if !current.can_transition_to(status) {
            if !force {
                return Err(crd_api::Error::ForbiddenTransition {
                    from: current.clone(),
                    to: status.clone(),
                }
                .into());
            }
            warn!("forcing backup {name} status from {current:?} to {status:?}");
        }
        _ = api
            .patch(
                name,
                &PatchParams::default(),
                &Patch::Merge(json!({ "status": status })),
            )
            .await?;
        info!("backup {name} status set to {status:?}");
        Ok(())
    }
}

/// Render backups as a table, one row per backup in list order
#[inline]
#[must_use]
pub fn render_table(list: &CStorBackupList) -> String {
    let header = ["NAME", "VOLUME", "SNAPSHOT", "PREV", "DESTINATION", "STATUS"].map(str::to_owned);
    let rows: Vec<[String; 6]> = list
        .iter()
        .map(|backup| {
            let spec = &backup.spec;
            let destination = if spec.local_snap {
                "<local>".to_owned()
            } else {
                cell(&spec.backup_dest)
            };
            [
                backup.name_any(),
                cell(&spec.volume_name),
                cell(&spec.snap_name),
                cell(&spec.prev_snap_name),
                destination,
                cell(backup.backup_status().as_str()),
            ]
        })
        .collect();

    let mut widths = header.clone().map(|title| title.chars().count());
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    std::iter::once(&header)
        .chain(&rows)
        .map(|row| {
            let line = row
                .iter()
                .zip(widths)
                .map(|(value, width)| format!("{value:<width$}"))
                .collect::<Vec<_>>()
                .join("  ");
            format!("{}\n", line.trim_end())
        })
        .collect()
}

/// A table cell, empty values are shown as a placeholder
fn cell(value: &str) -> String {
    if value.is_empty() {
        NONE_CELL.to_owned()
    } else {
        value.to_owned()
    }
}
