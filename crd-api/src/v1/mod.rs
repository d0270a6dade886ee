pub use backup::{label_selector, CStorBackup, CStorBackupSpec};
pub use list::CStorBackupList;
pub use status::CStorBackupStatus;

mod backup;
mod list;
mod status;

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client};
use tracing::{debug, info};

use crate::consts::FIELD_MANAGER;
use crate::{wait_crd_established, Result};

/// Setup CRD
///
/// # Errors
///
/// Return `Err` when the CRD cannot be applied or is not established in time
#[inline]
pub async fn set_up(kube_client: &Client) -> Result<()> {
    let crd_api: Api<CustomResourceDefinition> = Api::all(kube_client.clone());
    let definition = CStorBackup::crd();

    match crd_api.get_opt(CStorBackup::crd_name()).await? {
        None => {
            // the following code needs `customresourcedefinitions` write permission
            debug!("cannot find CStorBackup CRD, try to init it");
        }
        Some(current) if current.spec == definition.spec => {
            debug!("CStorBackup CRD is up to date");
            return Ok(());
        }
        Some(_) => {
            debug!("found outdated CStorBackup CRD, try to update it");
        }
    }

    _ = crd_api
        .patch(
            CStorBackup::crd_name(),
            &PatchParams::apply(FIELD_MANAGER).force(),
            &Patch::Apply(definition),
        )
        .await?;
    wait_crd_established(crd_api, CStorBackup::crd_name()).await?;
    info!("CStorBackup CRD installed");
    Ok(())
}
