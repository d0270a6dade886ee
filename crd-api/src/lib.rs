//! Custom resource definitions of the cstor backup engine.
//!
//! The crate only describes data: the `CStorBackup` resource, its spec and
//! status, plus the helpers needed to register the definition on a cluster.
//! Driving a backup to completion is left to the controller that watches
//! these resources.

/// Constants shared by the definition and its consumers
pub mod consts;
/// Errors of this crate
mod error;
/// v1
/// Features:
///     1. Remote and local-only snapshot backups
///     2. Incremental backups based on a previous snapshot
pub mod v1;

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::runtime::wait::{await_condition, conditions};
use kube::Api;
use tracing::debug;

pub use error::{Error, Result};

use crate::consts::CRD_ESTABLISH_TIMEOUT;

/// Wait for the CRD `crd_name` to be established
///
/// # Errors
///
/// Return `Err` when the watch fails or the CRD is not established in time
#[inline]
pub async fn wait_crd_established(
    crd_api: Api<CustomResourceDefinition>,
    crd_name: &str,
) -> Result<()> {
    let establish = await_condition(crd_api, crd_name, conditions::is_crd_established());
    debug!("wait for crd {crd_name} to be established");
    let _crd = tokio::time::timeout(CRD_ESTABLISH_TIMEOUT, establish)
        .await
        .map_err(|_elapsed| Error::Timeout(crd_name.to_owned()))??;
    debug!("crd {crd_name} established");
    Ok(())
}
