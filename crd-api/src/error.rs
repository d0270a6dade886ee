use crate::v1::CStorBackupStatus;

/// All possible errors
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Kube error
    #[error("Kubernetes api error")]
    Kube(#[from] kube::Error),
    /// Error while watching a resource condition
    #[error("failed to wait for resource condition")]
    Wait(#[from] kube::runtime::wait::Error),
    /// The CRD did not become established in time
    #[error("timed out waiting for crd {0} to be established")]
    Timeout(String),
    /// The backup spec cannot be acted upon
    #[error("invalid backup spec: {0}")]
    InvalidSpec(String),
    /// The status change breaks the backup lifecycle
    #[error("backup status cannot change from {from:?} to {to:?}")]
    ForbiddenTransition {
        /// The current status
        from: CStorBackupStatus,
        /// The requested status
        to: CStorBackupStatus,
    },
}

/// Result of this crate
pub type Result<T> = std::result::Result<T, Error>;
