use std::time::Duration;

/// The group name of all cstor resources
pub const GROUP_NAME: &str = "openebs.io";
/// Current api group version
pub const CURRENT_VERSION: &str = "v1";
/// The field manager identifier used when applying the CRD
pub const FIELD_MANAGER: &str = "openebs.io/cstor-backup";
/// How long to wait for a freshly applied CRD to be established
pub const CRD_ESTABLISH_TIMEOUT: Duration = Duration::from_secs(10);
/// The label attached to a backup, indicate the backup (or schedule) name
pub const LABEL_BACKUP_NAME: &str = "openebs.io/backup";
/// The label attached to a backup, indicate the volume being backed up
pub const LABEL_PERSISTENT_VOLUME: &str = "openebs.io/persistent-volume";
