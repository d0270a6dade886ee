// The `JsonSchema` and `CustomResource` macro generates codes that does not pass the clippy lint.
#![allow(clippy::str_to_string)]
#![allow(clippy::missing_docs_in_private_items)]

use std::borrow::Cow;
use std::collections::BTreeMap;

use garde::Validate;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::serde::ser::SerializeStruct;
use k8s_openapi::serde::{Deserialize, Serialize, Serializer};
use k8s_openapi::NamespaceResourceScope;
use kube::{CustomResource, CustomResourceExt, Resource};
use schemars::JsonSchema;

use super::CStorBackupStatus;
use crate::consts::{LABEL_BACKUP_NAME, LABEL_PERSISTENT_VOLUME};
use crate::{Error, Result};

/// Returned by [`CStorBackup::backup_status`] when no status was written yet
static EMPTY_STATUS: CStorBackupStatus = CStorBackupStatus::Empty;

/// Longest value a kubernetes label accepts
const LABEL_VALUE_MAX_LEN: usize = 63;

/// CStorBackupSpec is the spec for a CStorBackup resource
///
/// `CStorBackupDefinition` only exists to generate the CRD schema, the resource
/// itself is [`CStorBackup`].
#[derive(
    CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema, Validate,
)]
#[kube(
    group = "openebs.io",
    version = "v1",
    kind = "CStorBackup",
    singular = "cstorbackup",
    plural = "cstorbackups",
    root = "CStorBackupDefinition",
    namespaced,
    status = "CStorBackupStatus",
    shortname = "cbkp",
    printcolumn = r#"{"name":"Volume", "type":"string", "description":"The volume being backed up", "jsonPath":".spec.volumeName"}"#,
    printcolumn = r#"{"name":"Snapshot", "type":"string", "description":"The snapshot taken for this backup", "jsonPath":".spec.snapName"}"#,
    printcolumn = r#"{"name":"Destination", "type":"string", "description":"The remote address of the backup transfer", "jsonPath":".spec.backupDest"}"#,
    printcolumn = r#"{"name":"Status", "type":"string", "description":"The backup status", "jsonPath":".status"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "description":"The backup age", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
#[garde(context(CStorBackupSpec as ctx))]
pub struct CStorBackupSpec {
    /// Name of the backup or scheduled backup
    #[garde(length(min = 1, max = 253), pattern(r"^[a-zA-Z0-9][-a-zA-Z0-9_.:]*$"))]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub backup_name: String,
    /// Name of the volume for which this backup is destined
    #[garde(length(min = 1, max = 253), pattern(r"^[a-zA-Z0-9][-a-zA-Z0-9_.:]*$"))]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub volume_name: String,
    /// Name of the current backup snapshot
    #[garde(length(min = 1, max = 253), pattern(r"^[a-zA-Z0-9][-a-zA-Z0-9_.:]*$"))]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub snap_name: String,
    /// Snapshot of the last completed backup, empty for a full backup
    #[garde(
        length(max = 253),
        pattern(r"^([a-zA-Z0-9][-a-zA-Z0-9_.:]*)?$"),
        custom(check_prev_snap)
    )]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prev_snap_name: String,
    /// Remote address for backup transfer
    #[garde(custom(check_backup_dest))]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub backup_dest: String,
    /// Only take a local snapshot, `backup_dest` is ignored
    #[garde(skip)]
    #[serde(default, skip_serializing_if = "is_false")]
    pub local_snap: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // required by serde
fn is_false(value: &bool) -> bool {
    !*value
}

/// Whether `value` can be used as a kubernetes label value
fn is_label_value(value: &str) -> bool {
    let bytes = value.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            bytes.len() <= LABEL_VALUE_MAX_LEN
                && first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(*b, b'-' | b'_' | b'.'))
        }
        _ => false,
    }
}

#[allow(clippy::ptr_arg)] // required by garde
fn check_prev_snap(value: &String, ctx: &CStorBackupSpec) -> garde::Result {
    if !value.is_empty() && *value == ctx.snap_name {
        return Err(garde::Error::new("must differ from snap_name"));
    }
    Ok(())
}

#[allow(clippy::ptr_arg)] // required by garde
fn check_backup_dest(_value: &String, ctx: &CStorBackupSpec) -> garde::Result {
    if ctx.destination().is_none() && !ctx.local_snap {
        return Err(garde::Error::new("required unless local_snap is set"));
    }
    Ok(())
}

impl CStorBackupSpec {
    /// Spec of a backup transferred to `backup_dest`
    #[inline]
    #[must_use]
    pub fn remote(
        backup_name: impl Into<String>,
        volume_name: impl Into<String>,
        snap_name: impl Into<String>,
        backup_dest: impl Into<String>,
    ) -> Self {
        Self {
            backup_name: backup_name.into(),
            volume_name: volume_name.into(),
            snap_name: snap_name.into(),
            backup_dest: backup_dest.into(),
            ..Self::default()
        }
    }

    /// Spec of a local-only snapshot backup
    #[inline]
    #[must_use]
    pub fn local(
        backup_name: impl Into<String>,
        volume_name: impl Into<String>,
        snap_name: impl Into<String>,
    ) -> Self {
        Self {
            backup_name: backup_name.into(),
            volume_name: volume_name.into(),
            snap_name: snap_name.into(),
            local_snap: true,
            ..Self::default()
        }
    }

    /// Make this backup incremental on top of `prev_snap_name`
    #[inline]
    #[must_use]
    pub fn with_prev_snap(mut self, prev_snap_name: impl Into<String>) -> Self {
        self.prev_snap_name = prev_snap_name.into();
        self
    }

    /// Only transfer the delta since the previous snapshot
    #[inline]
    #[must_use]
    pub fn is_incremental(&self) -> bool {
        !self.prev_snap_name.is_empty()
    }

    /// The remote transfer address, `None` for local-only snapshots or a blank
    /// address
    #[inline]
    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        if self.local_snap || self.backup_dest.trim().is_empty() {
            return None;
        }
        Some(self.backup_dest.as_str())
    }

    /// Full snapshot name as `volume@snapshot`
    #[inline]
    #[must_use]
    pub fn snapshot_full_name(&self) -> String {
        format!("{}@{}", self.volume_name, self.snap_name)
    }

    /// Labels identifying the backup and its volume
    ///
    /// Names that are not valid label values (longer than 63 characters, with
    /// a `:` or not ending with an alphanumeric) are left out.
    #[inline]
    #[must_use]
    pub fn labels(&self) -> BTreeMap<String, String> {
        [
            (LABEL_BACKUP_NAME, &self.backup_name),
            (LABEL_PERSISTENT_VOLUME, &self.volume_name),
        ]
        .into_iter()
        .filter(|&(_, value)| is_label_value(value))
        .map(|(key, value)| (key.to_owned(), value.clone()))
        .collect()
    }

    /// Check that a controller can act on this spec
    ///
    /// Decoding never checks this, a spec that fails here is still a valid
    /// resource.
    ///
    /// # Errors
    ///
    /// Return `Error::InvalidSpec` listing every offending field
    #[inline]
    pub fn check(&self) -> Result<()> {
        self.validate(self)
            .map_err(|report| Error::InvalidSpec(report.to_string()))
    }
}

/// CStorBackup describes a cstor backup resource created as a custom resource
///
/// `status` is a plain field of the resource, the CRD has no status
/// subresource, so controllers write it together with the rest of the object.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CStorBackup {
    /// Standard object metadata
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Desired state of the backup
    #[serde(default)]
    pub spec: CStorBackupSpec,
    /// Observed state of the backup, written by the controller
    #[serde(default)]
    pub status: Option<CStorBackupStatus>,
}

impl Resource for CStorBackup {
    type DynamicType = ();
    type Scope = NamespaceResourceScope;

    fn kind(dt: &()) -> Cow<'_, str> {
        CStorBackupDefinition::kind(dt)
    }

    fn group(dt: &()) -> Cow<'_, str> {
        CStorBackupDefinition::group(dt)
    }

    fn version(dt: &()) -> Cow<'_, str> {
        CStorBackupDefinition::version(dt)
    }

    fn plural(dt: &()) -> Cow<'_, str> {
        CStorBackupDefinition::plural(dt)
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl Serialize for CStorBackup {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let fields = if self.status.is_some() { 5 } else { 4 };
        let mut state = serializer.serialize_struct("CStorBackup", fields)?;
        state.serialize_field("apiVersion", &Self::api_version(&()))?;
        state.serialize_field("kind", &Self::kind(&()))?;
        state.serialize_field("metadata", &self.metadata)?;
        state.serialize_field("spec", &self.spec)?;
        if let Some(status) = self.status.as_ref() {
            state.serialize_field("status", status)?;
        }
        state.end()
    }
}

impl CStorBackup {
    /// Create a backup named `name`, without status
    #[inline]
    #[must_use]
    pub fn new(name: &str, spec: CStorBackupSpec) -> Self {
        Self {
            metadata: ObjectMeta {
                name: Some(name.to_owned()),
                ..ObjectMeta::default()
            },
            spec,
            status: None,
        }
    }

    /// The CRD of `CStorBackup`, with `status` in the schema but no status
    /// subresource
    #[inline]
    #[must_use]
    pub fn crd() -> CustomResourceDefinition {
        let mut crd = CStorBackupDefinition::crd();
        for version in &mut crd.spec.versions {
            version.subresources = None;
        }
        crd
    }

    /// The name of the CRD, `cstorbackups.openebs.io`
    #[inline]
    #[must_use]
    pub fn crd_name() -> &'static str {
        CStorBackupDefinition::crd_name()
    }

    /// The backup status, empty when the controller has not written one
    #[inline]
    #[must_use]
    pub fn backup_status(&self) -> &CStorBackupStatus {
        self.status.as_ref().unwrap_or(&EMPTY_STATUS)
    }

    /// Attach the backup and volume labels to the metadata
    #[inline]
    #[must_use]
    pub fn with_labels(mut self) -> Self {
        let labels = self.spec.labels();
        self.metadata
            .labels
            .get_or_insert_with(BTreeMap::new)
            .extend(labels);
        self
    }
}

/// Label selector matching backups of `backup_name` and/or `volume_name`
#[inline]
#[must_use]
pub fn label_selector(backup_name: Option<&str>, volume_name: Option<&str>) -> Option<String> {
    let terms: Vec<_> = [
        (LABEL_BACKUP_NAME, backup_name),
        (LABEL_PERSISTENT_VOLUME, volume_name),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| format!("{key}={v}")))
    .collect();
    (!terms.is_empty()).then(|| terms.join(","))
}
