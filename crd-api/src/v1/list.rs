use k8s_openapi::apimachinery::pkg::apis::meta::v1::ListMeta;
use kube::core::{ObjectList, TypeMeta};
use kube::Resource;
use serde::{Deserialize, Serialize};

use super::CStorBackup;

/// A list of `CStorBackup` resources, as returned by list and watch requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CStorBackupList {
    /// `apiVersion` and `kind` of the list, inlined on the wire
    #[serde(flatten)]
    pub types: TypeMeta,
    /// List metadata, holds the continue token and the resource version
    #[serde(default)]
    pub metadata: ListMeta,
    /// The backups, in the order the API server returned them
    #[serde(default)]
    pub items: Vec<CStorBackup>,
}

fn list_type_meta() -> TypeMeta {
    TypeMeta {
        api_version: CStorBackup::api_version(&()).into_owned(),
        kind: format!("{}List", CStorBackup::kind(&())),
    }
}

impl Default for CStorBackupList {
    #[inline]
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl CStorBackupList {
    /// Wrap `items` with empty list metadata
    #[inline]
    #[must_use]
    pub fn new(items: Vec<CStorBackup>) -> Self {
        Self {
            types: list_type_meta(),
            metadata: ListMeta::default(),
            items,
        }
    }

    /// Number of backups in the list
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list holds no backup
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the backups in order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, CStorBackup> {
        self.items.iter()
    }
}

impl From<ObjectList<CStorBackup>> for CStorBackupList {
    #[inline]
    fn from(list: ObjectList<CStorBackup>) -> Self {
        Self {
            types: list_type_meta(),
            metadata: list.metadata,
            items: list.items,
        }
    }
}

impl IntoIterator for CStorBackupList {
    type Item = CStorBackup;
    type IntoIter = std::vec::IntoIter<CStorBackup>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a CStorBackupList {
    type Item = &'a CStorBackup;
    type IntoIter = std::slice::Iter<'a, CStorBackup>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
