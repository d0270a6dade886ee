use std::fmt::{Display, Formatter};

use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Metadata, Schema, SchemaObject};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status written onto `CStorBackup` objects.
///
/// On the wire this is a bare string. Strings outside the known set are kept
/// verbatim in [`CStorBackupStatus::Unknown`] so that readers never fail on a
/// status written by a newer controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CStorBackupStatus {
    /// No status yet, the backup has to be (re)initialized, e.g. when the
    /// state before an import cannot be recovered
    #[default]
    Empty,
    /// Backup is initialized
    Init,
    /// Backup is pending
    Pending,
    /// Backup is in progress
    InProgress,
    /// Backup is completed
    Done,
    /// Backup is failed
    Failed,
    /// Backup operation is invalid
    Invalid,
    /// A status this crate does not know about
    Unknown(String),
}

impl CStorBackupStatus {
    /// All statuses with a documented meaning
    pub const KNOWN: [Self; 7] = [
        Self::Empty,
        Self::Init,
        Self::Pending,
        Self::InProgress,
        Self::Done,
        Self::Failed,
        Self::Invalid,
    ];

    /// The wire representation
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        match *self {
            Self::Empty => "",
            Self::Init => "Init",
            Self::Pending => "Pending",
            Self::InProgress => "InProgress",
            Self::Done => "Done",
            Self::Failed => "Failed",
            Self::Invalid => "Invalid",
            Self::Unknown(ref status) => status.as_str(),
        }
    }

    /// Whether the backup has finished, successfully or not
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(*self, Self::Done | Self::Failed | Self::Invalid)
    }

    /// Whether the status is one of the documented values
    #[inline]
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(*self, Self::Unknown(_))
    }

    /// Whether moving from `self` to `next` follows the backup lifecycle
    ///
    /// `Empty`/`Init` -> `Pending` -> `InProgress` -> `Done`, with `Failed` and
    /// `Invalid` reachable from every unfinished state. An unfinished backup may
    /// be reset to `Empty`. Finished and unknown statuses never move.
    #[inline]
    #[must_use]
    #[allow(clippy::pattern_type_mismatch)]
    pub fn can_transition_to(&self, next: &Self) -> bool {
        if !self.is_known() || !next.is_known() {
            return false;
        }
        if self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (_, Self::Empty | Self::Failed | Self::Invalid)
                | (Self::Empty, Self::Init | Self::Pending)
                | (Self::Init, Self::Pending)
                | (Self::Pending, Self::InProgress)
                | (Self::InProgress, Self::Done)
        )
    }
}

impl Display for CStorBackupStatus {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for CStorBackupStatus {
    #[inline]
    fn from(value: &str) -> Self {
        match value {
            "" => Self::Empty,
            "Init" => Self::Init,
            "Pending" => Self::Pending,
            "InProgress" => Self::InProgress,
            "Done" => Self::Done,
            "Failed" => Self::Failed,
            "Invalid" => Self::Invalid,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

impl From<String> for CStorBackupStatus {
    #[inline]
    fn from(value: String) -> Self {
        match Self::from(value.as_str()) {
            Self::Unknown(_) => Self::Unknown(value),
            known => known,
        }
    }
}

impl From<CStorBackupStatus> for String {
    #[inline]
    fn from(value: CStorBackupStatus) -> Self {
        match value {
            CStorBackupStatus::Unknown(status) => status,
            known => known.as_str().to_owned(),
        }
    }
}

// A plain string without an enum constraint, the API server must not reject
// statuses written by other controller versions.
impl JsonSchema for CStorBackupStatus {
    fn schema_name() -> String {
        "CStorBackupStatus".to_owned()
    }

    fn is_referenceable() -> bool {
        false
    }

    fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            metadata: Some(Box::new(Metadata {
                description: Some(
                    "Status of the backup, one of \"\", Init, Pending, InProgress, Done, Failed, Invalid"
                        .to_owned(),
                ),
                ..Metadata::default()
            })),
            ..SchemaObject::default()
        }
        .into()
    }
}

#[cfg(test)]
mod test {
    use super::CStorBackupStatus;

    #[test]
    fn known_statuses_decode() {
        for (literal, expect) in [
            ("\"\"", CStorBackupStatus::Empty),
            ("\"Init\"", CStorBackupStatus::Init),
            ("\"Pending\"", CStorBackupStatus::Pending),
            ("\"InProgress\"", CStorBackupStatus::InProgress),
            ("\"Done\"", CStorBackupStatus::Done),
            ("\"Failed\"", CStorBackupStatus::Failed),
            ("\"Invalid\"", CStorBackupStatus::Invalid),
        ] {
            let status: CStorBackupStatus = serde_json::from_str(literal).unwrap();
            assert_eq!(status, expect);
            assert!(status.is_known());
            assert_eq!(serde_json::to_string(&status).unwrap(), literal);
        }
    }

    #[test]
    fn unknown_status_passes_through() {
        let status: CStorBackupStatus = serde_json::from_str("\"Rebuilding\"").unwrap();
        assert_eq!(status, CStorBackupStatus::Unknown("Rebuilding".to_owned()));
        assert!(!status.is_known());
        assert!(!status.is_terminal());
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Rebuilding\"");
    }

    #[test]
    fn status_is_case_sensitive() {
        assert_eq!(
            CStorBackupStatus::from("done"),
            CStorBackupStatus::Unknown("done".to_owned())
        );
        assert_eq!(
            CStorBackupStatus::from("inprogress".to_owned()),
            CStorBackupStatus::Unknown("inprogress".to_owned())
        );
    }

    #[test]
    fn non_string_status_is_rejected() {
        assert!(serde_json::from_str::<CStorBackupStatus>("3").is_err());
    }

    #[test]
    fn default_is_empty() {
        assert_eq!(CStorBackupStatus::default(), CStorBackupStatus::Empty);
        assert_eq!(CStorBackupStatus::default().to_string(), "");
    }

    #[test]
    fn terminal_statuses() {
        let terminal: Vec<_> = CStorBackupStatus::KNOWN
            .iter()
            .filter(|status| status.is_terminal())
            .cloned()
            .collect();
        assert_eq!(
            terminal,
            vec![
                CStorBackupStatus::Done,
                CStorBackupStatus::Failed,
                CStorBackupStatus::Invalid
            ]
        );
    }

    #[test]
    fn lifecycle_forward() {
        let path = [
            CStorBackupStatus::Empty,
            CStorBackupStatus::Init,
            CStorBackupStatus::Pending,
            CStorBackupStatus::InProgress,
            CStorBackupStatus::Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(&pair[1]), "{pair:?}");
            if pair[0] != CStorBackupStatus::Empty {
                assert!(!pair[1].can_transition_to(&pair[0]), "{pair:?}");
            }
        }
        assert!(CStorBackupStatus::Empty.can_transition_to(&CStorBackupStatus::Pending));
    }

    #[test]
    fn lifecycle_rejects_skips() {
        assert!(!CStorBackupStatus::Init.can_transition_to(&CStorBackupStatus::InProgress));
        assert!(!CStorBackupStatus::Pending.can_transition_to(&CStorBackupStatus::Done));
        assert!(!CStorBackupStatus::InProgress.can_transition_to(&CStorBackupStatus::Pending));
        assert!(!CStorBackupStatus::Empty.can_transition_to(&CStorBackupStatus::Done));
    }

    #[test]
    fn lifecycle_failure_from_unfinished() {
        for from in [
            CStorBackupStatus::Empty,
            CStorBackupStatus::Init,
            CStorBackupStatus::Pending,
            CStorBackupStatus::InProgress,
        ] {
            assert!(from.can_transition_to(&CStorBackupStatus::Failed));
            assert!(from.can_transition_to(&CStorBackupStatus::Invalid));
            assert!(from.can_transition_to(&CStorBackupStatus::Empty));
        }
    }

    #[test]
    fn terminal_statuses_are_final() {
        for from in [
            CStorBackupStatus::Done,
            CStorBackupStatus::Failed,
            CStorBackupStatus::Invalid,
        ] {
            for to in CStorBackupStatus::KNOWN {
                assert_eq!(from.can_transition_to(&to), from == to, "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn unknown_never_transitions() {
        let unknown = CStorBackupStatus::Unknown("Rebuilding".to_owned());
        assert!(!unknown.can_transition_to(&unknown));
        assert!(!unknown.can_transition_to(&CStorBackupStatus::Failed));
        assert!(!CStorBackupStatus::Pending.can_transition_to(&unknown));
    }
}
