//! Command line tooling around the `CStorBackup` resource.

/// Command line configuration
pub mod config;
/// Execution of the commands
pub mod ctl;
