//! Core library for `mtp_move`.
//!
//! Contains the path resolution and transfer-staging engine: classification
//! of host vs. device paths, wildcard source resolution, unique destination
//! naming, staged transfers through a per-run temp directory, and
//! asynchronous cleanup of in-flight files.

pub mod config;
pub mod errors;
pub mod output;
pub mod resolve;
pub mod shutdown;
pub mod store;
pub mod transfer;

pub use config::{
    default_config_path, default_log_path, path_has_symlink_ancestor, Config, LogLevel,
};
pub use errors::MtpMoveError;
pub use resolve::{classify, resolve, ResolvedSource, WildcardMatcher};
pub use store::{DeviceHandle, FolderHandle, HostFolder, ItemHandle, Location};
pub use transfer::{
    allocate_unique_name, CleanupConfig, CleanupCoordinator, CleanupStats, StagingArea,
    TransferItem, TransferMode, TransferStager,
};
