//! Transfer execution: unique naming, the staging area, the per-item stager,
//! and the asynchronous cleanup coordinator.

mod cleanup;
mod stager;
mod staging;
mod unique;

pub use cleanup::{
    CleanupConfig, CleanupCoordinator, CleanupStats, StagingRecord, DEFAULT_CLEANUP_TIMEOUT,
    DEFAULT_RETRY_INTERVAL,
};
pub use stager::{TransferItem, TransferMode, TransferStager};
pub use staging::StagingArea;
pub use unique::allocate_unique_name;
