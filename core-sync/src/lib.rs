//! # Sync Engine
//!
//! Decides what to copy between two accounts and copies it.
//!
//! ## Overview
//!
//! - **Diff Engine** (`diff`): materialises the destination's content
//!   hashes, then streams the source listing and yields every torrent
//!   missing from the destination
//! - **Sync Executor** (`executor`): runs one job end to end with a
//!   single-flight guarantee, per-item error accounting and graceful
//!   drain on shutdown
//! - **Run Report** (`report`): immutable per-run accounting handed to
//!   the logging layer
//!
//! Identity between accounts is always the torrent's content hash
//! (infohash); account-local ids are never compared.

pub mod diff;
pub mod error;
pub mod executor;
pub mod report;

pub use diff::{diff, DiffOutcome};
pub use error::{Result, SyncError};
pub use executor::{RunOutcome, SyncExecutor};
pub use report::{ItemFailure, JobRunReport};
