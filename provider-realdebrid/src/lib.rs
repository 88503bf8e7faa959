//! # Real-Debrid Provider
//!
//! Typed client for the Real-Debrid REST API.
//!
//! ## Overview
//!
//! This module provides:
//! - Token-bucket rate limiting with separate general and torrents
//!   buckets, shared process-wide across every account client
//! - Paginated torrent listing exposed as a restartable lazy `Stream`
//! - Magnet submission with duplicate detection (`AlreadyExists`)
//! - File-selection mirroring via torrent info and selectFiles
//! - Exponential backoff with jitter for 429/5xx/timeouts, honouring
//!   server `Retry-After` hints
//! - The [`TorrentCatalog`](catalog::TorrentCatalog) trait consumed by
//!   the sync layer

pub mod backoff;
pub mod catalog;
pub mod client;
pub mod error;
pub mod limiter;
pub mod types;

pub use catalog::{AddOutcome, TorrentCatalog};
pub use client::{ClientOptions, RealDebridClient};
pub use error::{RealDebridError, Result};
pub use limiter::{Bucket, RateLimiter};
pub use types::{Torrent, TorrentFile, TorrentInfo, TorrentStatus};
