//! The provider seam the sync layer is written against.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::types::{Torrent, TorrentInfo};

/// Outcome of submitting a magnet to an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Accepted; the account-local id of the new torrent.
    Added { id: String },
    /// The account already holds this torrent. Not an error: magnet
    /// submission is idempotent from the caller's perspective.
    AlreadyExists,
}

/// One account's torrent collection.
///
/// Implemented by [`RealDebridClient`](crate::client::RealDebridClient)
/// for production and by in-memory fakes in tests.
#[async_trait]
pub trait TorrentCatalog: Send + Sync {
    /// Account name, for logging only.
    fn account(&self) -> &str;

    /// Lazily page through the full torrent listing.
    ///
    /// Each call returns a fresh stream that re-pages from the start.
    /// The stream ends when a page comes back shorter than the requested
    /// page size.
    fn list_torrents(&self) -> BoxStream<'_, Result<Torrent>>;

    /// Detailed info, including the file list, for one torrent.
    async fn torrent_info(&self, id: &str) -> Result<TorrentInfo>;

    /// Submit a torrent by infohash, optionally selecting a specific
    /// file set afterwards. Safe to call for hashes the account may
    /// already hold.
    async fn add_magnet(&self, hash: &str, file_ids: Option<&[i64]>) -> Result<AddOutcome>;
}
