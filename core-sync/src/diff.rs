//! Torrent diff engine.
//!
//! Computes which torrents exist in the source account but not in the
//! destination. The destination's content-hash set is fully materialised
//! first; the source listing is then streamed against it so candidates
//! come out in source order. Within-source duplicates (same hash under
//! different ids) yield one candidate.

use futures::TryStreamExt;
use provider_realdebrid::{Torrent, TorrentCatalog};
use std::collections::HashSet;
use tracing::debug;

use crate::error::{Result, SyncError};

/// Result of one diff pass.
#[derive(Debug, Clone)]
pub struct DiffOutcome {
    pub source_total: usize,
    pub destination_total: usize,
    /// Source torrents missing from the destination, in source order.
    pub candidates: Vec<Torrent>,
}

/// Diff two accounts by content hash.
///
/// # Errors
///
/// Fails as a whole if either listing fails; no partial diff is ever
/// returned, since diffing against an incomplete destination set would
/// flag already-present torrents as missing.
pub async fn diff(
    source: &dyn TorrentCatalog,
    destination: &dyn TorrentCatalog,
) -> Result<DiffOutcome> {
    let mut destination_hashes: HashSet<String> = HashSet::new();
    let mut destination_total = 0usize;
    {
        let mut listing = destination.list_torrents();
        while let Some(torrent) = listing.try_next().await.map_err(|e| SyncError::Listing {
            account: destination.account().to_string(),
            source: e,
        })? {
            destination_total += 1;
            destination_hashes.insert(torrent.content_hash());
        }
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();
    let mut source_total = 0usize;
    {
        let mut listing = source.list_torrents();
        while let Some(torrent) = listing.try_next().await.map_err(|e| SyncError::Listing {
            account: source.account().to_string(),
            source: e,
        })? {
            source_total += 1;
            let hash = torrent.content_hash();
            if !destination_hashes.contains(&hash) && seen.insert(hash) {
                candidates.push(torrent);
            }
        }
    }

    debug!(
        source = source.account(),
        destination = destination.account(),
        source_total,
        destination_total,
        candidates = candidates.len(),
        "diff computed"
    );

    Ok(DiffOutcome {
        source_total,
        destination_total,
        candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::stream::{self, BoxStream, StreamExt};
    use provider_realdebrid::{
        AddOutcome, RealDebridError, TorrentInfo, TorrentStatus,
    };

    fn torrent(id: &str, hash: &str) -> Torrent {
        Torrent {
            id: id.to_string(),
            hash: hash.to_string(),
            filename: format!("{}.mkv", id),
            bytes: 1,
            status: TorrentStatus::Downloaded,
            progress: 100.0,
            links: vec![],
            added: None,
        }
    }

    /// Fixed in-memory listing; `fail` makes the listing error out.
    struct FakeCatalog {
        name: &'static str,
        torrents: Vec<Torrent>,
        fail: bool,
    }

    impl FakeCatalog {
        fn new(name: &'static str, torrents: Vec<Torrent>) -> Self {
            Self {
                name,
                torrents,
                fail: false,
            }
        }
    }

    #[async_trait]
    impl TorrentCatalog for FakeCatalog {
        fn account(&self) -> &str {
            self.name
        }

        fn list_torrents(&self) -> BoxStream<'_, provider_realdebrid::Result<Torrent>> {
            if self.fail {
                return stream::once(async {
                    Err(RealDebridError::Parse("listing failed".into()))
                })
                .boxed();
            }
            stream::iter(self.torrents.clone().into_iter().map(Ok)).boxed()
        }

        async fn torrent_info(&self, _id: &str) -> provider_realdebrid::Result<TorrentInfo> {
            unimplemented!("not used by diff")
        }

        async fn add_magnet(
            &self,
            _hash: &str,
            _file_ids: Option<&[i64]>,
        ) -> provider_realdebrid::Result<AddOutcome> {
            unimplemented!("not used by diff")
        }
    }

    #[tokio::test]
    async fn candidates_are_source_minus_destination() {
        let source = FakeCatalog::new(
            "src",
            vec![torrent("1", "aa"), torrent("2", "bb"), torrent("3", "cc")],
        );
        let destination = FakeCatalog::new("dst", vec![torrent("9", "bb")]);

        let outcome = diff(&source, &destination).await.unwrap();
        assert_eq!(outcome.source_total, 3);
        assert_eq!(outcome.destination_total, 1);
        let hashes: Vec<&str> = outcome.candidates.iter().map(|t| t.hash.as_str()).collect();
        assert_eq!(hashes, vec!["aa", "cc"]);
    }

    #[tokio::test]
    async fn hash_comparison_ignores_case_and_ids() {
        // Same content hash, different case and different account ids.
        let source = FakeCatalog::new("src", vec![torrent("1", "AABB")]);
        let destination = FakeCatalog::new("dst", vec![torrent("999", "aabb")]);

        let outcome = diff(&source, &destination).await.unwrap();
        assert!(outcome.candidates.is_empty());
    }

    #[tokio::test]
    async fn duplicate_source_hashes_count_once() {
        let source = FakeCatalog::new(
            "src",
            vec![torrent("1", "aa"), torrent("2", "aa"), torrent("3", "aa")],
        );
        let destination = FakeCatalog::new("dst", vec![]);

        let outcome = diff(&source, &destination).await.unwrap();
        assert_eq!(outcome.source_total, 3);
        assert_eq!(outcome.candidates.len(), 1);
    }

    #[tokio::test]
    async fn empty_source_yields_no_candidates() {
        let source = FakeCatalog::new("src", vec![]);
        let destination = FakeCatalog::new("dst", vec![torrent("1", "aa")]);

        let outcome = diff(&source, &destination).await.unwrap();
        assert!(outcome.candidates.is_empty());
    }

    #[tokio::test]
    async fn destination_listing_failure_aborts_diff() {
        let source = FakeCatalog::new("src", vec![torrent("1", "aa")]);
        let mut destination = FakeCatalog::new("dst", vec![]);
        destination.fail = true;

        let error = diff(&source, &destination).await.unwrap_err();
        let SyncError::Listing { account, .. } = error;
        assert_eq!(account, "dst");
    }

    #[tokio::test]
    async fn source_listing_failure_aborts_diff() {
        let mut source = FakeCatalog::new("src", vec![]);
        source.fail = true;
        let destination = FakeCatalog::new("dst", vec![]);

        let error = diff(&source, &destination).await.unwrap_err();
        let SyncError::Listing { account, .. } = error;
        assert_eq!(account, "src");
    }
}
