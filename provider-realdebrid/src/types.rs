//! Real-Debrid wire types.
//!
//! Shapes follow the `/torrents` endpoints. Only the fields the sync
//! engine consumes are required; everything else is defaulted so minor
//! upstream additions do not break deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Torrent lifecycle status as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TorrentStatus {
    MagnetError,
    MagnetConversion,
    WaitingFilesSelection,
    Queued,
    Downloading,
    Downloaded,
    Error,
    Virus,
    Compressing,
    Uploading,
    Dead,
    /// Forward compatibility with statuses added upstream.
    #[serde(other)]
    Unknown,
}

/// One entry of the paginated `/torrents` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Torrent {
    pub id: String,
    /// SHA1 infohash; the cross-account identity of the torrent.
    pub hash: String,
    pub filename: String,
    #[serde(default)]
    pub bytes: u64,
    pub status: TorrentStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub added: Option<DateTime<Utc>>,
}

impl Torrent {
    /// Canonical form of the infohash used for cross-account equality.
    /// Account-local ids are never compared.
    pub fn content_hash(&self) -> String {
        self.hash.to_ascii_lowercase()
    }
}

/// A file inside a torrent, from `/torrents/info/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorrentFile {
    pub id: i64,
    pub path: String,
    #[serde(default)]
    pub bytes: u64,
    /// 0 or 1.
    #[serde(default)]
    pub selected: i32,
}

/// Detailed torrent information including its file list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorrentInfo {
    pub id: String,
    pub hash: String,
    pub filename: String,
    #[serde(default)]
    pub bytes: u64,
    pub status: TorrentStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub files: Vec<TorrentFile>,
    #[serde(default)]
    pub links: Vec<String>,
}

impl TorrentInfo {
    /// Ids of the files marked selected on this torrent.
    pub fn selected_file_ids(&self) -> Vec<i64> {
        self.files
            .iter()
            .filter(|f| f.selected == 1)
            .map(|f| f.id)
            .collect()
    }
}

/// Response of `POST /torrents/addMagnet`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddedMagnet {
    pub id: String,
    #[serde(default)]
    pub uri: Option<String>,
}

/// Error body the API attaches to failed requests.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: Option<String>,
    pub error_code: Option<i32>,
}
