use provider_realdebrid::RealDebridError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// A full listing of one side failed. The whole diff is aborted: a
    /// partial destination inventory would produce false "missing"
    /// candidates and duplicate submissions.
    #[error("listing account {account:?} failed: {source}")]
    Listing {
        account: String,
        #[source]
        source: RealDebridError,
    },
}

pub type Result<T> = std::result::Result<T, SyncError>;
