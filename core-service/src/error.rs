use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] bridge_traits::BridgeError),

    #[error("sync `{job}` references unknown account `{account}`")]
    UnknownAccount { job: String, account: String },

    #[error("sync `{job}` has an invalid schedule: {source}")]
    Schedule {
        job: String,
        #[source]
        source: core_sched::ScheduleError,
    },
}

pub type Result<T> = std::result::Result<T, ServiceError>;
