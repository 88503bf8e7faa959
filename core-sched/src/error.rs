use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("interval must be at least one second")]
    ZeroInterval,

    #[error("interval of {seconds} seconds exceeds the maximum of {max}")]
    IntervalTooLarge { seconds: u64, max: u64 },

    #[error("cron expression {expression:?} must have 5 fields, found {fields}")]
    CronFieldCount { expression: String, fields: usize },

    #[error("invalid cron expression {expression:?}: {message}")]
    InvalidCron { expression: String, message: String },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
