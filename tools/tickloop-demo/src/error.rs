use thiserror::Error;

/// Rejected demo settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("--{option} must be greater than zero")]
    ZeroPeriod { option: &'static str },
    #[error("--deadline-ms ({deadline}) must not be shorter than --link-poll-ms ({poll})")]
    DeadlineBeforeFirstPoll { deadline: u32, poll: u32 },
    #[error("--heartbeats must be at least 1")]
    NoHeartbeats,
}
