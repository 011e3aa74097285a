//! Typed failures shared across the Lectern crates.

use crate::models::Channel;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LecternError {
    #[error("unknown channel {0:?}")]
    UnknownChannel(String),
    #[error("invalid command {0:?}")]
    InvalidCommand(String),
    #[error("unknown render target {0:?}")]
    UnknownTarget(String),
    #[error("{channel} history has no entry at index {index} (length {len})")]
    HistoryIndexOutOfRange {
        channel: Channel,
        index: usize,
        len: usize,
    },
    #[error("{channel} has no tab at index {index} (tabs {tabs})")]
    TabOutOfRange {
        channel: Channel,
        index: usize,
        tabs: usize,
    },
    #[error("channel {0} has no live surface")]
    NotALiveChannel(Channel),
    #[error("io: {0}")]
    Io(String),
}

impl LecternError {
    /// Whether the failure should be shown to the user rather than logged.
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::InvalidCommand(_) | Self::UnknownTarget(_) | Self::Io(_)
        )
    }
}

impl From<std::io::Error> for LecternError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
