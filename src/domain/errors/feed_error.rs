//! Feed fetch error types.

use thiserror::Error;

/// Failure kinds of a single feed page fetch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    /// Page arguments or the composed address are unusable.
    #[error("invalid feed request: {reason}")]
    InvalidRequest {
        /// What was wrong with the request.
        reason: String,
    },

    /// Connecting, timing out, a non-success status or reading the body failed.
    #[error("feed transport error: {message}")]
    Transport {
        /// Transport failure detail.
        message: String,
    },

    /// The body is not a valid feed page.
    #[error("failed to decode feed page: {message}")]
    Decode {
        /// Decoder failure detail.
        message: String,
    },
}

impl FeedError {
    /// Creates invalid request error.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Creates transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Short machine-friendly name of the failure kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Transport { .. } => "transport",
            Self::Decode { .. } => "decode",
        }
    }

    /// Returns whether error is network related.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
