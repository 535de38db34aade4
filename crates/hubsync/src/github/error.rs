use thiserror::Error;

/// Errors surfaced by the metadata fetch client.
///
/// Rate-limit conditions never appear here: the client waits them out and
/// retries internally. What remains is the caller-visible taxonomy - absence
/// of a resource, a non-success status after retries, a transport failure
/// after retries, or an undecodable payload.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream has no such resource. For optional data (README) this is
    /// absence, not an error.
    #[error("not found")]
    NotFound,

    /// Non-success status that persisted through the retry budget.
    #[error("API error: status {status}")]
    Api { status: u16 },

    /// Transport-level failure that persisted through the retry budget.
    #[error("network error: {message}")]
    Transport { message: String },

    /// The response body could not be parsed as the expected JSON shape.
    #[error("decode error: {message}")]
    Decode { message: String },
}

impl FetchError {
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    #[inline]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Whether the condition is worth another attempt.
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Transport { .. })
    }
}

/// Extract a short, single-line error message suitable for display.
#[inline]
#[must_use]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(FetchError::Api { status: 500 }.is_transient());
        assert!(FetchError::transport("connection reset").is_transient());
        assert!(!FetchError::NotFound.is_transient());
        assert!(!FetchError::decode("bad json").is_transient());
    }

    #[test]
    fn short_error_message_takes_first_line() {
        let err = std::io::Error::other("first line\nsecond line");
        assert_eq!(short_error_message(&err), "first line");
    }
}
