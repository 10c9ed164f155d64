use std::path::PathBuf;
use thiserror::Error;

/// Failures a single run can end with.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Network failure or non-success HTTP status from the feed.
    #[error("fetching r/{subreddit} failed{}: {message}", status_suffix(.status))]
    Fetch {
        subreddit: String,
        status: Option<u16>,
        message: String,
    },

    /// Feed body did not have the expected listing shape.
    #[error("malformed listing for r/{subreddit}: {message}")]
    Parse { subreddit: String, message: String },

    /// State file exists but cannot be read, decoded or written.
    #[error("state file {}: {message}", .path.display())]
    Persistence { path: PathBuf, message: String },

    /// SMTP transport, authentication or relay failure.
    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl WatchError {
    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            WatchError::Config(_) | WatchError::Render(_) => 1,
            WatchError::Fetch { .. } => 2,
            WatchError::Parse { .. } => 3,
            WatchError::Delivery(_) => 4,
            WatchError::Persistence { .. } => 5,
        }
    }

    pub(crate) fn persistence(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        WatchError::Persistence {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, WatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            WatchError::Fetch { subreddit: "x".into(), status: Some(503), message: "down".into() },
            WatchError::Parse { subreddit: "x".into(), message: "bad".into() },
            WatchError::Delivery("auth".into()),
            WatchError::Persistence { path: "s.json".into(), message: "denied".into() },
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_fetch_error_message_includes_status() {
        let err = WatchError::Fetch {
            subreddit: "GameDeals".into(),
            status: Some(503),
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "fetching r/GameDeals failed (503): Service Unavailable");
    }

    #[test]
    fn test_fetch_error_message_without_status() {
        let err = WatchError::Fetch {
            subreddit: "GameDeals".into(),
            status: None,
            message: "timed out".into(),
        };
        assert_eq!(err.to_string(), "fetching r/GameDeals failed: timed out");
    }
}
