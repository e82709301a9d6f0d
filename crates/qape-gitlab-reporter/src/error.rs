//! Error types for the reporter.

/// Reporter errors.
///
/// The first three variants are fatal during [`GitlabReporter::init`]
/// (the event handler is never attached); the rest occur while reporting a
/// failure and are recovered locally — logged, never retried, never allowed
/// to abort the test run.
///
/// [`GitlabReporter::init`]: crate::reporter::GitlabReporter::init
#[derive(Debug, thiserror::Error)]
pub enum ReporterError {
    /// Required reporter option missing or malformed.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Startup probe against the tracker project failed.
    #[error("connectivity check failed for {url}: {reason}")]
    Connectivity { url: String, reason: String },

    /// Assignee username could not be resolved to a user id.
    #[error("user lookup failed for {username:?}: {reason}")]
    Lookup { username: String, reason: String },

    /// Open-backlog query failed at report time.
    #[error("listing open issues from {url} failed: {reason}")]
    List { url: String, reason: String },

    /// Issue create rejected by the tracker.
    #[error("issue create at {url} failed: {reason}")]
    Create { url: String, reason: String },

    /// Comment create rejected by the tracker.
    #[error("comment create at {url} failed: {reason}")]
    Comment { url: String, reason: String },
}

impl ReporterError {
    /// Whether the error must abort initialization.
    ///
    /// Errors raised after init are recovered locally and only logged.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::Connectivity { .. } | Self::Lookup { .. }
        )
    }
}

/// Result type for reporter operations.
pub type ReporterResult<T> = Result<T, ReporterError>;
