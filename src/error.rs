use thiserror::Error;

/// Error taxonomy surfaced at every component boundary.
///
/// Errors are classified by kind, not by transport status code. None of the
/// kinds trigger an automatic retry, and none tear the session down:
/// an expired access credential surfaces as [`ApiError::Rejected`] like any
/// other rejection.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not complete at the transport level.
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// A mutating action was attempted without an authenticated session.
    ///
    /// The only kind with a distinct user-facing action (a login prompt)
    /// rather than a bare error string.
    #[error("authentication required")]
    AuthRequired,

    /// A client-side precondition failed; no request was issued.
    #[error("{0}")]
    Validation(String),

    /// The server answered with a non-success status. No field-level
    /// error mapping is attempted.
    #[error("server rejected request ({status})")]
    Rejected { status: u16 },

    /// The credential store could not be read or written.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }
}
