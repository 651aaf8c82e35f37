use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// Why a redirect chain stopped short of a terminal response.
///
/// The `Display` text is what ends up in `LinkResult::error`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("too many redirects")]
    TooManyRedirects,

    #[error("redirect loop")]
    RedirectLoop,

    #[error("{0}")]
    Transport(String),
}

impl ResolveError {
    /// Describe a reqwest failure the way operators read it in a report.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            err.to_string()
        };
        ResolveError::Transport(reason)
    }
}
