/// Third-party platform failure. Captured into the job's `error` state for
/// downloads; surfaced as 502 for previews. Never retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection, DNS, TLS, or HTTP-level failure talking to the platform.
    #[error("network error: {0}")]
    Network(String),
    /// The URL does not point at content this fetcher understands.
    #[error("unsupported URL: {0}")]
    Unsupported(String),
    /// Private, removed, or region-locked content.
    #[error("content unavailable: {0}")]
    Unavailable(String),
    /// Writing the artifact failed.
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
    /// The job's cancellation token fired.
    #[error("cancelled")]
    Cancelled,
}
