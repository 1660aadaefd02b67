/// Core error type.
///
/// Adapter crates should map their specific errors into this type so the
/// session loop can tell expected failures (timeouts, missing permissions)
/// from transport failures that propagate to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// No matching event arrived within the wait budget. Always handled
    /// locally: it ends the session loop or the jump sub-dialog, never the
    /// process.
    #[error("wait timed out")]
    TimedOut,

    /// The messenger refused a best-effort operation (control retraction).
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
