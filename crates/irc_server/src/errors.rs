use thiserror::Error;

/// Errors a command handler can raise. Distinguishes the four categories the
/// connection task must treat differently: a protocol error becomes a
/// numeric reply and the connection stays open; everything else closes it.
///
/// Handlers return `Result<(), IrcError>`; `dispatch::dispatch` is the single
/// place that inspects the variant and decides numeric-reply-and-continue
/// versus log-and-disconnect, per SPEC_FULL §4.9/§7.
#[derive(Error, Debug, Clone)]
pub enum IrcError {
    /// Malformed or disallowed client input. Carries the already-formatted,
    /// CRLF-terminated numeric reply line to send back; the connection is
    /// not affected.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The line did not match any recognised command grammar.
    #[error("unrecognised command")]
    UnknownCommand,

    /// Socket read/write failed. Fatal to the connection.
    #[error("transport error: {0}")]
    Transport(String),

    /// Input could not be decoded or exceeded a resource bound (e.g. the
    /// line buffer cap). Fatal to the connection.
    #[error("resource error: {0}")]
    Resource(String),

    /// An invariant the server relies on did not hold. Should never happen;
    /// logged and the offending connection is torn down, not the process.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl From<std::io::Error> for IrcError {
    fn from(err: std::io::Error) -> Self {
        IrcError::Transport(err.to_string())
    }
}
