use thiserror::Error;

/// Terminal transport-level failures of a probe. These never propagate as
/// `Err`; they ride inside the outcome so every check resolves exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("redirect loop")]
    RedirectLoop,
    #[error("too many redirects")]
    TooManyRedirects,
    #[error("redirect without location header")]
    MissingLocation,
    #[error("{0}")]
    Transport(String),
}

/// Result of one probe cycle for one rule. Ephemeral; the incident engine
/// diffs it against the stored record.
#[derive(Debug, Clone, Default)]
pub struct CheckOutcome {
    /// Attempts exhausted via timeout
    pub timed_out: bool,
    /// Operator evaluation failed (or the operator was unsupported)
    pub content_mismatch: bool,
    /// Peer certificate expires within the configured lead time.
    /// Only meaningful for https targets.
    pub cert_expiring: bool,
    /// 0 if the request never completed with a response
    pub status_code: u16,
    pub transport_error: Option<ProbeError>,
}

impl CheckOutcome {
    /// Error predicate used by the incident engine.
    pub fn is_error(&self) -> bool {
        self.timed_out
            || self.content_mismatch
            || self.status_code != 0
            || self.transport_error.is_some()
    }
}
