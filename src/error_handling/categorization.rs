//! Transport error categorization.

use super::types::{TransportError, TransportFailure};

/// Categorizes a `reqwest::Error` as a timeout or a generic I/O failure.
///
/// Connect and read timeouts both land in [`TransportFailure::Timeout`];
/// everything else (refused connections, DNS failures, broken bodies, bad
/// redirects) is [`TransportFailure::Io`].
pub fn categorize_transport_error(error: &reqwest::Error) -> TransportError {
    let kind = if error.is_timeout() {
        TransportFailure::Timeout
    } else {
        TransportFailure::Io
    };
    TransportError::new(kind, error.to_string())
}
