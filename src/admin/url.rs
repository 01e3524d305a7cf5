//! URL validation for submitted sites.

use log::warn;

use crate::error_handling::AdminError;

/// Longest URL accepted for tracking.
const MAX_URL_LENGTH: usize = 2048;

/// Validates a submitted URL and returns its normalized form.
///
/// The URL must be absolute with an `http` or `https` scheme and a host. No
/// scheme is guessed: a tracked URL is exactly what the operator pasted.
///
/// # Errors
///
/// Returns `AdminError::InvalidUrl` for unparseable, overlong, hostless or
/// non-HTTP URLs.
pub fn validate_and_normalize_url(url: &str) -> Result<String, AdminError> {
    let url = url.trim();
    if url.len() > MAX_URL_LENGTH {
        let preview: String = url.chars().take(50).collect();
        warn!(
            "Rejecting URL exceeding maximum length ({} > {}): {}...",
            url.len(),
            MAX_URL_LENGTH,
            preview
        );
        return Err(AdminError::InvalidUrl(format!("{}...", preview)));
    }

    let parsed = url::Url::parse(url).map_err(|e| {
        warn!("Rejecting invalid URL {url}: {e}");
        AdminError::InvalidUrl(url.to_string())
    })?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed.to_string()),
        _ => {
            warn!("Rejecting unsupported URL: {url}");
            Err(AdminError::InvalidUrl(url.to_string()))
        }
    }
}
