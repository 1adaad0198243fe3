//! Relay endpoint normalization

/// Path segment the relay serves the Gemini protocol under
pub const GEMINI_SUFFIX: &str = "/gemini";

const OPENAI_VERSION_SUFFIX: &str = "/v1";

/// Compute the Gemini endpoint for a relay base URL
///
/// Strips all trailing `/`, then a trailing `/v1`, then appends `/gemini`
/// unless already present. Applying it twice gives the same result.
pub fn normalize_base_url(base_url: &str) -> String {
    let url = base_url.trim_end_matches('/');
    let url = url.strip_suffix(OPENAI_VERSION_SUFFIX).unwrap_or(url);

    if url.ends_with(GEMINI_SUFFIX) {
        url.to_string()
    } else {
        format!("{}{}", url, GEMINI_SUFFIX)
    }
}
