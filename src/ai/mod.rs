pub mod gemini;
pub mod prompts;

// ── Error taxonomy ────────────────────────────────────

/// Classified generation failures. Only `RateLimited` is retryable; every
/// other class surfaces to the caller immediately.
#[derive(Debug, PartialEq)]
pub enum GenError {
    InvalidKey,
    RateLimited,
    Timeout,
    /// Anything else, detail truncated to 300 chars.
    Other(String),
}

impl GenError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenError::RateLimited)
    }

    /// An `Other` with its detail truncated.
    pub(crate) fn other(detail: &str) -> GenError {
        GenError::Other(truncate(detail, 300))
    }

    /// Classify a provider failure from its combined status + body text.
    /// Mirrors the provider's observed error strings: key problems first,
    /// then quota/rate signals, then timeouts.
    pub fn classify(detail: &str) -> GenError {
        let lower = detail.to_lowercase();
        if detail.contains("API_KEY") || lower.contains("api key") || lower.contains("invalid") {
            GenError::InvalidKey
        } else if lower.contains("quota") || lower.contains("rate") || detail.contains("429") {
            GenError::RateLimited
        } else if lower.contains("timeout") {
            GenError::Timeout
        } else {
            GenError::Other(truncate(detail, 300))
        }
    }
}

impl std::fmt::Display for GenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenError::InvalidKey => {
                write!(f, "Invalid Gemini API key. Please check your key.")
            }
            GenError::RateLimited => write!(
                f,
                "Rate limit hit: wait 90 seconds before trying again. \
                 The free tier allows 15 requests per minute; use a paid \
                 API key or space out requests."
            ),
            GenError::Timeout => write!(f, "Request timeout. Please try again."),
            GenError::Other(detail) => write!(f, "Gemini error: {}", detail),
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
