use thiserror::Error;

/// Errors that can occur when talking to the hosting service.
///
/// Any of these aborts enumeration; partial listings are discarded.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Credentials rejected (401/403 without a quota explanation).
    #[error("authorization failed for {url}: {message}")]
    Unauthorized { url: String, message: String },

    /// Non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        status: u16,
        url: String,
        message: String,
    },

    /// Connection, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl ProviderError {
    #[inline]
    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Builds the error for a non-success response status.
    pub fn from_status(status: u16, url: impl Into<String>, body: &str) -> Self {
        let url = url.into();
        let message = short_message(body);
        match status {
            401 | 403 => Self::Unauthorized { url, message },
            _ => Self::Http {
                status,
                url,
                message,
            },
        }
    }
}

/// First line of a response body, truncated for log output.
fn short_message(body: &str) -> String {
    const MAX_LEN: usize = 120;
    let first = body.lines().next().unwrap_or("").trim();
    if first.chars().count() > MAX_LEN {
        let truncated: String = first.chars().take(MAX_LEN).collect();
        format!("{truncated}...")
    } else {
        first.to_string()
    }
}
