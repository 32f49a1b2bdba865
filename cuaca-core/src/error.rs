use thiserror::Error;

/// Ways a single request to the provider can go wrong.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connect/read timeouts and other transport failures.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Error response: {code}\n{body}")]
    Status { code: u16, body: String },

    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    #[error("Missing field in provider response: {0}")]
    MissingField(&'static str),
}

impl FetchError {
    pub fn status(code: u16, body: &str) -> Self {
        Self::Status { code, body: truncate_body(body) }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
