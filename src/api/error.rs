use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned an error (HTTP {status}): {}", render_errors(.errors))]
    Provider {
        status: u16,
        errors: Vec<serde_json::Value>,
    },

    #[error("malformed provider response (HTTP {status}): {body}")]
    Malformed { status: u16, body: String },
}

fn render_errors(errors: &[serde_json::Value]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }
    serde_json::Value::Array(errors.to_vec()).to_string()
}
