//! Error types shared across assistant crates.
//!
//! These errors represent failures in infrastructure components (the text-generation
//! backend) that are common to every assistant binary. Application-specific errors should
//! be defined in each binary crate and wrap `CommonError` via `#[from]`.

use crate::gemini::GeminiClientError;

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("gemini error: {0}")]
    Gemini(#[from] GeminiClientError),

    #[error("generation error: {0}")]
    Generation(String),
}
