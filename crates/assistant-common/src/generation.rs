//! Seam between the assistants and whatever produces their answers.
//!
//! Implementations turn one fully-assembled prompt into completion text. They report
//! failure through `CommonError` and never decide what the end user sees; substituting a
//! fallback reply is the caller's job.

use async_trait::async_trait;

use crate::error::CommonError;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short backend identifier used in logs, e.g. "gemini:gemini-1.5-flash".
    fn backend(&self) -> String;

    async fn generate_text(&self, prompt: &str) -> Result<String, CommonError>;
}
