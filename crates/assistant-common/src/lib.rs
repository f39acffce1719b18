pub mod error;
pub mod gemini;
pub mod generation;
