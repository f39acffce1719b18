#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read catalog {path}: {source}")]
    CatalogRead {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse catalog {path}: {source}")]
    CatalogParse {
        path: String,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Common(#[from] assistant_common::error::CommonError),
}
