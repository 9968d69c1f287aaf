use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Invalid media request: {0}")]
    Validation(String),

    #[error("{service} service request failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} service returned status {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, MediaError>;
