use thiserror::Error;

#[derive(Error, Debug)]
pub enum PagelistError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Malformed response: {0}")]
    Shape(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Index {index} out of range for list of {len} items")]
    InvalidIndex { index: usize, len: usize },

    #[error("No item has been viewed")]
    NoPendingItem,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PagelistError>;
