use thiserror::Error;

#[derive(Debug, Error)]
pub enum XbrlError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("input is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("xml parse error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("no root {0} element")]
    MissingElement(&'static str),
    #[error("failed to write output document: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, XbrlError>;
