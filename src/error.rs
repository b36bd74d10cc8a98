use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to create PDF: {0}")]
    Pdf(String),
    #[error("Network request failed: {0}")]
    Network(String),
    #[error("Failed to load image: {0}")]
    Image(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
