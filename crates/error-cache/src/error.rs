#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to write error cache file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize stored error: {0}")]
    Serialize(#[from] serde_json::Error),
}
