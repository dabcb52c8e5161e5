use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage: {0}")]
    Storage(String),
    #[error("serialize team state: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("encrypt provider keys: {0}")]
    Crypto(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}
