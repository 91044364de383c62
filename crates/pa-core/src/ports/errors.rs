use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(String),

    #[error("store rejected request ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("store returned malformed data: {0}")]
    Decode(String),

    #[error("row not found")]
    NotFound,
}

#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("realtime connection failed: {0}")]
    Connection(String),

    #[error("realtime publish failed: {0}")]
    Publish(String),

    #[error("realtime payload malformed: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum LocalStateError {
    #[error("local state io failed: {0}")]
    Io(String),

    #[error("local state corrupt: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Realtime(#[from] RealtimeError),

    #[error(transparent)]
    LocalState(#[from] LocalStateError),

    #[error("backend payload malformed: {0}")]
    Serialization(String),
}
