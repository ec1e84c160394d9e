use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("play request rejected: {0}")]
    PlayRejected(String),
    #[error("seek rejected: {0}")]
    SeekRejected(String),
    #[error("request abandoned before completion")]
    Abandoned,
}
