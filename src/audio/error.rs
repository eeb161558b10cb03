use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum AudioError {
    #[error("audio output device error: {0}")]
    Device(String),

    #[error("failed to enqueue audio: {0}")]
    Enqueue(String),
}
