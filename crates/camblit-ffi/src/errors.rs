use camblit_core::FrameError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("jni error: {0}")]
    Jni(#[from] jni::errors::Error),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl BridgeError {
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::Jni(_) => "jni",
            BridgeError::Frame(e) => e.kind(),
        }
    }
}
