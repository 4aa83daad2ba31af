use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("precondition failed: {0}")]
    Precondition(String),
    #[error("transform failed: {0}")]
    Transform(String),
    #[error("surface error: {0}")]
    Surface(String),
}

impl FrameError {
    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FrameError::Precondition(_) => "precondition",
            FrameError::Transform(_) => "transform",
            FrameError::Surface(_) => "surface",
        }
    }
}
