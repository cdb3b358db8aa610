use thiserror::Error;

/// External sensor gated behind a permission request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    Microphone,
    Orientation,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Microphone => f.write_str("microphone"),
            Capability::Orientation => f.write_str("orientation"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("{0} permission denied")]
    Denied(Capability),
    #[error("{0} is not available on this device")]
    Unsupported(Capability),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("ink buffer is empty")]
    EmptyBuffer,
    #[error("ink buffer readback has {got} bytes, expected {expected}")]
    Readback { expected: usize, got: usize },
    #[error("unknown profile `{0}`")]
    UnknownProfile(String),
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}
