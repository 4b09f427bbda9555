use thiserror::Error;

/// Everything that can go wrong while producing or consuming frames.
///
/// Each variant has a stable integer code so the C boundary can report the
/// exact cause (see [`AirgapError::code`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AirgapError {
    #[error("unknown error")]
    Unknown,
    #[error("null pointer")]
    NullPointer,
    #[error("invalid frame magic")]
    InvalidMagic,
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u8),
    #[error("CRC check failed")]
    CrcMismatch,
    #[error("frame belongs to a different session")]
    SessionMismatch,
    #[error("frame metadata does not match session")]
    MetadataMismatch,
    #[error("chunk index out of bounds")]
    ChunkOutOfBounds,
    #[error("payload requires too many chunks")]
    TooManyChunks,
    #[error("chunk size too large")]
    ChunkSizeTooLarge,
    #[error("chunk size too small")]
    ChunkSizeTooSmall,
    #[error("missing chunk")]
    MissingChunk,
    #[error("invalid transport encoding")]
    Encoding,
}

impl AirgapError {
    /// Stable status code used across the C boundary. Success is 0.
    pub fn code(&self) -> i32 {
        match self {
            AirgapError::Unknown => -1,
            AirgapError::NullPointer => -2,
            AirgapError::InvalidMagic => -3,
            AirgapError::UnsupportedVersion(_) => -4,
            AirgapError::CrcMismatch => -5,
            AirgapError::SessionMismatch => -6,
            AirgapError::MetadataMismatch => -7,
            AirgapError::ChunkOutOfBounds => -8,
            AirgapError::TooManyChunks => -9,
            AirgapError::ChunkSizeTooLarge => -10,
            AirgapError::ChunkSizeTooSmall => -11,
            AirgapError::MissingChunk => -12,
            AirgapError::Encoding => -13,
        }
    }
}

pub type Result<T> = std::result::Result<T, AirgapError>;
