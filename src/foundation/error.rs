use crate::foundation::core::FrameIndex;

/// Convenience result type used across borderseq.
pub type BorderResult<T> = Result<T, BorderError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Document-level and directory errors are fatal for a batch run. The per-frame kinds
/// (`FrameShapeMismatch`, `ImageDecode`, `ImageEncode`) are caught at the job boundary and reported
/// as failed frames instead of aborting the batch.
#[derive(thiserror::Error, Debug)]
pub enum BorderError {
    /// Malformed declarative border document.
    #[error("document parse error: {0}")]
    DocumentParse(String),

    /// Edge color arrays do not match each other or the target raster.
    #[error("frame shape mismatch: {0}")]
    FrameShapeMismatch(String),

    /// A discovered image has no border data for its frame number.
    #[error("missing frame data: no descriptor for frame {0}")]
    MissingFrameData(FrameIndex),

    /// Source image could not be read or decoded.
    #[error("image decode error: {0}")]
    ImageDecode(String),

    /// Composited image could not be encoded or written.
    #[error("image encode error: {0}")]
    ImageEncode(String),

    /// Output directory could not be created.
    #[error("directory creation error: {0}")]
    DirectoryCreation(String),

    /// Invalid user-provided options or inputs.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BorderError {
    /// Build a [`BorderError::DocumentParse`] value.
    pub fn document_parse(msg: impl Into<String>) -> Self {
        Self::DocumentParse(msg.into())
    }

    /// Build a [`BorderError::FrameShapeMismatch`] value.
    pub fn frame_shape_mismatch(msg: impl Into<String>) -> Self {
        Self::FrameShapeMismatch(msg.into())
    }

    /// Build a [`BorderError::ImageDecode`] value.
    pub fn image_decode(msg: impl Into<String>) -> Self {
        Self::ImageDecode(msg.into())
    }

    /// Build a [`BorderError::ImageEncode`] value.
    pub fn image_encode(msg: impl Into<String>) -> Self {
        Self::ImageEncode(msg.into())
    }

    /// Build a [`BorderError::DirectoryCreation`] value.
    pub fn directory_creation(msg: impl Into<String>) -> Self {
        Self::DirectoryCreation(msg.into())
    }

    /// Build a [`BorderError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
