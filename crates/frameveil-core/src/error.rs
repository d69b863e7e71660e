use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameveilError {
    /// Represents a missing or unreadable source video file
    #[error("Input video not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Represents a frame image that could not be decoded or normalized to RGB
    #[error("Image is not supported or not decodable: {}", .0.display())]
    UnsupportedImage(PathBuf),

    /// Represents a non-zero exit or crash of an external media tool
    #[error("External tool `{tool}` failed: {detail}")]
    ExternalToolFailure { tool: String, detail: String },

    /// Represents an external media tool exceeding the configured deadline
    #[error("External tool `{tool}` timed out")]
    ExternalToolTimeout { tool: String },

    /// Represents a failure to read from input.
    #[error("Read error")]
    ReadError { source: std::io::Error },

    /// Represents a failure to write a target file.
    #[error("Write error")]
    WriteError { source: std::io::Error },

    /// Represents a failure when encoding a frame image file.
    #[error("Frame encoding error: {}", .0.display())]
    FrameEncodingError(PathBuf),

    /// Represents differing cover and secret frame counts under the `Error`
    /// mismatch policy, or a loop-pad request with zero secret frames
    #[error("Cover has {cover} frames but secret has {secret}")]
    SequenceLengthMismatch { cover: usize, secret: usize },

    /// Represents a cooperative cancellation between stages or frames
    #[error("Pipeline run was cancelled")]
    Cancelled,

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("No cover video set")]
    CoverNotSet,

    #[error("No secret video set")]
    SecretNotSet,

    #[error("No input video set")]
    InputNotSet,

    #[error("No target file set")]
    TargetNotSet,
}
