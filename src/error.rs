//! Error types for the radial-fade crate.

/// Errors that can occur while fading, encoding or storing an image.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input was rejected before any pixel work started.
    ///
    /// Covers non-image content types, zero-dimension images, empty uploads,
    /// blend factors outside `[0, 1]`, malformed data URLs and unsafe store keys.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The bytes do not parse as a supported image format.
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),

    /// The faded image could not be serialized to PNG.
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),

    /// The blob store failed a put or get, or the key does not exist.
    #[error("storage error: {0}")]
    Storage(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
