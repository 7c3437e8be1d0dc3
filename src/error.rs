//! Error types for each concern of the scanner.
//!
//! None of these escape the scanner's public lifecycle calls: setup errors
//! are logged and swallowed by `configure`, decode errors collapse into
//! `None`. They are public so that custom devices and recognizers can use
//! them.

use crate::models::{PixelFormat, Symbology};
use thiserror::Error;

/// Failure while wiring a capture session together.
#[derive(Debug, Error)]
pub enum SetupError {
    /// No default video device could be acquired.
    #[error("no default video capture device available")]
    NoDevice,
    /// The session refused the device as an input.
    #[error("capture session rejected input device `{0}`")]
    InputRejected(String),
    /// The session refused the metadata output.
    #[error("capture session rejected the metadata output")]
    OutputRejected,
    /// The recognizer cannot report a requested symbology.
    #[error("recognizer does not support symbology {0:?}")]
    UnsupportedSymbology(Symbology),
    /// The metadata output was configured with no symbologies.
    #[error("metadata output needs at least one symbology")]
    NoSymbologies,
    /// The capture worker could not be spawned.
    #[error("failed to spawn capture worker: {0}")]
    Worker(#[from] rayon::ThreadPoolBuildError),
}

/// Failure reported by a capture device.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The device is not available (unplugged, busy, permission denied).
    #[error("capture device `{0}` is unavailable")]
    Unavailable(String),
    /// A frame was requested before the device was started.
    #[error("capture device `{0}` is not started")]
    NotStarted(String),
    /// A still image backing the device could not be loaded.
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
    /// The device produced a malformed frame.
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// Any other device-specific failure.
    #[error("capture device failure: {0}")]
    Device(String),
}

/// A pixel buffer that does not describe a valid frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Width or height is zero.
    #[error("frame dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension {
        /// Frame width in pixels
        width: usize,
        /// Frame height in pixels
        height: usize,
    },
    /// The buffer length does not match the dimensions and format.
    #[error("frame buffer holds {actual} bytes, expected {expected} for {width}x{height} {format:?}")]
    BufferSize {
        /// Frame width in pixels
        width: usize,
        /// Frame height in pixels
        height: usize,
        /// Pixel layout of the buffer
        format: PixelFormat,
        /// Bytes required by the dimensions
        expected: usize,
        /// Bytes actually supplied
        actual: usize,
    },
    /// The dimensions do not fit a frame buffer or image.
    #[error("frame dimensions {width}x{height} are too large")]
    TooLarge {
        /// Frame width in pixels
        width: usize,
        /// Frame height in pixels
        height: usize,
    },
}

/// Why a payload decoder produced no value.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload bytes are not UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// The payload is not JSON of the expected shape.
    #[error("payload is not the expected JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The payload is not an absolute URL.
    #[error("payload is not a URL: {0}")]
    Url(#[from] url::ParseError),
    /// A custom decoding step rejected the payload.
    #[error("payload rejected by decoder")]
    Rejected,
}

/// Failure loading or validating a [`ScannerConfig`](crate::ScannerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The config text is not valid JSON for the config schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// The config parsed but holds unusable values.
    #[error("invalid config: {0}")]
    Invalid(String),
}
