//! qrcode_view - camera preview component that scans QR and data-matrix codes
//!
//! A [`ScannerView`] drives a capture device, runs every frame through a
//! pluggable [`Recognizer`], and hands the decoded text to a caller-supplied
//! predicate. Accepted results trigger haptic or audio feedback. Typed
//! [`Decoder`]s turn the scanned text into JSON values or URLs.
//!
//! Camera access and symbol decoding are provided by the host through the
//! [`CaptureDevice`] and [`Recognizer`] traits.
//!
//! # Example
//! ```
//! use qrcode_view::{
//!     CaptureDevice, Decoder, Detection, Frame, FnRecognizer, ImageSequenceDevice, PixelFormat,
//!     ScannerConfig, ScannerView, Symbology,
//! };
//!
//! let frame = Frame::new(8, 8, PixelFormat::Luma8, vec![0; 64]).unwrap();
//! let camera = move || -> Option<Box<dyn CaptureDevice>> {
//!     Some(Box::new(ImageSequenceDevice::new("camera", [frame.clone()])))
//! };
//! let recognizer = FnRecognizer::new(Symbology::DEFAULT_SET, |_: &Frame| {
//!     vec![Detection::text(Symbology::Qr, "https://example.com")]
//! });
//!
//! let mut view = ScannerView::open(ScannerConfig::default(), &camera, recognizer);
//! let urls = Decoder::url();
//! view.set_on_result(move |result| urls.decode(result.text()).is_some());
//!
//! view.flush();
//! assert_eq!(view.pump(), 1);
//! view.stop_scan();
//! assert!(!view.is_scanning());
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Capture session, devices and the background capture controller
pub mod capture;
/// Scanner configuration
pub mod config;
/// Error types
pub mod error;
/// Haptic and audio feedback
pub mod feedback;
/// Core data structures (Frame, ScanResult, Point, etc.)
pub mod models;
/// Typed decoders for scanned text
pub mod payload;
/// Preview render target
pub mod preview;
/// Symbol recognition seam
pub mod recognizer;
/// The scanner view tying capture, preview and callbacks together
pub mod scanner;
/// Utility functions (grayscale, image discovery)
pub mod utils;

mod dispatch;

pub use capture::{CaptureDevice, DeviceDiscovery, ImageSequenceDevice};
pub use config::ScannerConfig;
pub use error::{CaptureError, ConfigError, DecodeError, FrameError, SetupError};
pub use feedback::{FeedbackKind, FeedbackSink, LogFeedback};
pub use models::{Detection, Frame, PixelFormat, Point, Rect, ScanResult, Size, Symbology};
pub use payload::Decoder;
pub use preview::{PreviewLayer, VideoGravity};
pub use recognizer::{FnRecognizer, Recognizer};
pub use scanner::ScannerView;
