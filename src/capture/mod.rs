//! Capture lifecycle
//!
//! - Device and discovery seams plus a still-image replay device
//! - The session tying one device to one metadata output
//! - The controller running the session on a background worker

pub mod controller;
pub mod device;
pub mod output;
pub mod session;

pub use controller::CaptureController;
pub use device::{CaptureDevice, DeviceDiscovery, ImageSequenceDevice};
pub use output::MetadataOutput;
pub use session::CaptureSession;
