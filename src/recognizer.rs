//! Barcode recognition seam.
//!
//! The scanner never decodes symbols itself. A [`Recognizer`] is handed each
//! captured frame and reports what it found; the metadata output filters and
//! forwards the readable results.

use crate::models::{Detection, Frame, Symbology};

/// Symbol detection capability applied to captured frames.
///
/// Runs on the capture worker, so implementations must be `Send`.
pub trait Recognizer: Send {
    /// Symbologies this recognizer is able to report
    fn supported_symbologies(&self) -> &[Symbology];

    /// Find symbols in one frame, in the order they should be delivered
    fn recognize(&mut self, frame: &Frame) -> Vec<Detection>;
}

impl<R: Recognizer + ?Sized> Recognizer for Box<R> {
    fn supported_symbologies(&self) -> &[Symbology] {
        (**self).supported_symbologies()
    }

    fn recognize(&mut self, frame: &Frame) -> Vec<Detection> {
        (**self).recognize(frame)
    }
}

/// Recognizer backed by a closure, for wrapping an external decoding library
pub struct FnRecognizer<F> {
    symbologies: Vec<Symbology>,
    recognize: F,
}

impl<F> FnRecognizer<F>
where
    F: FnMut(&Frame) -> Vec<Detection> + Send,
{
    /// Wrap `recognize`, advertising support for `symbologies`
    pub fn new(symbologies: impl Into<Vec<Symbology>>, recognize: F) -> Self {
        Self {
            symbologies: symbologies.into(),
            recognize,
        }
    }
}

impl<F> Recognizer for FnRecognizer<F>
where
    F: FnMut(&Frame) -> Vec<Detection> + Send,
{
    fn supported_symbologies(&self) -> &[Symbology] {
        &self.symbologies
    }

    fn recognize(&mut self, frame: &Frame) -> Vec<Detection> {
        (self.recognize)(frame)
    }
}
