use super::{Point, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Barcode symbology a recognizer can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    /// QR code (Model 1, Model 2 and Micro)
    Qr,
    /// Data Matrix (ECC 200)
    DataMatrix,
    /// Aztec code
    Aztec,
    /// PDF417 stacked linear code
    Pdf417,
    /// Code 128 linear code
    Code128,
    /// EAN-13 retail code
    Ean13,
}

impl Symbology {
    /// Symbologies a scanner listens for unless configured otherwise
    pub const DEFAULT_SET: [Symbology; 2] = [Symbology::Qr, Symbology::DataMatrix];
}

/// One symbol found by a recognizer in one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Symbology of the detected symbol
    pub symbology: Symbology,
    /// Embedded text, `None` when the symbol holds no readable text
    pub payload: Option<String>,
    /// Corner points in frame coordinates (clockwise from top-left)
    pub corners: [Point; 4],
}

impl Detection {
    /// Detection carrying readable text
    pub fn text(symbology: Symbology, text: impl Into<String>) -> Self {
        Self {
            symbology,
            payload: Some(text.into()),
            corners: [Point::default(); 4],
        }
    }

    /// Detection whose payload could not be read as text
    pub fn unreadable(symbology: Symbology) -> Self {
        Self {
            symbology,
            payload: None,
            corners: [Point::default(); 4],
        }
    }

    /// Attach corner points
    pub fn with_corners(mut self, corners: [Point; 4]) -> Self {
        self.corners = corners;
        self
    }
}

/// Decoded text of one symbol in one frame.
///
/// Immutable once produced by the metadata output.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    text: String,
    symbology: Symbology,
    corners: [Point; 4],
    frame_size: Size,
    frame_sequence: u64,
}

impl ScanResult {
    /// Build a result for a frame of the given size and sequence number
    pub fn new(
        text: String,
        symbology: Symbology,
        corners: [Point; 4],
        frame_size: Size,
        frame_sequence: u64,
    ) -> Self {
        Self {
            text,
            symbology,
            corners,
            frame_size,
            frame_sequence,
        }
    }

    /// Decoded text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Symbology the text was read from
    pub fn symbology(&self) -> Symbology {
        self.symbology
    }

    /// Symbol corners in frame coordinates
    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    /// Size of the frame the symbol was found in
    pub fn frame_size(&self) -> Size {
        self.frame_size
    }

    /// Sequence number of the frame the symbol was found in
    pub fn frame_sequence(&self) -> u64 {
        self.frame_sequence
    }

    /// Consume the result, keeping only the text
    pub fn into_text(self) -> String {
        self.text
    }
}

impl AsRef<str> for ScanResult {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
