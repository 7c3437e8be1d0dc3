use crate::error::SetupError;
use crate::models::{Frame, ScanResult, Symbology};
use crate::recognizer::Recognizer;

/// Session output that runs the recognizer over frames and keeps readable
/// results of the requested symbologies.
pub struct MetadataOutput {
    recognizer: Box<dyn Recognizer>,
    symbologies: Vec<Symbology>,
}

impl MetadataOutput {
    /// Output with no symbologies selected; nothing is forwarded until
    /// [`set_symbologies`](Self::set_symbologies) succeeds.
    pub fn new(recognizer: Box<dyn Recognizer>) -> Self {
        Self {
            recognizer,
            symbologies: Vec::new(),
        }
    }

    /// Symbologies the recognizer can report
    pub fn available_symbologies(&self) -> &[Symbology] {
        self.recognizer.supported_symbologies()
    }

    /// Symbologies currently forwarded
    pub fn symbologies(&self) -> &[Symbology] {
        &self.symbologies
    }

    /// Restrict forwarding to `symbologies`.
    ///
    /// # Errors
    /// Fails without changing the selection when the list is empty or names
    /// a symbology the recognizer does not support.
    pub fn set_symbologies(&mut self, symbologies: &[Symbology]) -> Result<(), SetupError> {
        if symbologies.is_empty() {
            return Err(SetupError::NoSymbologies);
        }
        let available = self.available_symbologies();
        if let Some(missing) = symbologies.iter().find(|s| !available.contains(*s)) {
            return Err(SetupError::UnsupportedSymbology(*missing));
        }
        let mut selected = Vec::with_capacity(symbologies.len());
        for symbology in symbologies {
            if !selected.contains(symbology) {
                selected.push(*symbology);
            }
        }
        self.symbologies = selected;
        Ok(())
    }

    /// Recognize one frame.
    ///
    /// Results keep the recognizer's order. Detections without readable text
    /// or outside the selected symbologies are dropped.
    pub fn process(&mut self, frame: &Frame) -> Vec<ScanResult> {
        let detections = self.recognizer.recognize(frame);
        let mut results = Vec::with_capacity(detections.len());
        for detection in detections {
            if !self.symbologies.contains(&detection.symbology) {
                continue;
            }
            let Some(text) = detection.payload else {
                tracing::debug!(
                    symbology = ?detection.symbology,
                    frame = frame.sequence(),
                    "skipping symbol without readable text"
                );
                continue;
            };
            results.push(ScanResult::new(
                text,
                detection.symbology,
                detection.corners,
                frame.size(),
                frame.sequence(),
            ));
        }
        results
    }
}
