use super::device::CaptureDevice;
use super::output::MetadataOutput;
use crate::error::{CaptureError, SetupError};
use crate::models::{Frame, ScanResult};

/// Wiring between one capture device and one metadata output
pub struct CaptureSession {
    input: Option<Box<dyn CaptureDevice>>,
    output: Option<MetadataOutput>,
    running: bool,
}

impl CaptureSession {
    /// Empty, stopped session
    pub fn new() -> Self {
        Self {
            input: None,
            output: None,
            running: false,
        }
    }

    /// Whether `device` would be accepted as the session input
    pub fn can_add_input(&self, device: &dyn CaptureDevice) -> bool {
        self.input.is_none() && device.is_available()
    }

    /// Attach `device` as the session input
    pub fn add_input(&mut self, device: Box<dyn CaptureDevice>) -> Result<(), SetupError> {
        if !self.can_add_input(device.as_ref()) {
            return Err(SetupError::InputRejected(device.name().to_string()));
        }
        self.input = Some(device);
        Ok(())
    }

    /// Whether a metadata output would be accepted
    pub fn can_add_output(&self) -> bool {
        self.output.is_none()
    }

    /// Attach the metadata output
    pub fn add_output(&mut self, output: MetadataOutput) -> Result<(), SetupError> {
        if !self.can_add_output() {
            return Err(SetupError::OutputRejected);
        }
        self.output = Some(output);
        Ok(())
    }

    /// The attached metadata output
    pub fn output_mut(&mut self) -> Option<&mut MetadataOutput> {
        self.output.as_mut()
    }

    /// Whether the input device is streaming
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start the input device. No-op when already running.
    pub fn start_running(&mut self) -> Result<(), CaptureError> {
        if self.running {
            return Ok(());
        }
        let input = self
            .input
            .as_mut()
            .ok_or_else(|| CaptureError::Device("session has no input".to_string()))?;
        input.start()?;
        self.running = true;
        Ok(())
    }

    /// Stop the input device. No-op when not running.
    pub fn stop_running(&mut self) {
        if !self.running {
            return;
        }
        if let Some(input) = self.input.as_mut() {
            input.stop();
        }
        self.running = false;
    }

    /// Pull one frame and run it through the output.
    ///
    /// Returns `Ok(None)` when stopped or once the device stream has ended.
    pub fn next_results(&mut self) -> Result<Option<(Frame, Vec<ScanResult>)>, CaptureError> {
        if !self.running {
            return Ok(None);
        }
        let Some(input) = self.input.as_mut() else {
            return Ok(None);
        };
        let Some(frame) = input.next_frame()? else {
            return Ok(None);
        };
        let results = match self.output.as_mut() {
            Some(output) => output.process(&frame),
            None => Vec::new(),
        };
        Ok(Some((frame, results)))
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}
