use crate::error::CaptureError;
use crate::models::Frame;
use crate::utils::images::collect_images;
use image::DynamicImage;
use std::collections::VecDeque;
use std::path::Path;

/// Camera hardware or driver exposed as a frame source.
///
/// Driven from the capture worker thread, hence `Send`.
pub trait CaptureDevice: Send {
    /// Human readable device name
    fn name(&self) -> &str;

    /// Whether the device can currently be attached to a session
    fn is_available(&self) -> bool {
        true
    }

    /// Begin streaming frames. May block while the sensor powers up.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Stop streaming frames
    fn stop(&mut self);

    /// Wait for the next frame; `Ok(None)` once the stream has ended
    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError>;
}

impl<D: CaptureDevice + ?Sized> CaptureDevice for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        (**self).start()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        (**self).next_frame()
    }
}

/// Locates the default video capture device
pub trait DeviceDiscovery {
    /// The device a scanner should use, `None` when there is no camera
    fn default_video_device(&self) -> Option<Box<dyn CaptureDevice>>;
}

impl<F> DeviceDiscovery for F
where
    F: Fn() -> Option<Box<dyn CaptureDevice>>,
{
    fn default_video_device(&self) -> Option<Box<dyn CaptureDevice>> {
        self()
    }
}

/// Capture device replaying still images as a video stream.
///
/// Frames are numbered from 1 in the order they were supplied. The stream
/// ends after the last image.
#[derive(Debug, Clone)]
pub struct ImageSequenceDevice {
    name: String,
    frames: VecDeque<Frame>,
    started: bool,
    next_sequence: u64,
}

impl ImageSequenceDevice {
    /// Device replaying already captured frames
    pub fn new(name: impl Into<String>, frames: impl IntoIterator<Item = Frame>) -> Self {
        let mut device = Self {
            name: name.into(),
            frames: VecDeque::new(),
            started: false,
            next_sequence: 1,
        };
        for frame in frames {
            device.push_frame(frame);
        }
        device
    }

    /// Device replaying decoded images
    pub fn from_images<'a>(
        name: impl Into<String>,
        images: impl IntoIterator<Item = &'a DynamicImage>,
    ) -> Result<Self, CaptureError> {
        let frames = images
            .into_iter()
            .map(Frame::from_image)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(name, frames))
    }

    /// Device replaying image files in the given order
    pub fn from_paths<P: AsRef<Path>>(
        name: impl Into<String>,
        paths: impl IntoIterator<Item = P>,
    ) -> Result<Self, CaptureError> {
        let mut frames = Vec::new();
        for path in paths {
            let image = image::open(path.as_ref())?;
            frames.push(Frame::from_image(&image)?);
        }
        Ok(Self::new(name, frames))
    }

    /// Device replaying every image under `dir`, sorted by path
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, CaptureError> {
        let dir = dir.as_ref();
        Self::from_paths(dir.display().to_string(), collect_images(dir))
    }

    /// Queue another frame at the end of the stream
    pub fn push_frame(&mut self, frame: Frame) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.frames.push_back(frame.with_sequence(sequence));
    }

    /// Frames not yet delivered
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl CaptureDevice for ImageSequenceDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.started = false;
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        if !self.started {
            return Err(CaptureError::NotStarted(self.name.clone()));
        }
        Ok(self.frames.pop_front())
    }
}
