use super::Size;
use crate::error::FrameError;
use crate::utils::grayscale::{luma_to_rgb, rgb_to_luma, rgba_to_luma, rgba_to_rgb};
use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};

/// Pixel layout of a frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 8-bit grayscale, 1 byte per pixel
    Luma8,
    /// 8-bit RGB, 3 bytes per pixel
    Rgb8,
    /// 8-bit RGBA, 4 bytes per pixel
    Rgba8,
}

impl PixelFormat {
    /// Bytes used by a single pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Luma8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// One video frame delivered by a capture device
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    format: PixelFormat,
    data: Vec<u8>,
    sequence: u64,
}

impl Frame {
    /// Wrap a tightly packed pixel buffer
    ///
    /// # Errors
    /// Fails when a dimension is zero, when a dimension exceeds `u32::MAX`
    /// or the byte count overflows, or when the buffer length does not match
    /// `width * height * format.bytes_per_pixel()`.
    pub fn new(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::ZeroDimension { width, height });
        }
        if u32::try_from(width).is_err() || u32::try_from(height).is_err() {
            return Err(FrameError::TooLarge { width, height });
        }
        let expected = width
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(format.bytes_per_pixel()))
            .ok_or(FrameError::TooLarge { width, height })?;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                format,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
            sequence: 0,
        })
    }

    /// Build a frame from a decoded image, keeping grayscale images as luma
    pub fn from_image(image: &DynamicImage) -> Result<Self, FrameError> {
        let (format, data, width, height) = match image {
            DynamicImage::ImageLuma8(gray) => (
                PixelFormat::Luma8,
                gray.as_raw().clone(),
                gray.width(),
                gray.height(),
            ),
            DynamicImage::ImageRgba8(rgba) => (
                PixelFormat::Rgba8,
                rgba.as_raw().clone(),
                rgba.width(),
                rgba.height(),
            ),
            other => {
                let rgb = other.to_rgb8();
                let (w, h) = rgb.dimensions();
                (PixelFormat::Rgb8, rgb.into_raw(), w, h)
            }
        };
        Self::new(width as usize, height as usize, format, data)
    }

    /// Stamp the frame with its position in the capture stream
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Frame width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Frame dimensions as a [`Size`]
    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    /// Pixel layout
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw pixel bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Position in the capture stream
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Grayscale copy of the pixels, one byte per pixel.
    ///
    /// For [`Recognizer`](crate::Recognizer) implementations that work on
    /// luminance; the scanner itself never converts frames to luma.
    pub fn to_luma(&self) -> Vec<u8> {
        match self.format {
            PixelFormat::Luma8 => self.data.clone(),
            PixelFormat::Rgb8 => rgb_to_luma(&self.data, self.width, self.height),
            PixelFormat::Rgba8 => rgba_to_luma(&self.data, self.width, self.height),
        }
    }

    /// RGB copy of the pixels for rendering
    pub fn to_rgb_image(&self) -> RgbImage {
        let rgb = match self.format {
            PixelFormat::Luma8 => luma_to_rgb(&self.data),
            PixelFormat::Rgb8 => self.data.clone(),
            PixelFormat::Rgba8 => rgba_to_rgb(&self.data),
        };
        // `new` bounds both dimensions by u32 and checks the length.
        RgbImage::from_raw(self.width as u32, self.height as u32, rgb)
            .unwrap_or_else(|| RgbImage::new(self.width as u32, self.height as u32))
    }
}
