//! Preview render target.
//!
//! The layer knows only its bounds and gravity. It is linked to a capture
//! controller by the owning [`ScannerView`](crate::ScannerView), which feeds
//! it the latest frame; it never touches the capture lifecycle.

use crate::models::{Frame, Point, Rect, Size};
use image::RgbImage;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

/// How frames are fitted into the preview bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoGravity {
    /// Stretch to fill the bounds, ignoring aspect ratio
    Resize,
    /// Fit inside the bounds preserving aspect ratio (letterboxed)
    ResizeAspect,
    /// Fill the bounds preserving aspect ratio, cropping overflow
    #[default]
    ResizeAspectFill,
}

/// Drawable surface showing the live camera feed
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewLayer {
    bounds: Size,
    gravity: VideoGravity,
}

impl PreviewLayer {
    /// Zero-sized layer with the given gravity
    pub fn new(gravity: VideoGravity) -> Self {
        Self {
            bounds: Size::ZERO,
            gravity,
        }
    }

    /// Current bounds
    pub fn bounds(&self) -> Size {
        self.bounds
    }

    /// Resize the layer
    pub fn set_bounds(&mut self, bounds: Size) {
        self.bounds = bounds;
    }

    /// Current gravity
    pub fn gravity(&self) -> VideoGravity {
        self.gravity
    }

    /// Change how frames are fitted
    pub fn set_gravity(&mut self, gravity: VideoGravity) {
        self.gravity = gravity;
    }

    /// Where a frame of `frame_size` is drawn, in layer coordinates.
    ///
    /// With [`VideoGravity::ResizeAspectFill`] the rect may extend past the
    /// bounds; the overflow is cropped. `None` when either size is empty.
    pub fn video_rect(&self, frame_size: Size) -> Option<Rect> {
        if self.bounds.is_empty() || frame_size.is_empty() {
            return None;
        }
        let sx = self.bounds.width / frame_size.width;
        let sy = self.bounds.height / frame_size.height;
        let scale = match self.gravity {
            VideoGravity::Resize => return Some(Rect::from_size(self.bounds)),
            VideoGravity::ResizeAspect => sx.min(sy),
            VideoGravity::ResizeAspectFill => sx.max(sy),
        };
        let width = frame_size.width * scale;
        let height = frame_size.height * scale;
        Some(Rect::new(
            (self.bounds.width - width) / 2.0,
            (self.bounds.height - height) / 2.0,
            width,
            height,
        ))
    }

    /// Portion of a frame that ends up visible, in frame coordinates
    pub fn visible_frame_rect(&self, frame_size: Size) -> Option<Rect> {
        let video = self.video_rect(frame_size)?;
        let shown = video.intersection(&Rect::from_size(self.bounds))?;
        let sx = frame_size.width / video.size.width;
        let sy = frame_size.height / video.size.height;
        Some(Rect::new(
            (shown.origin.x - video.origin.x) * sx,
            (shown.origin.y - video.origin.y) * sy,
            shown.size.width * sx,
            shown.size.height * sy,
        ))
    }

    /// Map a point in frame coordinates into layer coordinates
    pub fn layer_point(&self, frame_size: Size, point: Point) -> Option<Point> {
        let video = self.video_rect(frame_size)?;
        Some(
            point
                .scale(
                    video.size.width / frame_size.width,
                    video.size.height / frame_size.height,
                )
                .translate(video.origin.x, video.origin.y),
        )
    }

    /// Draw `frame` into an image the size of the bounds.
    ///
    /// `None` while the layer has no area.
    pub fn render(&self, frame: &Frame) -> Option<RgbImage> {
        let out_w = self.bounds.width.round() as u32;
        let out_h = self.bounds.height.round() as u32;
        if out_w == 0 || out_h == 0 {
            return None;
        }
        let source = frame.to_rgb_image();

        match self.gravity {
            VideoGravity::Resize => Some(imageops::resize(
                &source,
                out_w,
                out_h,
                FilterType::Triangle,
            )),
            VideoGravity::ResizeAspectFill => {
                let crop = self.visible_frame_rect(frame.size())?;
                let (x, y, w, h) = pixel_rect(crop, source.width(), source.height());
                let cropped = imageops::crop_imm(&source, x, y, w, h).to_image();
                Some(imageops::resize(&cropped, out_w, out_h, FilterType::Triangle))
            }
            VideoGravity::ResizeAspect => {
                let video = self.video_rect(frame.size())?;
                let w = (video.size.width.round() as u32).max(1);
                let h = (video.size.height.round() as u32).max(1);
                let scaled = imageops::resize(&source, w, h, FilterType::Triangle);
                let mut canvas = RgbImage::new(out_w, out_h);
                imageops::overlay(
                    &mut canvas,
                    &scaled,
                    video.origin.x.round() as i64,
                    video.origin.y.round() as i64,
                );
                Some(canvas)
            }
        }
    }
}

impl Default for PreviewLayer {
    fn default() -> Self {
        Self::new(VideoGravity::default())
    }
}

/// Round a frame-space rect to whole pixels inside a `width` x `height` image
fn pixel_rect(rect: Rect, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let x = (rect.origin.x.round().max(0.0) as u32).min(width.saturating_sub(1));
    let y = (rect.origin.y.round().max(0.0) as u32).min(height.saturating_sub(1));
    let w = (rect.size.width.round() as u32).clamp(1, width - x);
    let h = (rect.size.height.round() as u32).clamp(1, height - y);
    (x, y, w, h)
}
