//! Pixel format conversion for captured frames.
//!
//! Y = 0.299*R + 0.587*G + 0.114*B, computed with integer arithmetic:
//! Y = (76*R + 150*G + 29*B) >> 8
//!
//! Frames at or above [`PARALLEL_PIXEL_THRESHOLD`] are converted row by row
//! on the rayon pool, smaller ones on the calling thread.
//!
//! The luma conversions back [`Frame::to_luma`](crate::Frame::to_luma) for
//! recognizer implementations; RGB expansion backs preview rendering.

use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

/// Frames with at least this many pixels are converted in parallel (VGA)
pub const PARALLEL_PIXEL_THRESHOLD: usize = 640 * 480;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

fn interleaved_to_luma(src: &[u8], width: usize, height: usize, channels: usize) -> Vec<u8> {
    let pixel_count = width * height;
    let mut gray = vec![0u8; pixel_count];
    if pixel_count == 0 {
        return gray;
    }

    let convert_row = |(y, row): (usize, &mut [u8])| {
        let row_start = y * width * channels;
        let src_row = &src[row_start..row_start + width * channels];
        for (out, px) in row.iter_mut().zip(src_row.chunks_exact(channels)) {
            *out = luma(px[0], px[1], px[2]);
        }
    };

    if pixel_count >= PARALLEL_PIXEL_THRESHOLD {
        gray.par_chunks_mut(width).enumerate().for_each(convert_row);
    } else {
        gray.chunks_mut(width).enumerate().for_each(convert_row);
    }
    gray
}

/// Convert a tightly packed RGB buffer to grayscale
pub fn rgb_to_luma(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    interleaved_to_luma(rgb, width, height, 3)
}

/// Convert a tightly packed RGBA buffer to grayscale (ignores alpha channel)
pub fn rgba_to_luma(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    interleaved_to_luma(rgba, width, height, 4)
}

/// Drop the alpha channel of an RGBA buffer
pub fn rgba_to_rgb(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }
    rgb
}

/// Expand grayscale to RGB by replicating the luma channel
pub fn luma_to_rgb(gray: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(gray.len() * 3);
    for &v in gray {
        rgb.extend_from_slice(&[v, v, v]);
    }
    rgb
}
