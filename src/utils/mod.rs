//! Utility functions for captured frames
//!
//! - Grayscale conversion (RGB/RGBA to luminance) and channel reshaping
//! - Image directory discovery for replayed capture sources

pub mod grayscale;
pub mod images;
