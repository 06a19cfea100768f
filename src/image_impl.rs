//! Pixel dimensions of exported assets

use std::io::Cursor;
use std::path::Path;

use image::ImageReader;
use serde::{Deserialize, Serialize};

use crate::engine::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Read width and height from the image header without decoding pixels.
pub fn image_size<P: AsRef<Path>>(path: P) -> Result<ImageSize, EngineError> {
    let (width, height) = image::image_dimensions(path)?;
    Ok(ImageSize { width, height })
}

pub fn image_size_from_bytes(data: &[u8]) -> Result<ImageSize, EngineError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| EngineError::ImageError(e.to_string()))?;
    let (width, height) = reader.into_dimensions()?;
    Ok(ImageSize { width, height })
}
