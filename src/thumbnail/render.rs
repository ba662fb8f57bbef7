//! Thumbnail renderer capability
//!
//! The actual 3D rasterizer lives outside this crate; workers call whatever
//! [`ThumbnailRenderer`] the pool was constructed with. [`MockRenderer`]
//! produces deterministic placeholder tiles for tests and headless use.

use std::hash::{Hash, Hasher};

use image::{Rgba, RgbaImage};

use crate::error::{AssetError, Result};
use crate::thumbnail::RenderJob;

/// Edge length of generated placeholder thumbnails.
pub const THUMBNAIL_SIZE: u32 = 64;

/// Renders a model to a small raster image. Called on pool worker threads, so
/// implementations may block.
pub trait ThumbnailRenderer: Send + Sync + 'static {
    fn render(&self, job: &RenderJob) -> Result<RgbaImage>;
}

/// Deterministic placeholder renderer.
///
/// Produces a solid tile whose color is derived from the asset id, so tests
/// can assert that two requests for the same asset yield the same image.
#[derive(Debug, Clone, Default)]
pub struct MockRenderer {
    fail_with: Option<String>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A renderer whose every render fails with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
        }
    }
}

impl ThumbnailRenderer for MockRenderer {
    fn render(&self, job: &RenderJob) -> Result<RgbaImage> {
        if let Some(message) = &self.fail_with {
            return Err(AssetError::Worker(message.clone()));
        }

        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        job.asset_id.hash(&mut hasher);
        let h = hasher.finish();
        let color = Rgba([(h >> 16) as u8, (h >> 8) as u8, h as u8, 255]);

        let mut img = RgbaImage::new(THUMBNAIL_SIZE, THUMBNAIL_SIZE);
        for pixel in img.pixels_mut() {
            *pixel = color;
        }
        Ok(img)
    }
}
