//! Format-specific loaders
//!
//! Each loader fetches an asset's bytes through the injected [`FetchClient`]
//! and produces a decoded [`Payload`]. Dispatch is by asset category.

pub mod binary;
pub mod generic;
pub mod texture;

use std::time::Duration;

use crate::asset::{AssetCategory, AssetDescriptor, Payload};
use crate::error::Result;
use crate::fetch::FetchClient;

/// Tunables threaded down from the engine config.
#[derive(Debug, Clone, Copy)]
pub struct LoaderOptions {
    /// Texture loads are abandoned after this long.
    pub texture_timeout: Duration,
    /// Generic payloads at or below this many bytes are buffered in memory.
    pub blob_threshold: usize,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            texture_timeout: Duration::from_secs(5),
            blob_threshold: 1024 * 1024,
        }
    }
}

/// Fetch and decode one asset according to its category.
pub async fn dispatch<F: FetchClient>(
    fetcher: &F,
    descriptor: &AssetDescriptor,
    url: &str,
    options: &LoaderOptions,
) -> Result<Payload> {
    match descriptor.category {
        AssetCategory::Textures => texture::load(fetcher, url, options.texture_timeout).await,
        AssetCategory::Models3d | AssetCategory::Audio => binary::load(fetcher, url).await,
        AssetCategory::Other => {
            generic::load(fetcher, descriptor, url, options.blob_threshold).await
        }
    }
}
