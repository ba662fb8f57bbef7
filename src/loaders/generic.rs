//! Generic loader for uncategorized assets
//!
//! Small payloads are buffered as in-memory blobs; anything above the
//! threshold stays un-buffered and is represented by a URL reference. The size
//! hint from the directory listing short-circuits the fetch for large assets.

use crate::asset::{AssetDescriptor, Payload};
use crate::error::Result;
use crate::fetch::FetchClient;

pub async fn load<F: FetchClient>(
    fetcher: &F,
    descriptor: &AssetDescriptor,
    url: &str,
    blob_threshold: usize,
) -> Result<Payload> {
    // A declared size over the threshold skips buffering the body entirely.
    if let Some(size) = descriptor.size {
        if size as usize > blob_threshold {
            log::debug!(
                "asset {} declared {size} bytes, keeping as reference",
                descriptor.id
            );
            return Ok(Payload::Reference {
                url: url.to_string(),
            });
        }
    }

    let body = fetcher.fetch(url).await?.success_body()?;
    if body.len() > blob_threshold {
        Ok(Payload::Reference {
            url: url.to_string(),
        })
    } else {
        Ok(Payload::Blob(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetCategory;
    use crate::fetch::{MockFetcher, MockResponse};

    fn descriptor(id: &str) -> AssetDescriptor {
        AssetDescriptor::new(id, AssetCategory::Other, format!("{id}.dat"), "dat")
    }

    #[tokio::test]
    async fn test_small_payload_becomes_blob() {
        let fetcher = MockFetcher::new().route("a.dat", MockResponse::Bytes(vec![1; 16]));
        let payload = load(&fetcher, &descriptor("a"), "http://host/a.dat", 1024)
            .await
            .unwrap();
        assert!(matches!(payload, Payload::Blob(ref b) if b.len() == 16));
    }

    #[tokio::test]
    async fn test_large_body_becomes_reference() {
        let fetcher = MockFetcher::new().route("b.dat", MockResponse::Bytes(vec![1; 64]));
        let payload = load(&fetcher, &descriptor("b"), "http://host/b.dat", 32)
            .await
            .unwrap();
        assert!(matches!(payload, Payload::Reference { .. }));
    }

    #[tokio::test]
    async fn test_declared_size_skips_fetch() {
        let fetcher = MockFetcher::new();
        let desc = descriptor("c").with_size(10_000_000);
        let payload = load(&fetcher, &desc, "http://host/c.dat", 1024 * 1024)
            .await
            .unwrap();
        assert!(matches!(payload, Payload::Reference { .. }));
        assert_eq!(fetcher.served_count(), 0);
    }
}
