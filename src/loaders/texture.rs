//! Texture loader: fetch + decode to an RGBA8 bitmap
//!
//! The only loader with a bounded wait: the whole fetch+decode is abandoned
//! after the configured timeout. The in-flight fetch is not cancelled, its
//! result is simply ignored.

use std::time::Duration;

use image::ImageFormat;

use crate::asset::{Payload, Texture};
use crate::error::{AssetError, Result};
use crate::fetch::FetchClient;

/// Fetch a texture URL and decode it into an RGBA8 [`Texture`].
pub async fn load<F: FetchClient>(
    fetcher: &F,
    url: &str,
    timeout: Duration,
) -> Result<Payload> {
    let fetch_and_decode = async {
        let body = fetcher.fetch(url).await?.success_body()?;
        decode(&body)
    };

    match tokio::time::timeout(timeout, fetch_and_decode).await {
        Ok(result) => result,
        Err(_) => Err(AssetError::Timeout { after: timeout }),
    }
}

/// Decode image bytes into an RGBA8 texture. JPEG and PNG only.
pub fn decode(data: &[u8]) -> Result<Payload> {
    let format = image::guess_format(data).map_err(|e| AssetError::Decode(e.to_string()))?;

    match format {
        ImageFormat::Jpeg | ImageFormat::Png => {}
        _ => {
            return Err(AssetError::UnsupportedFormat(format!(
                "only JPG/JPEG and PNG textures are supported, got {:?}",
                format.extensions_str()
            )))
        }
    }

    let img = image::load_from_memory_with_format(data, format)
        .map_err(|e| AssetError::Decode(e.to_string()))?;

    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(Payload::Bitmap(Texture {
        width,
        height,
        data: rgba.into_raw(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{MockFetcher, MockResponse};

    fn png_bytes() -> Vec<u8> {
        let mut img = image::RgbaImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        let mut data = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut data), ImageFormat::Png)
            .expect("failed to encode test image");
        data
    }

    #[test]
    fn test_decode_png() {
        match decode(&png_bytes()).unwrap() {
            Payload::Bitmap(tex) => {
                assert_eq!(tex.width, 2);
                assert_eq!(tex.height, 2);
                assert_eq!(tex.data.len(), 16);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            decode(&[0, 1, 2, 3]),
            Err(AssetError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_unsupported_format() {
        let mut img = image::RgbaImage::new(1, 1);
        img.put_pixel(0, 0, image::Rgba([0, 0, 0, 255]));
        let mut data = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut data), ImageFormat::Bmp)
            .unwrap();

        assert!(matches!(
            decode(&data),
            Err(AssetError::UnsupportedFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_load_decodes_over_fetch() {
        let fetcher = MockFetcher::new().route("t.png", MockResponse::Bytes(png_bytes()));
        let payload = load(&fetcher, "http://host/t.png", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(matches!(payload, Payload::Bitmap(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_times_out() {
        let fetcher = MockFetcher::new().route("slow.png", MockResponse::Hang);
        let result = load(&fetcher, "http://host/slow.png", Duration::from_secs(5)).await;
        assert!(matches!(result, Err(AssetError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_load_surfaces_http_error() {
        let fetcher = MockFetcher::new().route("gone.png", MockResponse::Status(410, "Gone"));
        let result = load(&fetcher, "http://host/gone.png", Duration::from_secs(5)).await;
        assert!(matches!(
            result,
            Err(AssetError::Network { status: 410, .. })
        ));
    }
}
