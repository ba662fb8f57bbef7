//! Raw-bytes loader for models and audio
//!
//! No decoding happens at this layer; model parsing and audio decoding are the
//! renderer's concern once the bytes are cached.

use crate::asset::Payload;
use crate::error::Result;
use crate::fetch::FetchClient;

pub async fn load<F: FetchClient>(fetcher: &F, url: &str) -> Result<Payload> {
    let body = fetcher.fetch(url).await?.success_body()?;
    Ok(Payload::Bytes(body))
}
