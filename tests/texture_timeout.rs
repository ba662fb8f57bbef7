//! Scenario: a texture fetch that never responds is abandoned after the
//! timeout and counted as exactly one error.

use std::sync::Arc;
use std::time::Duration;

use studio_assets::{
    AssetCategory, AssetDescriptor, AssetEngine, AssetState, EngineConfig, MockFetcher,
    MockRenderer, MockResponse, Priority,
};

mod common;

#[tokio::test(start_paused = true)]
async fn hung_texture_fetch_times_out_into_error_state() {
    common::init_logs();
    let fetcher = MockFetcher::new().route("stuck.png", MockResponse::Hang);
    let engine = AssetEngine::new(
        EngineConfig {
            texture_timeout: Duration::from_secs(5),
            thumbnail_pool_size: Some(1),
            ..EngineConfig::default()
        },
        fetcher,
        Arc::new(MockRenderer::new()),
    );

    engine.queue_asset(
        AssetDescriptor::new("stuck", AssetCategory::Textures, "stuck.png", "png"),
        Priority::High,
    );
    engine.tick();
    assert_eq!(engine.get_asset_state("stuck"), AssetState::Loading);

    // Paused time fast-forwards through the 5s timeout.
    for _ in 0..1000 {
        if engine.get_asset_state("stuck") == AssetState::Error {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(engine.get_asset_state("stuck"), AssetState::Error);
    let stats = engine.get_stats();
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.cache_size_bytes, 0);
    assert_eq!(engine.current_loads(), 0);
    engine.destroy();
}
