//! Integration tests for the seeding engine.
//!
//! These tests drive the full walker → renderer → seeder → progress chain
//! with scripted renderers and a fake HTTP client, verifying:
//! - per-tile failures are counted without aborting the run
//! - the progress callback fires exactly once per tile, monotonically
//! - cancellation mid-run returns partial stats without error
//! - walk totals agree with what the seeder actually attempts

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use tileseeder::coord::TileAddress;
use tileseeder::progress::TileProgress;
use tileseeder::render::{
    AsyncHttpClient, HttpResponse, RenderError, TileRenderer, XyzTileRenderer,
};
use tileseeder::seeder::{SeederOptions, TileSeeder};
use tileseeder::walker::{GridScheme, GridWalkRequest, MapBounds, TileWalk};

// =============================================================================
// Test Helpers
// =============================================================================

/// Renderer that fails on scripted call indices (1-based) and otherwise
/// returns a tiny payload.
struct ScriptedRenderer {
    calls: AtomicU32,
    fail_calls: Vec<u32>,
}

impl ScriptedRenderer {
    fn new(fail_calls: Vec<u32>) -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail_calls,
        }
    }
}

impl TileRenderer for ScriptedRenderer {
    async fn render(&self, _tile: &TileAddress) -> Result<Vec<u8>, RenderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_calls.contains(&call) {
            Err(RenderError::Server {
                status: 503,
                message: "unavailable".to_string(),
            })
        } else {
            Ok(vec![1, 2, 3])
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Fake HTTP client recording requested URLs and always answering with a
/// one-byte image.
struct RecordingHttpClient {
    requests: Mutex<Vec<String>>,
}

impl RecordingHttpClient {
    fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl AsyncHttpClient for RecordingHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, RenderError> {
        self.requests.lock().unwrap().push(url.to_string());
        Ok(HttpResponse::new(
            vec![0xff],
            Some("image/png".to_string()),
        ))
    }
}

/// A clean ten-tile grid walk: 500x200 map units, 10px tiles at
/// 10 units/px, one group, one scale.
fn ten_tile_walk() -> TileWalk {
    let scheme = GridScheme {
        extent: MapBounds::new(0.0, 0.0, 500.0, 200.0),
        meters_per_unit: 0.0254,
        tile_width: 10,
        tile_height: 10,
        dpi: 100.0,
        finite_scales: vec![1000.0],
        groups: vec!["Base".to_string()],
    };
    TileWalk::grid(&scheme, &GridWalkRequest::default()).unwrap()
}

// =============================================================================
// Integration Tests
// =============================================================================

#[tokio::test]
async fn test_single_failure_among_ten_tiles() {
    let walk = ten_tile_walk();
    assert_eq!(walk.count(), 10);

    let seeder = TileSeeder::new(
        Arc::new(ScriptedRenderer::new(vec![3])),
        walk,
        SeederOptions::default(),
    );
    let stats = seeder.run(|_| {}, CancellationToken::new()).await;

    assert_eq!(stats.rendered, 9);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.total, 10);
    assert_eq!(stats.attempted(), 10);
    assert!(!stats.is_complete_success());
}

#[tokio::test]
async fn test_progress_fires_once_per_tile_monotonically() {
    let walk = ten_tile_walk();
    let seeder = TileSeeder::new(
        Arc::new(ScriptedRenderer::new(vec![2, 7])),
        walk,
        SeederOptions::default(),
    );

    let mut snapshots: Vec<TileProgress> = Vec::new();
    let stats = seeder
        .run(|p| snapshots.push(p), CancellationToken::new())
        .await;

    // Exactly one snapshot per tile attempted
    assert_eq!(snapshots.len(), 10);
    // Sequential processed counts: 1, 2, ..., 10 against a fixed total
    for (i, snapshot) in snapshots.iter().enumerate() {
        assert_eq!(snapshot.rendered, i as u64 + 1);
        assert_eq!(snapshot.total, 10);
    }
    // Final snapshot covers successes and failures both
    assert_eq!(
        snapshots.last().unwrap().rendered,
        stats.rendered + stats.failed
    );
}

#[tokio::test]
async fn test_cancellation_mid_run_returns_partial_stats() {
    let walk = ten_tile_walk();
    let seeder = TileSeeder::new(
        Arc::new(ScriptedRenderer::new(Vec::new())),
        walk,
        SeederOptions::default(),
    );

    let cancel = CancellationToken::new();
    let observer = cancel.clone();
    let stats = seeder
        .run(
            move |p| {
                // Interrupt after the fourth tile settles
                if p.rendered == 4 {
                    observer.cancel();
                }
            },
            cancel,
        )
        .await;

    assert_eq!(stats.attempted(), 4);
    assert!(stats.attempted() < stats.total);
    assert_eq!(stats.total, 10);
}

#[tokio::test]
async fn test_concurrent_mode_settles_every_tile() {
    let walk = ten_tile_walk();
    let seeder = TileSeeder::new(
        Arc::new(ScriptedRenderer::new(vec![5])),
        walk,
        SeederOptions {
            concurrency: 3,
            max_retries: 0,
        },
    );

    let mut snapshots: Vec<TileProgress> = Vec::new();
    let stats = seeder
        .run(|p| snapshots.push(p), CancellationToken::new())
        .await;

    assert_eq!(stats.attempted(), 10);
    assert_eq!(stats.rendered, 9);
    assert_eq!(stats.failed, 1);
    assert_eq!(snapshots.len(), 10);
    assert!(snapshots
        .windows(2)
        .all(|w| w[0].rendered <= w[1].rendered));
}

#[tokio::test]
async fn test_xyz_renderer_end_to_end() {
    // One world tile at zoom 0, the 2x2 quad at zoom 1
    let walk = TileWalk::xyz(MapBounds::new(-10.0, -10.0, 10.0, 10.0), 0..=1);
    assert_eq!(walk.count(), 5);

    let renderer = XyzTileRenderer::new(
        RecordingHttpClient::new(),
        "https://tiles.example.com/{z}/{x}/{y}.png",
    );
    let seeder = TileSeeder::new(Arc::new(renderer), walk, SeederOptions::default());
    let stats = seeder.run(|_| {}, CancellationToken::new()).await;

    assert_eq!(stats.rendered, 5);
    assert!(stats.is_complete_success());
    assert!(stats.duration.as_nanos() > 0);
}

#[tokio::test]
async fn test_empty_walk_completes_without_callbacks() {
    // Inverted box: empty walk, not an error
    let walk = TileWalk::xyz(MapBounds::new(10.0, -10.0, -10.0, 10.0), 0..=5);
    let seeder = TileSeeder::new(
        Arc::new(ScriptedRenderer::new(Vec::new())),
        walk,
        SeederOptions::default(),
    );

    let mut callbacks = 0;
    let stats = seeder
        .run(|_| callbacks += 1, CancellationToken::new())
        .await;

    assert_eq!(stats.total, 0);
    assert_eq!(stats.attempted(), 0);
    assert_eq!(callbacks, 0);
    assert!(stats.is_complete_success());
}
