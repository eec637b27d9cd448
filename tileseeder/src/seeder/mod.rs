//! Tile seeding engine.
//!
//! Drives a [`TileWalk`] through a [`TileRenderer`]: the walk's total is
//! computed up front, every address is rendered (with optional retries),
//! failures are counted and recorded without aborting the run, and the
//! progress callback receives a snapshot after each tile.
//!
//! The default mode is strictly sequential: one request in flight,
//! progress reported in walk order. With `concurrency > 1` a fixed-size
//! window of render tasks runs concurrently; the seeder remains the sole
//! owner of the counters and invokes the callback only from its own task,
//! so completions arriving out of walk order never race.

mod stats;

pub use stats::{RunStats, TileFailure};

use crate::coord::TileAddress;
use crate::progress::TileProgress;
use crate::render::{RenderError, TileRenderer};
use crate::walker::TileWalk;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Tuning for one seeding run.
#[derive(Debug, Clone)]
pub struct SeederOptions {
    /// Render requests allowed in flight at once; 1 = sequential
    pub concurrency: usize,
    /// Extra attempts per tile after the first failure
    pub max_retries: u32,
}

impl Default for SeederOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            max_retries: 0,
        }
    }
}

/// The seeding engine for one run.
pub struct TileSeeder<R> {
    renderer: Arc<R>,
    walk: TileWalk,
    options: SeederOptions,
}

impl<R: TileRenderer + 'static> TileSeeder<R> {
    pub fn new(renderer: Arc<R>, walk: TileWalk, options: SeederOptions) -> Self {
        Self {
            renderer,
            walk,
            options,
        }
    }

    /// Runs the walk to completion or cancellation, returning final stats.
    ///
    /// The callback is invoked exactly once per tile attempted, after that
    /// tile's outcome is counted. Cancellation stops issuing new renders as
    /// soon as it is observed; whatever was accumulated is returned, never
    /// an error.
    pub async fn run<F>(&self, mut progress: F, cancel: CancellationToken) -> RunStats
    where
        F: FnMut(TileProgress),
    {
        let total = self.walk.count();
        let mut stats = RunStats::new(total);
        let started = Instant::now();

        debug!(
            renderer = self.renderer.name(),
            total,
            concurrency = self.options.concurrency,
            "seeding run starting"
        );

        if self.options.concurrency > 1 {
            self.run_concurrent(&mut stats, &mut progress, &cancel).await;
        } else {
            self.run_sequential(&mut stats, &mut progress, &cancel).await;
        }

        stats.duration = started.elapsed();
        debug!(
            rendered = stats.rendered,
            failed = stats.failed,
            total = stats.total,
            cancelled = cancel.is_cancelled(),
            "seeding run finished"
        );
        stats
    }

    async fn run_sequential<F>(
        &self,
        stats: &mut RunStats,
        progress: &mut F,
        cancel: &CancellationToken,
    ) where
        F: FnMut(TileProgress),
    {
        for tile in self.walk.iter() {
            if cancel.is_cancelled() {
                debug!(attempted = stats.attempted(), "run cancelled");
                break;
            }

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!(attempted = stats.attempted(), "run cancelled mid-render");
                    break;
                }

                result = render_with_retries(
                    self.renderer.as_ref(),
                    &tile,
                    self.options.max_retries,
                    cancel,
                ) => {
                    self.settle(tile, result, stats, progress);
                }
            }
        }
    }

    async fn run_concurrent<F>(
        &self,
        stats: &mut RunStats,
        progress: &mut F,
        cancel: &CancellationToken,
    ) where
        F: FnMut(TileProgress),
    {
        let mut pending = self.walk.iter();
        let mut in_flight: JoinSet<(TileAddress, Result<Vec<u8>, RenderError>)> = JoinSet::new();

        loop {
            // Keep the window full while there is work and no stop signal
            while in_flight.len() < self.options.concurrency && !cancel.is_cancelled() {
                let Some(tile) = pending.next() else { break };
                let renderer = Arc::clone(&self.renderer);
                let max_retries = self.options.max_retries;
                let token = cancel.clone();
                in_flight.spawn(async move {
                    let result =
                        render_with_retries(renderer.as_ref(), &tile, max_retries, &token).await;
                    (tile, result)
                });
            }

            if in_flight.is_empty() {
                break;
            }

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!(
                        attempted = stats.attempted(),
                        in_flight = in_flight.len(),
                        "run cancelled, aborting in-flight renders"
                    );
                    in_flight.abort_all();
                    break;
                }

                joined = in_flight.join_next() => {
                    match joined {
                        Some(Ok((tile, result))) => {
                            self.settle(tile, result, stats, progress);
                        }
                        Some(Err(join_err)) => {
                            if !join_err.is_cancelled() {
                                warn!(error = %join_err, "render task panicked");
                            }
                        }
                        None => {}
                    }
                }
            }
        }
    }

    /// Folds one tile's outcome into the stats and fires the callback.
    fn settle<F>(
        &self,
        tile: TileAddress,
        result: Result<Vec<u8>, RenderError>,
        stats: &mut RunStats,
        progress: &mut F,
    ) where
        F: FnMut(TileProgress),
    {
        match result {
            Ok(_) => stats.record_success(),
            Err(err) => {
                warn!(tile = %tile, error = %err, "tile render failed");
                stats.record_failure(tile, err.to_string());
            }
        }
        progress(TileProgress {
            rendered: stats.attempted(),
            total: stats.total,
        });
    }
}

/// Renders one tile, retrying failures up to `max_retries` extra attempts.
///
/// Retries stop early once cancellation is observed; the last error is
/// returned so the tile is settled as failed rather than lost.
async fn render_with_retries<R: TileRenderer>(
    renderer: &R,
    tile: &TileAddress,
    max_retries: u32,
    cancel: &CancellationToken,
) -> Result<Vec<u8>, RenderError> {
    let mut attempt = 0;
    loop {
        match renderer.render(tile).await {
            Ok(bytes) => return Ok(bytes),
            Err(err) => {
                if attempt >= max_retries || cancel.is_cancelled() {
                    return Err(err);
                }
                attempt += 1;
                debug!(tile = %tile, attempt, error = %err, "retrying tile render");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::MapBounds;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Renderer whose outcome is scripted per call index (1-based).
    struct ScriptedRenderer {
        calls: AtomicU32,
        fail_calls: Vec<u32>,
    }

    impl ScriptedRenderer {
        fn ok() -> Self {
            Self::failing_on(Vec::new())
        }

        fn failing_on(fail_calls: Vec<u32>) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_calls,
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TileRenderer for ScriptedRenderer {
        async fn render(&self, _tile: &TileAddress) -> Result<Vec<u8>, RenderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_calls.contains(&call) {
                Err(RenderError::Server {
                    status: 500,
                    message: "scripted failure".to_string(),
                })
            } else {
                Ok(vec![0])
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn five_tile_walk() -> TileWalk {
        // 1 tile at zoom 0, 4 at zoom 1
        TileWalk::xyz(MapBounds::new(-10.0, -10.0, 10.0, 10.0), 0..=1)
    }

    #[tokio::test]
    async fn test_sequential_run_counts_every_tile() {
        let seeder = TileSeeder::new(
            Arc::new(ScriptedRenderer::ok()),
            five_tile_walk(),
            SeederOptions::default(),
        );
        let stats = seeder.run(|_| {}, CancellationToken::new()).await;

        assert_eq!(stats.rendered, 5);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.total, 5);
        assert!(stats.is_complete_success());
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_run() {
        let seeder = TileSeeder::new(
            Arc::new(ScriptedRenderer::failing_on(vec![2])),
            five_tile_walk(),
            SeederOptions::default(),
        );
        let stats = seeder.run(|_| {}, CancellationToken::new()).await;

        assert_eq!(stats.rendered, 4);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.attempted(), stats.total);
        assert_eq!(stats.failures.len(), 1);
        assert!(stats.failures[0].error.contains("500"));
    }

    #[tokio::test]
    async fn test_retry_turns_transient_failure_into_success() {
        // Second call fails once; with one retry the tile still renders
        let renderer = Arc::new(ScriptedRenderer::failing_on(vec![2]));
        let seeder = TileSeeder::new(
            Arc::clone(&renderer),
            five_tile_walk(),
            SeederOptions {
                concurrency: 1,
                max_retries: 1,
            },
        );
        let stats = seeder.run(|_| {}, CancellationToken::new()).await;

        assert_eq!(stats.rendered, 5);
        assert_eq!(stats.failed, 0);
        assert_eq!(renderer.call_count(), 6);
    }

    #[tokio::test]
    async fn test_empty_walk_returns_empty_stats() {
        let walk = TileWalk::xyz(MapBounds::new(10.0, 0.0, -10.0, 1.0), 0..=3);
        let seeder = TileSeeder::new(
            Arc::new(ScriptedRenderer::ok()),
            walk,
            SeederOptions::default(),
        );

        let mut snapshots = 0;
        let stats = seeder.run(|_| snapshots += 1, CancellationToken::new()).await;

        assert_eq!(stats.total, 0);
        assert_eq!(stats.attempted(), 0);
        assert_eq!(snapshots, 0);
    }

    #[tokio::test]
    async fn test_cancellation_before_start_attempts_nothing() {
        let renderer = Arc::new(ScriptedRenderer::ok());
        let seeder = TileSeeder::new(
            Arc::clone(&renderer),
            five_tile_walk(),
            SeederOptions::default(),
        );

        let cancel = CancellationToken::new();
        cancel.cancel();
        let stats = seeder.run(|_| {}, cancel).await;

        assert_eq!(stats.attempted(), 0);
        assert_eq!(renderer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_run_counts_every_tile() {
        let seeder = TileSeeder::new(
            Arc::new(ScriptedRenderer::failing_on(vec![3])),
            five_tile_walk(),
            SeederOptions {
                concurrency: 4,
                max_retries: 0,
            },
        );

        let mut snapshots = Vec::new();
        let stats = seeder
            .run(|p| snapshots.push(p), CancellationToken::new())
            .await;

        assert_eq!(stats.rendered, 4);
        assert_eq!(stats.failed, 1);
        assert_eq!(snapshots.len(), 5);
        // Processed counts are monotonically non-decreasing per snapshot
        assert!(snapshots.windows(2).all(|w| w[0].rendered <= w[1].rendered));
        assert_eq!(snapshots.last().unwrap().rendered, 5);
    }
}
