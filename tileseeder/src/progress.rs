//! Run progress reporting.
//!
//! The seeder hands a [`TileProgress`] snapshot to its callback after every
//! tile; reporters are pure consumers that format those snapshots. The
//! console reporter prints the one-line-per-tile form the CLI promises.

use std::time::Duration;

/// Snapshot of a run's progress after one tile.
///
/// `rendered` counts tiles processed so far, successes and failures both,
/// so the final snapshot of a completed run always equals the walk total
/// even when some tiles failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileProgress {
    pub rendered: u64,
    pub total: u64,
}

impl TileProgress {
    /// Completion percentage, 0.0 for an empty walk.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.rendered as f64 / self.total as f64 * 100.0
        }
    }
}

/// Consumer of per-tile progress snapshots.
pub trait ProgressReporter {
    fn report(&mut self, progress: TileProgress);
}

/// Reporter printing one progress line per tile to stdout.
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn report(&mut self, progress: TileProgress) {
        println!("{}", format_progress_line(progress));
    }
}

/// Formats the per-tile progress line.
pub fn format_progress_line(progress: TileProgress) -> String {
    format!(
        "Rendered {} of {} tiles [{:.2}%]",
        progress.rendered,
        progress.total,
        progress.percent()
    )
}

/// Formats a run duration for the final summary line.
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    let hours = (total_secs / 3600.0) as u64;
    let minutes = ((total_secs % 3600.0) / 60.0) as u64;
    let seconds = total_secs % 60.0;

    if hours > 0 {
        format!("{}h {:02}m {:04.1}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {:04.1}s", minutes, seconds)
    } else {
        format!("{:.2}s", seconds)
    }
}
