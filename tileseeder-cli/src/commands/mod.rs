//! CLI command implementations.
//!
//! One module per subcommand, each with its argument definitions and a
//! `run` handler, plus the option and output plumbing both commands share.

pub mod mapguide;
pub mod xyz;

use clap::Args;
use std::io;
use tileseeder::progress::format_duration;
use tileseeder::seeder::{RunStats, SeederOptions};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Options shared by every seeding subcommand.
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Render requests allowed in flight at once
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Extra attempts per tile after the first failure
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    /// Per-tile request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Pause for ENTER before exiting
    #[arg(long, default_value_t = false)]
    pub wait: bool,
}

impl CommonArgs {
    pub fn seeder_options(&self) -> Result<SeederOptions, crate::error::CliError> {
        if self.concurrency == 0 {
            return Err(crate::error::CliError::InvalidArguments(
                "--concurrency must be at least 1".to_string(),
            ));
        }
        Ok(SeederOptions {
            concurrency: self.concurrency,
            max_retries: self.retries,
        })
    }
}

/// Returns a token that cancels when the user interrupts the process.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping after in-flight tiles");
            eprintln!("Interrupted, finishing in-flight tiles...");
            cancel.cancel();
        }
    });
    token
}

/// Prints the end-of-run summary lines.
pub fn print_summary(stats: &RunStats) {
    println!(
        "Rendered {} tiles in {}",
        stats.rendered,
        format_duration(stats.duration)
    );
    if stats.failed > 0 {
        println!("{} of {} tiles failed", stats.failed, stats.total);
    }
}

/// Blocks until the user presses ENTER.
pub fn wait_for_enter() {
    println!("Press ENTER to continue");
    let mut line = String::new();
    let _ = io::stdin().read_line(&mut line);
}
