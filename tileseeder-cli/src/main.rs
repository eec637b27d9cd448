//! tileseeder CLI - batch tile seeding front-end
//!
//! Walks a map's tile grid and requests every tile from the configured
//! backend so its cache is warm before users arrive. Per-tile failures are
//! counted and reported but never abort the run; only startup problems
//! (bad arguments, unreachable backend, invalid resource) exit non-zero.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use std::process;
use tileseeder::logging::{default_log_dir, default_log_file, init_logging};

#[derive(Parser)]
#[command(name = "tileseeder")]
#[command(version = tileseeder::VERSION)]
#[command(about = "Pre-render and cache map tiles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed tiles from a generic XYZ tile source
    Xyz(commands::xyz::XyzArgs),
    /// Seed tiles through a MapGuide mapagent
    Mapguide(commands::mapguide::MapGuideArgs),
}

#[tokio::main]
async fn main() {
    // Bad arguments are a fatal startup error: exit 1, like every other
    // pre-run failure
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let is_error = e.use_stderr();
            let _ = e.print();
            process::exit(if is_error { 1 } else { 0 });
        }
    };

    // Keep going without a log file rather than refusing to run
    let _logging_guard = match init_logging(default_log_dir(), default_log_file()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: failed to initialize logging: {}", e);
            None
        }
    };

    let (result, wait) = match cli.command {
        Command::Xyz(args) => {
            let wait = args.common.wait;
            (commands::xyz::run(args).await, wait)
        }
        Command::Mapguide(args) => {
            let wait = args.common.wait;
            (commands::mapguide::run(args).await, wait)
        }
    };

    let code = match result {
        Ok(()) => 0,
        Err(e) => {
            e.print();
            1
        }
    };

    // The pause runs on the error path too, so a double-clicked console
    // window stays readable
    if wait {
        commands::wait_for_enter();
    }

    process::exit(code);
}
