//! CLI error handling with user-friendly messages.
//!
//! Every error here is fatal: it is reported before the first tile is
//! attempted and makes the process exit with code 1. Per-tile failures
//! never reach this type; the seeder counts them and the run completes.

use std::fmt;
use tileseeder::mapagent::MapAgentError;
use tileseeder::render::RenderError;
use tileseeder::walker::WalkError;

/// Fatal startup errors.
#[derive(Debug)]
pub enum CliError {
    /// Invalid or out-of-range command line arguments
    InvalidArguments(String),
    /// The HTTP client could not be constructed
    HttpClient(RenderError),
    /// The backend rejected the runtime map lookup
    Backend(MapAgentError),
    /// The tile walk could not be planned
    Walk(WalkError),
}

impl CliError {
    /// Print the error, with extra help for specific cases.
    pub fn print(&self) {
        eprintln!("Error: {}", self);

        if let CliError::Backend(_) = self {
            eprintln!();
            eprintln!("Check that:");
            eprintln!("  1. The --mapagent URL points at a mapagent endpoint");
            eprintln!("  2. The --map resource id names a tiled map definition");
            eprintln!("  3. The credentials are allowed to read the resource");
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidArguments(msg) => write!(f, "{}", msg),
            CliError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Backend(e) => write!(f, "Failed to query the map backend: {}", e),
            CliError::Walk(e) => write!(f, "Cannot plan the tile walk: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::HttpClient(e) => Some(e),
            CliError::Backend(e) => Some(e),
            CliError::Walk(e) => Some(e),
            CliError::InvalidArguments(_) => None,
        }
    }
}

impl From<MapAgentError> for CliError {
    fn from(e: MapAgentError) -> Self {
        CliError::Backend(e)
    }
}

impl From<WalkError> for CliError {
    fn from(e: WalkError) -> Self {
        CliError::Walk(e)
    }
}
