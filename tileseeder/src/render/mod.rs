//! Tile render client abstraction
//!
//! This module provides the trait and implementations for obtaining one
//! rendered tile from a tile-serving backend: a generic XYZ URL template
//! source and the MapGuide mapagent tile API.

mod http;
mod mapagent;
mod xyz;

pub use http::{AsyncHttpClient, HttpResponse, ReqwestHttpClient, DEFAULT_TIMEOUT_SECS};
pub use mapagent::MapAgentTileRenderer;
pub use xyz::{template_is_valid, XyzTileRenderer, TEMPLATE_PLACEHOLDERS};

#[cfg(test)]
pub use http::tests::MockHttpClient;

use crate::coord::TileAddress;
use std::future::Future;
use thiserror::Error;

/// Failure rendering a single tile.
///
/// All variants are recoverable at the run level: the seeder counts the
/// tile as failed and moves on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// Transport-level failure (DNS, connection, protocol)
    #[error("network error: {0}")]
    Network(String),

    /// The per-tile request deadline elapsed
    #[error("request timed out")]
    Timeout,

    /// Non-success HTTP status from the tile source
    #[error("server returned HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// The backend answered but reported a rendering error
    #[error("backend error: {0}")]
    Backend(String),
}

/// Trait for tile render clients.
///
/// Implementors fetch the rendered image for one tile address. The payload
/// is opaque to the seeder, which only uses it to confirm completion.
/// Implementations hold no mutable state and may be shared across
/// concurrent workers.
pub trait TileRenderer: Send + Sync {
    /// Renders one tile, returning the raw image bytes.
    fn render(
        &self,
        tile: &TileAddress,
    ) -> impl Future<Output = Result<Vec<u8>, RenderError>> + Send;

    /// Returns the renderer's name for logging and identification.
    fn name(&self) -> &str;
}
