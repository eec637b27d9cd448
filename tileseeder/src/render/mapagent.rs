//! MapGuide mapagent tile renderer.
//!
//! Requests pre-rendered base map tiles through the mapagent GETTILEIMAGE
//! operation. Rendering a tile also seeds the backend's own tile cache,
//! which is the point of a seeding run; the returned bytes are discarded
//! by the caller.

use super::http::AsyncHttpClient;
use super::{RenderError, TileRenderer};
use crate::coord::TileAddress;
use crate::mapagent::MapAgentConnection;
use tracing::trace;

/// Tile renderer backed by a mapagent endpoint.
pub struct MapAgentTileRenderer<C> {
    connection: MapAgentConnection,
    http_client: C,
    resource_id: String,
}

impl<C: AsyncHttpClient> MapAgentTileRenderer<C> {
    /// Creates a renderer for one tiled map resource.
    pub fn new(
        connection: MapAgentConnection,
        http_client: C,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            connection,
            http_client,
            resource_id: resource_id.into(),
        }
    }

    fn build_url(&self, tile: &TileAddress, group: &str) -> String {
        let scale_index = tile.zoom.to_string();
        let col = tile.col.to_string();
        let row = tile.row.to_string();
        self.connection.operation_url(
            "GETTILEIMAGE",
            "1.2.0",
            &[
                ("MAPDEFINITION", self.resource_id.as_str()),
                ("BASEMAPLAYERGROUPNAME", group),
                ("SCALEINDEX", scale_index.as_str()),
                ("TILECOL", col.as_str()),
                ("TILEROW", row.as_str()),
            ],
        )
    }
}

impl<C: AsyncHttpClient> TileRenderer for MapAgentTileRenderer<C> {
    async fn render(&self, tile: &TileAddress) -> Result<Vec<u8>, RenderError> {
        let group = tile
            .group
            .as_deref()
            .ok_or_else(|| RenderError::Backend("tile address has no layer group".to_string()))?;

        let url = self.build_url(tile, group);
        trace!(tile = %tile, "requesting mapagent tile");
        let response = self.http_client.get(&url).await?;

        // The mapagent reports rendering errors as 2xx responses with an
        // XML body in place of the image.
        if !response.is_image() {
            return Err(RenderError::Backend(String::from_utf8_lossy(
                &response.bytes,
            )
            .trim()
            .to_string()));
        }

        Ok(response.bytes)
    }

    fn name(&self) -> &str {
        "mapagent"
    }
}
