//! XYZ URL template tile renderer.
//!
//! Renders tiles from any slippy-map style HTTP source by substituting the
//! `{x}`, `{y}` and `{z}` placeholders of a URL template, e.g.
//! `https://tile.example.com/{z}/{x}/{y}.png`.

use super::http::AsyncHttpClient;
use super::{RenderError, TileRenderer};
use crate::coord::TileAddress;
use tracing::trace;

/// Placeholders a template must contain, in no particular order.
pub const TEMPLATE_PLACEHOLDERS: [&str; 3] = ["{x}", "{y}", "{z}"];

/// Checks that a URL template carries all three tile placeholders.
pub fn template_is_valid(template: &str) -> bool {
    TEMPLATE_PLACEHOLDERS.iter().all(|p| template.contains(p))
}

/// Tile renderer for generic XYZ tile sources.
pub struct XyzTileRenderer<C> {
    http_client: C,
    template: String,
}

impl<C: AsyncHttpClient> XyzTileRenderer<C> {
    /// Creates a renderer for the given URL template.
    ///
    /// The template is taken as-is; callers validate it up front with
    /// [`template_is_valid`] so a bad template is a startup error, not a
    /// per-tile one.
    pub fn new(http_client: C, template: impl Into<String>) -> Self {
        Self {
            http_client,
            template: template.into(),
        }
    }

    fn build_url(&self, tile: &TileAddress) -> String {
        self.template
            .replace("{x}", &tile.col.to_string())
            .replace("{y}", &tile.row.to_string())
            .replace("{z}", &tile.zoom.to_string())
    }
}

impl<C: AsyncHttpClient> TileRenderer for XyzTileRenderer<C> {
    async fn render(&self, tile: &TileAddress) -> Result<Vec<u8>, RenderError> {
        let url = self.build_url(tile);
        trace!(tile = %tile, url = url, "requesting XYZ tile");
        let response = self.http_client.get(&url).await?;
        Ok(response.bytes)
    }

    fn name(&self) -> &str {
        "xyz"
    }
}
