//! MapGuide mapagent client.
//!
//! Talks to a mapagent endpoint to resolve everything a grid walk needs
//! before the first tile is requested: the map's extent, its base layer
//! groups, its finite display scales, and the meters-per-unit of its
//! coordinate system. The lookup goes through CREATERUNTIMEMAP requesting
//! the JSON rendering of the runtime map document.
//!
//! Failures here are fatal by design: a wrong resource identifier or an
//! unreachable backend aborts the run before any tile is attempted.

use crate::render::{AsyncHttpClient, RenderError};
use crate::walker::MapBounds;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// CLIENTAGENT value sent with every mapagent operation.
const CLIENT_AGENT: &str = "tileseeder";

/// Errors talking to the mapagent before any tile is rendered.
#[derive(Debug, Error)]
pub enum MapAgentError {
    /// The HTTP operation itself failed
    #[error("mapagent request failed: {0}")]
    Http(#[from] RenderError),

    /// The backend answered with something other than a runtime map
    #[error("unexpected mapagent response: {0}")]
    InvalidResponse(String),
}

/// Endpoint and credentials for one mapagent.
///
/// Cloneable and immutable; shared between the lookup client and the tile
/// renderer.
#[derive(Debug, Clone)]
pub struct MapAgentConnection {
    base_url: String,
    username: String,
    password: String,
}

impl MapAgentConnection {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Builds the URL for one mapagent operation with query encoding.
    pub(crate) fn operation_url(
        &self,
        operation: &str,
        version: &str,
        params: &[(&str, &str)],
    ) -> String {
        let mut url = format!(
            "{}?OPERATION={}&VERSION={}&CLIENTAGENT={}&USERNAME={}&PASSWORD={}",
            self.base_url,
            operation,
            version,
            CLIENT_AGENT,
            encode_query_value(&self.username),
            encode_query_value(&self.password),
        );
        for (name, value) in params {
            url.push('&');
            url.push_str(name);
            url.push('=');
            url.push_str(&encode_query_value(value));
        }
        url
    }
}

/// Percent-encodes a query string value (RFC 3986 unreserved set).
fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{:02X}", byte));
            }
        }
    }
    out
}

/// Everything the runtime map lookup resolves about a tiled map.
#[derive(Debug, Clone)]
pub struct RuntimeMapInfo {
    pub name: String,
    /// Full extent in map units
    pub extent: MapBounds,
    /// Meters-per-unit of the map's coordinate system, when reported
    pub meters_per_unit: Option<f64>,
    /// Base layer group names, in map order
    pub base_groups: Vec<String>,
    /// Finite display scale denominators, ascending index order
    pub finite_scales: Vec<f64>,
}

/// Client for mapagent lookup operations.
pub struct MapAgentClient<C> {
    connection: MapAgentConnection,
    http_client: C,
}

impl<C: AsyncHttpClient> MapAgentClient<C> {
    pub fn new(connection: MapAgentConnection, http_client: C) -> Self {
        Self {
            connection,
            http_client,
        }
    }

    /// Creates a runtime map for the resource and returns its tiling
    /// parameters.
    ///
    /// This is also the meters-per-unit inference path: the runtime map
    /// document reports the coordinate system's meters-per-unit, so
    /// callers that were not given the value on the command line obtain it
    /// here.
    pub async fn create_runtime_map(
        &self,
        resource_id: &str,
    ) -> Result<RuntimeMapInfo, MapAgentError> {
        let url = self.connection.operation_url(
            "CREATERUNTIMEMAP",
            "3.0.0",
            &[
                ("MAPDEFINITION", resource_id),
                ("REQUESTEDFEATURES", "0"),
                ("FORMAT", "application/json"),
                ("CLEAN", "1"),
            ],
        );

        debug!(resource = resource_id, "creating runtime map");
        let response = self.http_client.get(&url).await?;

        let envelope: RuntimeMapEnvelope = serde_json::from_slice(&response.bytes)
            .map_err(|e| MapAgentError::InvalidResponse(e.to_string()))?;
        let info = envelope.runtime_map.into_info()?;

        info!(
            map = info.name,
            groups = info.base_groups.len(),
            scales = info.finite_scales.len(),
            "runtime map resolved"
        );
        Ok(info)
    }
}

// Wire documents for the JSON rendering of RUNTIMEMAP. Parsing is tolerant
// of absent optional members; only the extent is indispensable.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RuntimeMapEnvelope {
    runtime_map: RuntimeMapDoc,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RuntimeMapDoc {
    name: Option<String>,
    extents: Option<ExtentsDoc>,
    coordinate_system: Option<CoordinateSystemDoc>,
    #[serde(default)]
    group: Vec<GroupDoc>,
    #[serde(default)]
    finite_display_scale: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ExtentsDoc {
    lower_left_coordinate: CoordinateDoc,
    upper_right_coordinate: CoordinateDoc,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CoordinateDoc {
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CoordinateSystemDoc {
    meters_per_unit: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GroupDoc {
    name: String,
    #[serde(rename = "Type")]
    kind: Option<i32>,
}

/// Runtime map group types that take part in tiling.
const GROUP_TYPE_BASE_MAP: i32 = 2;
const GROUP_TYPE_BASE_MAP_FROM_TILE_SET: i32 = 3;

impl RuntimeMapDoc {
    fn into_info(self) -> Result<RuntimeMapInfo, MapAgentError> {
        let extents = self
            .extents
            .ok_or_else(|| MapAgentError::InvalidResponse("missing Extents".to_string()))?;
        let extent = MapBounds::new(
            extents.lower_left_coordinate.x,
            extents.lower_left_coordinate.y,
            extents.upper_right_coordinate.x,
            extents.upper_right_coordinate.y,
        );
        if extent.is_inverted() {
            return Err(MapAgentError::InvalidResponse(format!(
                "inverted extent {:?}",
                extent
            )));
        }

        let base_groups = self
            .group
            .into_iter()
            .filter(|g| {
                matches!(
                    g.kind,
                    None | Some(GROUP_TYPE_BASE_MAP) | Some(GROUP_TYPE_BASE_MAP_FROM_TILE_SET)
                )
            })
            .map(|g| g.name)
            .collect();

        Ok(RuntimeMapInfo {
            name: self.name.unwrap_or_default(),
            extent,
            meters_per_unit: self.coordinate_system.and_then(|cs| cs.meters_per_unit),
            base_groups,
            finite_scales: self.finite_display_scale,
        })
    }
}
