//! mapguide command - seed tiles through a MapGuide mapagent.
//!
//! Resolves the map's extent, base layer groups, finite scales and (when
//! not supplied) meters-per-unit via CREATERUNTIMEMAP, then walks the
//! grid and renders every tile through GETTILEIMAGE.

use super::{cancel_on_ctrl_c, print_summary, CommonArgs};
use crate::error::CliError;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tileseeder::mapagent::{MapAgentClient, MapAgentConnection};
use tileseeder::progress::{ConsoleProgress, ProgressReporter};
use tileseeder::render::{MapAgentTileRenderer, ReqwestHttpClient};
use tileseeder::seeder::TileSeeder;
use tileseeder::walker::{GridScheme, GridWalkRequest, MapBounds, TileWalk};

/// Arguments for the mapguide command.
#[derive(Debug, Args)]
pub struct MapGuideArgs {
    /// The mapagent endpoint URL
    #[arg(short = 'm', long)]
    pub mapagent: String,

    /// The resource id of the tiled map definition to seed
    #[arg(long)]
    pub map: String,

    /// A list of base layer groups to seed. If not specified, all base
    /// layer groups of the specified map are seeded
    #[arg(long, num_args = 1..)]
    pub groups: Vec<String>,

    /// The MapGuide username
    #[arg(short = 'u', long, default_value = "Anonymous")]
    pub username: String,

    /// The password of the specified MapGuide user
    #[arg(long, default_value = "")]
    pub password: String,

    /// The meters per unit value. Inferred from the backend when omitted
    #[arg(long)]
    pub meters_per_unit: Option<f64>,

    /// West edge of the bounding box override, map units
    #[arg(long, requires = "miny")]
    pub minx: Option<f64>,

    /// South edge of the bounding box override, map units
    #[arg(long, requires = "maxx")]
    pub miny: Option<f64>,

    /// East edge of the bounding box override, map units
    #[arg(long, requires = "maxy")]
    pub maxx: Option<f64>,

    /// North edge of the bounding box override, map units
    #[arg(long, requires = "minx")]
    pub maxy: Option<f64>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Assembles the bbox override, rejecting inverted boxes up front.
fn bounds_override(args: &MapGuideArgs) -> Result<Option<MapBounds>, CliError> {
    match (args.minx, args.miny, args.maxx, args.maxy) {
        (Some(min_x), Some(min_y), Some(max_x), Some(max_y)) => {
            if min_x > max_x {
                return Err(CliError::InvalidArguments(
                    "Invalid BBOX: minx > maxx".to_string(),
                ));
            }
            if min_y > max_y {
                return Err(CliError::InvalidArguments(
                    "Invalid BBOX: miny > maxy".to_string(),
                ));
            }
            Ok(Some(MapBounds::new(min_x, min_y, max_x, max_y)))
        }
        (None, None, None, None) => Ok(None),
        // clap's `requires` ring enforces all-or-none before we get here
        _ => Err(CliError::InvalidArguments(
            "bounding box override needs all of --minx --miny --maxx --maxy".to_string(),
        )),
    }
}

/// Run the mapguide command.
pub async fn run(args: MapGuideArgs) -> Result<(), CliError> {
    let bounds = bounds_override(&args)?;
    let options = args.common.seeder_options()?;

    let http_client = ReqwestHttpClient::with_timeout(Duration::from_secs(args.common.timeout_secs))
        .map_err(CliError::HttpClient)?;
    let connection = MapAgentConnection::new(
        args.mapagent.as_str(),
        args.username.as_str(),
        args.password.as_str(),
    );

    // Fatal on any backend problem: nothing has been attempted yet
    let lookup = MapAgentClient::new(connection.clone(), http_client.clone());
    let info = lookup.create_runtime_map(&args.map).await?;

    let meters_per_unit = match args.meters_per_unit {
        Some(value) => value,
        None => {
            println!("Using CREATERUNTIMEMAP to obtain required meters-per-unit value");
            let value = info.meters_per_unit.ok_or_else(|| {
                CliError::InvalidArguments(
                    "the backend did not report meters-per-unit; pass --meters-per-unit"
                        .to_string(),
                )
            })?;
            println!("Using meters-per-unit value of: {}", value);
            value
        }
    };

    let scheme = GridScheme::new(
        info.extent,
        meters_per_unit,
        info.finite_scales,
        info.base_groups,
    );
    let request = GridWalkRequest {
        bounds,
        groups: args.groups,
    };
    let walk = TileWalk::grid(&scheme, &request)?;
    println!("Seeding {} tiles of {}", walk.count(), args.map);

    let renderer = MapAgentTileRenderer::new(connection, http_client, args.map.as_str());
    let seeder = TileSeeder::new(Arc::new(renderer), walk, options);
    let cancel = cancel_on_ctrl_c();
    let mut reporter = ConsoleProgress::default();
    let stats = seeder.run(|p| reporter.report(p), cancel).await;

    print_summary(&stats);
    Ok(())
}
