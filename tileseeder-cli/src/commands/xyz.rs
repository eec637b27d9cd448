//! xyz command - seed tiles from a generic XYZ tile source.

use super::{cancel_on_ctrl_c, print_summary, CommonArgs};
use crate::error::CliError;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tileseeder::progress::{ConsoleProgress, ProgressReporter};
use tileseeder::render::{template_is_valid, ReqwestHttpClient, XyzTileRenderer};
use tileseeder::seeder::TileSeeder;
use tileseeder::walker::{MapBounds, TileWalk};

/// Arguments for the xyz command.
#[derive(Debug, Args)]
pub struct XyzArgs {
    /// The URL of the XYZ tile source. It must have {x}, {y} and {z} placeholders
    #[arg(long)]
    pub url: String,

    /// West edge of the bounding box, longitude degrees
    #[arg(long)]
    pub minx: f64,

    /// South edge of the bounding box, latitude degrees
    #[arg(long)]
    pub miny: f64,

    /// East edge of the bounding box, longitude degrees
    #[arg(long)]
    pub maxx: f64,

    /// North edge of the bounding box, latitude degrees
    #[arg(long)]
    pub maxy: f64,

    /// First zoom level to seed
    #[arg(long, default_value_t = 0)]
    pub min_zoom: u8,

    /// Last zoom level to seed
    #[arg(long, default_value_t = 19)]
    pub max_zoom: u8,

    #[command(flatten)]
    pub common: CommonArgs,
}

fn in_range(value: f64, min: f64, max: f64) -> bool {
    value >= min && value <= max
}

/// Rejects bounding boxes and zoom ranges the walker would have to guess at.
fn validate(args: &XyzArgs) -> Result<(), CliError> {
    if !template_is_valid(&args.url) {
        return Err(CliError::InvalidArguments(
            "--url must contain {x}, {y} and {z} placeholders".to_string(),
        ));
    }
    if !in_range(args.minx, -180.0, 180.0) {
        return Err(CliError::InvalidArguments(
            "minx not in range of [-180, 180]".to_string(),
        ));
    }
    if !in_range(args.maxx, -180.0, 180.0) {
        return Err(CliError::InvalidArguments(
            "maxx not in range of [-180, 180]".to_string(),
        ));
    }
    if !in_range(args.miny, -90.0, 90.0) {
        return Err(CliError::InvalidArguments(
            "miny not in range of [-90, 90]".to_string(),
        ));
    }
    if !in_range(args.maxy, -90.0, 90.0) {
        return Err(CliError::InvalidArguments(
            "maxy not in range of [-90, 90]".to_string(),
        ));
    }
    if args.minx > args.maxx {
        return Err(CliError::InvalidArguments(
            "Invalid BBOX: minx > maxx".to_string(),
        ));
    }
    if args.miny > args.maxy {
        return Err(CliError::InvalidArguments(
            "Invalid BBOX: miny > maxy".to_string(),
        ));
    }
    if args.max_zoom > tileseeder::coord::MAX_ZOOM {
        return Err(CliError::InvalidArguments(format!(
            "--max-zoom must be at most {}",
            tileseeder::coord::MAX_ZOOM
        )));
    }
    if args.min_zoom > args.max_zoom {
        return Err(CliError::InvalidArguments(
            "--min-zoom must not exceed --max-zoom".to_string(),
        ));
    }
    Ok(())
}

/// Run the xyz command.
pub async fn run(args: XyzArgs) -> Result<(), CliError> {
    validate(&args)?;
    let options = args.common.seeder_options()?;

    let http_client = ReqwestHttpClient::with_timeout(Duration::from_secs(args.common.timeout_secs))
        .map_err(CliError::HttpClient)?;
    let renderer = XyzTileRenderer::new(http_client, args.url.as_str());

    let bounds = MapBounds::new(args.minx, args.miny, args.maxx, args.maxy);
    let walk = TileWalk::xyz(bounds, args.min_zoom..=args.max_zoom);
    println!(
        "Seeding {} tiles at zoom {}-{} from {}",
        walk.count(),
        args.min_zoom,
        args.max_zoom,
        args.url
    );

    let seeder = TileSeeder::new(Arc::new(renderer), walk, options);
    let cancel = cancel_on_ctrl_c();
    let mut reporter = ConsoleProgress::default();
    let stats = seeder.run(|p| reporter.report(p), cancel).await;

    print_summary(&stats);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_args() -> XyzArgs {
        XyzArgs {
            url: "https://tiles.example.com/{z}/{x}/{y}.png".to_string(),
            minx: -10.0,
            miny: -10.0,
            maxx: 10.0,
            maxy: 10.0,
            min_zoom: 0,
            max_zoom: 6,
            common: CommonArgs {
                concurrency: 1,
                retries: 0,
                timeout_secs: 30,
                wait: false,
            },
        }
    }

    #[test]
    fn test_valid_arguments_pass() {
        assert!(validate(&valid_args()).is_ok());
    }

    #[test]
    fn test_template_without_placeholders_rejected() {
        let mut args = valid_args();
        args.url = "https://tiles.example.com/tile.png".to_string();
        assert!(validate(&args).is_err());
    }

    #[test]
    fn test_longitude_out_of_range_rejected() {
        let mut args = valid_args();
        args.minx = -190.0;
        assert!(validate(&args).is_err());
    }

    #[test]
    fn test_latitude_out_of_range_rejected() {
        let mut args = valid_args();
        args.maxy = 91.0;
        assert!(validate(&args).is_err());
    }

    #[test]
    fn test_inverted_bbox_rejected() {
        let mut args = valid_args();
        args.minx = 20.0;
        args.maxx = -20.0;
        assert!(validate(&args).is_err());
    }

    #[test]
    fn test_inverted_zoom_range_rejected() {
        let mut args = valid_args();
        args.min_zoom = 8;
        args.max_zoom = 4;
        assert!(validate(&args).is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut args = valid_args();
        args.common.concurrency = 0;
        assert!(args.common.seeder_options().is_err());
    }
}
