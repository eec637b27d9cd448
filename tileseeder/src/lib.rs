//! tileseeder - Batch tile seeding for map tile services
//!
//! This library walks a map's tile grid across zoom levels and bounding
//! boxes, requests each tile from a tile-serving backend so the backend
//! renders and caches it, and reports per-tile progress plus final run
//! statistics. Two schemes are supported: geographic XYZ sources addressed
//! by a URL template, and MapGuide mapagent tile sets addressed by layer
//! group and finite scale index.
//!
//! # Example
//!
//! ```ignore
//! use tileseeder::render::{ReqwestHttpClient, XyzTileRenderer};
//! use tileseeder::seeder::{SeederOptions, TileSeeder};
//! use tileseeder::walker::{MapBounds, TileWalk};
//!
//! let walk = TileWalk::xyz(MapBounds::new(-10.0, -10.0, 10.0, 10.0), 0..=6);
//! let renderer = XyzTileRenderer::new(
//!     ReqwestHttpClient::new()?,
//!     "https://tile.example.com/{z}/{x}/{y}.png",
//! );
//! let seeder = TileSeeder::new(renderer.into(), walk, SeederOptions::default());
//! let stats = seeder.run(|p| println!("{}/{}", p.rendered, p.total), token).await;
//! ```

pub mod coord;
pub mod logging;
pub mod mapagent;
pub mod progress;
pub mod render;
pub mod seeder;
pub mod walker;

/// Version of the tileseeder library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
