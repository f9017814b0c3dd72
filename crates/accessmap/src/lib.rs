//! `accessmap` - barrier-free facility data service for Hong Kong
//!
//! This library stores and serves lifts, footbridges, zebra crossings, the
//! pedestrian network and popular destinations, together with
//! crowd-sourced accessibility notes, lift status reports and per-user saved
//! locations and route history. Route planning is left to an external
//! mapping service.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod geo;
pub mod logging;
pub mod model;
pub mod seed;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use geo::LatLng;
pub use logging::init_logging;
pub use storage::{Storage, StorageStats};
