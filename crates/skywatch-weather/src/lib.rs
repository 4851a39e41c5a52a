//! Weather aggregation for Skywatch
//!
//! Pulls current conditions and multi-period forecasts from NOAA or a
//! personal weather station, normalizes units into display-ready records,
//! and coordinates refreshes with a single-flight, force-supersede policy.

pub mod cache;
pub mod coordinator;
pub mod error;
pub mod forecast;
pub mod noaa;
pub mod staleness;
pub mod station;
pub mod types;
pub mod units;

pub use cache::SnapshotCache;
pub use coordinator::RefreshCoordinator;
pub use error::WeatherError;
pub use forecast::combine_day_night;
pub use noaa::NoaaClient;
pub use station::PersonalStationClient;
pub use types::*;
