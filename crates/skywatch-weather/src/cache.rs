//! Single-slot persistence for the last successful observation snapshot.

use std::path::{Path, PathBuf};

use crate::error::WeatherError;
use crate::types::ObservationSnapshot;

const CACHE_FILE: &str = "snapshot_cache.json";

/// File-backed cache holding exactly one serialized snapshot.
///
/// Overwrite-only, no history. Only the refresh coordinator writes it;
/// readers get a point-in-time copy.
#[derive(Debug)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(CACHE_FILE),
        }
    }

    /// Overwrite the cached snapshot.
    pub fn save(&self, snapshot: &ObservationSnapshot) -> Result<(), WeatherError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| WeatherError::Cache(e.to_string()))?;
        }

        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| WeatherError::Cache(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| WeatherError::Cache(e.to_string()))?;

        tracing::debug!("Saved snapshot cache to {}", self.path.display());
        Ok(())
    }

    /// Load the cached snapshot, if a usable one exists.
    ///
    /// Fails soft: a missing file, unreadable file, or schema drift all
    /// yield `None`. An unusable cache is never fatal to startup.
    pub fn load(&self) -> Option<ObservationSnapshot> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!("No snapshot cache at {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::debug!("Discarding unreadable snapshot cache: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(temp: f64) -> ObservationSnapshot {
        ObservationSnapshot {
            temperature_f: Some(temp),
            humidity_percent: Some(55.0),
            wind_speed_mph: Some(8.0),
            wind_gust_mph: None,
            wind_compass: Some("NW".to_string()),
            wind_degrees: Some(315.0),
            pressure_inhg: Some(30.01),
            description: "Clear".to_string(),
            station_id: Some("KPHL".to_string()),
            station_name: None,
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());

        cache.save(&snapshot(72.5)).unwrap();
        let loaded = cache.load().unwrap();
        assert_eq!(loaded.temperature_f, Some(72.5));
        assert_eq!(loaded.station_id.as_deref(), Some("KPHL"));
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());
        assert!(cache.load().is_none());
    }

    #[test]
    fn corrupted_file_loads_as_none_and_does_not_block_saves() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());

        std::fs::write(dir.path().join(CACHE_FILE), b"{not json").unwrap();
        assert!(cache.load().is_none());

        cache.save(&snapshot(41.0)).unwrap();
        assert_eq!(cache.load().unwrap().temperature_f, Some(41.0));
    }

    #[test]
    fn incompatible_schema_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());

        std::fs::write(
            dir.path().join(CACHE_FILE),
            br#"{"version": 99, "payload": []}"#,
        )
        .unwrap();
        assert!(cache.load().is_none());
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());

        cache.save(&snapshot(10.0)).unwrap();
        cache.save(&snapshot(20.0)).unwrap();
        assert_eq!(cache.load().unwrap().temperature_f, Some(20.0));
    }
}
