//! Personal weather station client (Tempest-style REST API).
//!
//! Second upstream source, selected per refresh call. Produces the same
//! normalized snapshot shape as the NOAA path; credentials come from the
//! injected station config and their absence is a recoverable, named error.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use skywatch_core::StationConfig;

use crate::error::WeatherError;
use crate::types::ObservationSnapshot;
use crate::units;

const API_BASE: &str = "https://swd.weatherflow.com/swd/rest";
const USER_AGENT: &str = "skywatch/0.1 (github.com/skywatch)";
const REQUEST_TIMEOUT_SECS: u64 = 20;

pub struct PersonalStationClient {
    client: reqwest::Client,
    base_url: String,
    config: StationConfig,
}

impl PersonalStationClient {
    pub fn new(config: StationConfig) -> Result<Self, WeatherError> {
        Self::with_base_url(API_BASE, config)
    }

    /// Client pointed at an alternate base URL (used by tests).
    pub fn with_base_url(base_url: &str, config: StationConfig) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    /// Fetch the latest observation and normalize it to display units.
    #[instrument(skip(self), level = "info")]
    pub async fn latest_observation(&self) -> Result<ObservationSnapshot, WeatherError> {
        let station_id = self
            .config
            .station_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(WeatherError::MissingConfig("station.station_id"))?;
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(WeatherError::MissingConfig("station.api_key"))?;

        let url = format!(
            "{}/observations/station/{}?token={}",
            self.base_url, station_id, api_key
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Station observation request returned {}", status);
            return Err(WeatherError::BadStatus(status.as_u16()));
        }

        let payload: StationPayload = response
            .json()
            .await
            .map_err(|e| WeatherError::Decode(e.to_string()))?;

        let obs = payload
            .obs
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Decode("station returned no observations".to_string()))?;

        Ok(normalize(obs, payload.station_name))
    }
}

/// Station payloads are metric: °C, m/s, millibar.
fn normalize(obs: StationObservation, station_name: Option<String>) -> ObservationSnapshot {
    let wind_degrees = obs.wind_direction;
    ObservationSnapshot {
        temperature_f: obs.air_temperature.map(units::celsius_to_fahrenheit),
        humidity_percent: obs.relative_humidity,
        wind_speed_mph: obs.wind_avg.map(|v| units::speed_to_mph(v, "m_s-1")),
        wind_gust_mph: obs.wind_gust.map(|v| units::speed_to_mph(v, "m_s-1")),
        wind_compass: wind_degrees.map(|deg| units::degrees_to_compass(deg).to_string()),
        wind_degrees,
        pressure_inhg: obs
            .barometric_pressure
            .map(|mb| units::pascals_to_inches_mercury(mb * 100.0)),
        description: obs.conditions.unwrap_or_default(),
        station_id: None,
        station_name,
        captured_at: obs
            .timestamp
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(Utc::now),
    }
}

#[derive(Debug, Deserialize)]
struct StationPayload {
    #[serde(default)]
    station_name: Option<String>,
    #[serde(default)]
    obs: Vec<StationObservation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StationObservation {
    timestamp: Option<i64>,
    air_temperature: Option<f64>,
    relative_humidity: Option<f64>,
    wind_avg: Option<f64>,
    wind_gust: Option<f64>,
    wind_direction: Option<f64>,
    barometric_pressure: Option<f64>,
    conditions: Option<String>,
}
