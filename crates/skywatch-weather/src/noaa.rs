//! NOAA api.weather.gov client.
//!
//! Wraps the point → station → observation resolution chain plus the
//! forecast and active-alerts endpoints. Stateless request/response only;
//! orchestration and error classification live in the coordinator.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use crate::error::WeatherError;
use crate::types::{Coordinates, ObservationSnapshot, RawPeriod, WeatherAlert};
use crate::units;

const API_BASE: &str = "https://api.weather.gov";
const USER_AGENT: &str = "skywatch/0.1 (github.com/skywatch)";
const ACCEPT_GEOJSON: &str = "application/geo+json";
const REQUEST_TIMEOUT_SECS: u64 = 20;

pub struct NoaaClient {
    client: reqwest::Client,
    base_url: String,
}

impl NoaaClient {
    pub fn new() -> Result<Self, WeatherError> {
        Self::with_base_url(API_BASE)
    }

    /// Client pointed at an alternate base URL (used by tests).
    pub fn with_base_url(base_url: &str) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, WeatherError> {
        let response = self
            .client
            .get(url)
            .header("Accept", ACCEPT_GEOJSON)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("GET {} returned {}", url, status);
            return Err(WeatherError::BadStatus(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| WeatherError::Decode(e.to_string()))
    }

    /// Resolve a coordinate to its grid point metadata (forecast URL and
    /// observation-stations URL).
    #[instrument(skip(self), level = "info")]
    pub async fn point(&self, coord: Coordinates) -> Result<PointProperties, WeatherError> {
        let url = format!(
            "{}/points/{},{}",
            self.base_url, coord.latitude, coord.longitude
        );
        let point: Point = self.get_json(&url).await?;
        Ok(point.properties)
    }

    /// List observation stations for a grid point, nearest first.
    #[instrument(skip_all, level = "info")]
    pub async fn stations(&self, stations_url: &str) -> Result<Vec<StationProperties>, WeatherError> {
        let list: StationList = self.get_json(stations_url).await?;
        Ok(list.features.into_iter().map(|f| f.properties).collect())
    }

    /// Latest observation from a station.
    #[instrument(skip(self), level = "info")]
    pub async fn latest_observation(
        &self,
        station_id: &str,
    ) -> Result<ObservationProperties, WeatherError> {
        let url = format!(
            "{}/stations/{}/observations/latest",
            self.base_url, station_id
        );
        let observation: Observation = self.get_json(&url).await?;
        Ok(observation.properties)
    }

    /// Forecast periods for a grid point's forecast URL.
    #[instrument(skip_all, level = "info")]
    pub async fn forecast(&self, forecast_url: &str) -> Result<Vec<RawPeriod>, WeatherError> {
        let forecast: Forecast = self.get_json(forecast_url).await?;
        Ok(forecast
            .properties
            .periods
            .into_iter()
            .map(ForecastPeriod::into_raw)
            .collect())
    }

    /// Active alerts covering a coordinate.
    #[instrument(skip(self), level = "info")]
    pub async fn active_alerts(&self, coord: Coordinates) -> Result<Vec<WeatherAlert>, WeatherError> {
        let url = format!(
            "{}/alerts/active?point={},{}",
            self.base_url, coord.latitude, coord.longitude
        );
        let alerts: AlertCollection = self.get_json(&url).await?;
        Ok(alerts
            .features
            .into_iter()
            .map(|feature| WeatherAlert {
                id: feature.id,
                event: feature.properties.event,
                headline: feature.properties.headline,
                severity: feature.properties.severity,
                urgency: feature.properties.urgency,
                area_desc: feature.properties.area_desc,
            })
            .collect())
    }
}

/// Normalize a raw NOAA observation into display units.
pub fn snapshot_from_observation(
    obs: ObservationProperties,
    station: &StationProperties,
) -> ObservationSnapshot {
    let temperature_f = measurement_value(&obs.temperature).map(|(value, unit)| {
        // NOAA reports Celsius; pass Fahrenheit through untouched.
        if unit.to_ascii_lowercase().contains("degf") {
            value
        } else {
            units::celsius_to_fahrenheit(value)
        }
    });

    let wind_speed_mph =
        measurement_value(&obs.wind_speed).map(|(value, unit)| units::speed_to_mph(value, &unit));
    let wind_gust_mph =
        measurement_value(&obs.wind_gust).map(|(value, unit)| units::speed_to_mph(value, &unit));

    let wind_degrees = obs.wind_direction.as_ref().and_then(|m| m.value);
    let wind_compass = wind_degrees.map(|deg| units::degrees_to_compass(deg).to_string());

    let pressure_inhg = obs
        .barometric_pressure
        .as_ref()
        .and_then(|m| m.value)
        .map(units::pascals_to_inches_mercury);

    ObservationSnapshot {
        temperature_f,
        humidity_percent: obs.relative_humidity.as_ref().and_then(|m| m.value),
        wind_speed_mph,
        wind_gust_mph,
        wind_compass,
        wind_degrees,
        pressure_inhg,
        description: obs.text_description.unwrap_or_default(),
        station_id: Some(station.station_identifier.clone()),
        station_name: station.name.clone(),
        captured_at: obs.timestamp.unwrap_or_else(Utc::now),
    }
}

fn measurement_value(measurement: &Option<Measurement>) -> Option<(f64, String)> {
    let m = measurement.as_ref()?;
    let value = m.value?;
    Some((value, m.unit_code.clone().unwrap_or_default()))
}

// --- Wire shapes ---

#[derive(Debug, Deserialize)]
struct Point {
    properties: PointProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointProperties {
    /// URL of the multi-period forecast for this grid point
    pub forecast: String,
    /// URL listing observation stations, nearest first
    pub observation_stations: String,
}

#[derive(Debug, Deserialize)]
struct StationList {
    features: Vec<StationFeature>,
}

#[derive(Debug, Deserialize)]
struct StationFeature {
    properties: StationProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationProperties {
    pub station_identifier: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    properties: ObservationProperties,
}

/// Latest-observation payload. Every measurement is optional and may carry
/// a null value even when the object is present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObservationProperties {
    pub timestamp: Option<DateTime<Utc>>,
    pub text_description: Option<String>,
    pub temperature: Option<Measurement>,
    pub relative_humidity: Option<Measurement>,
    pub wind_speed: Option<Measurement>,
    pub wind_gust: Option<Measurement>,
    pub wind_direction: Option<Measurement>,
    pub barometric_pressure: Option<Measurement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub value: Option<f64>,
    #[serde(default)]
    pub unit_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastPeriod {
    number: i32,
    name: String,
    start_time: DateTime<chrono::FixedOffset>,
    is_daytime: bool,
    temperature: i32,
    temperature_unit: String,
    #[serde(default)]
    wind_speed: Option<String>,
    #[serde(default)]
    wind_direction: Option<String>,
    #[serde(default)]
    short_forecast: Option<String>,
    #[serde(default)]
    detailed_forecast: Option<String>,
    #[serde(default)]
    probability_of_precipitation: Option<Measurement>,
}

impl ForecastPeriod {
    fn into_raw(self) -> RawPeriod {
        RawPeriod {
            number: self.number,
            name: self.name,
            start_time: self.start_time,
            is_daytime: self.is_daytime,
            temperature: self.temperature,
            temperature_unit: self.temperature_unit,
            wind_speed: self.wind_speed.unwrap_or_default(),
            wind_direction: self.wind_direction.unwrap_or_default(),
            short_forecast: self.short_forecast.unwrap_or_default(),
            detailed_forecast: self.detailed_forecast.unwrap_or_default(),
            precip_chance: self
                .probability_of_precipitation
                .and_then(|m| m.value)
                .map(|v| v.clamp(0.0, 100.0) as u8),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AlertCollection {
    features: Vec<AlertFeature>,
}

#[derive(Debug, Deserialize)]
struct AlertFeature {
    id: String,
    properties: AlertProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlertProperties {
    event: String,
    #[serde(default)]
    headline: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    urgency: Option<String>,
    #[serde(default)]
    area_desc: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_station() -> StationProperties {
        StationProperties {
            station_identifier: "KPHL".to_string(),
            name: Some("Philadelphia Intl".to_string()),
        }
    }

    #[test]
    fn observation_tolerates_null_and_missing_measurements() {
        let json = serde_json::json!({
            "timestamp": "2026-08-29T12:00:00+00:00",
            "textDescription": "Partly Cloudy",
            "temperature": {"value": 10.0, "unitCode": "wmoUnit:degC"},
            "windSpeed": {"value": null, "unitCode": "wmoUnit:km_h-1"},
            "barometricPressure": null
        });

        let obs: ObservationProperties = serde_json::from_value(json).unwrap();
        let snapshot = snapshot_from_observation(obs, &sample_station());

        assert_eq!(snapshot.temperature_f, Some(50.0));
        assert!(snapshot.wind_speed_mph.is_none());
        assert!(snapshot.pressure_inhg.is_none());
        assert_eq!(snapshot.description, "Partly Cloudy");
        assert_eq!(snapshot.station_id.as_deref(), Some("KPHL"));
    }

    #[test]
    fn observation_normalizes_wind_and_pressure() {
        let json = serde_json::json!({
            "temperature": {"value": 0.0, "unitCode": "wmoUnit:degC"},
            "windSpeed": {"value": 5.0, "unitCode": "wmoUnit:m_s-1"},
            "windDirection": {"value": 270.0, "unitCode": "wmoUnit:degree_(angle)"},
            "barometricPressure": {"value": 101325.0, "unitCode": "wmoUnit:Pa"}
        });

        let obs: ObservationProperties = serde_json::from_value(json).unwrap();
        let snapshot = snapshot_from_observation(obs, &sample_station());

        assert_eq!(snapshot.temperature_f, Some(32.0));
        assert!((snapshot.wind_speed_mph.unwrap() - 11.18).abs() < 0.01);
        assert_eq!(snapshot.wind_compass.as_deref(), Some("W"));
        assert!((snapshot.pressure_inhg.unwrap() - 29.92).abs() < 0.01);
    }

    #[test]
    fn fahrenheit_observation_passes_through() {
        let json = serde_json::json!({
            "temperature": {"value": 68.0, "unitCode": "wmoUnit:degF"}
        });

        let obs: ObservationProperties = serde_json::from_value(json).unwrap();
        let snapshot = snapshot_from_observation(obs, &sample_station());
        assert_eq!(snapshot.temperature_f, Some(68.0));
    }

    #[test]
    fn forecast_period_maps_to_raw_period() {
        let json = serde_json::json!({
            "number": 1,
            "name": "Today",
            "startTime": "2026-08-24T06:00:00-04:00",
            "isDaytime": true,
            "temperature": 80,
            "temperatureUnit": "F",
            "windSpeed": "5 to 10 mph",
            "windDirection": "NW",
            "shortForecast": "Sunny",
            "detailedForecast": "Sunny, with a high near 80.",
            "probabilityOfPrecipitation": {"value": 30, "unitCode": "wmoUnit:percent"}
        });

        let period: ForecastPeriod = serde_json::from_value(json).unwrap();
        let raw = period.into_raw();
        assert_eq!(raw.number, 1);
        assert!(raw.is_daytime);
        assert_eq!(raw.precip_chance, Some(30));
    }

    #[test]
    fn forecast_period_without_precip_chance() {
        let json = serde_json::json!({
            "number": 2,
            "name": "Tonight",
            "startTime": "2026-08-24T18:00:00-04:00",
            "isDaytime": false,
            "temperature": 61,
            "temperatureUnit": "F",
            "probabilityOfPrecipitation": {"value": null}
        });

        let period: ForecastPeriod = serde_json::from_value(json).unwrap();
        assert_eq!(period.into_raw().precip_chance, None);
    }
}
