use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder shown until a real location label is known.
pub const LOCATION_PLACEHOLDER: &str = "Current Location";

/// Geographic coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Which upstream source a refresh should pull from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Nearest NOAA observation station, resolved from coordinates
    AutomaticStation,
    /// Personal weather station configured by id + API key
    PersonalStation,
}

/// One half-day forecast slot as delivered by the NOAA forecast endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPeriod {
    pub number: i32,
    pub name: String,
    pub start_time: DateTime<FixedOffset>,
    pub is_daytime: bool,
    pub temperature: i32,
    pub temperature_unit: String,
    pub wind_speed: String,
    pub wind_direction: String,
    pub short_forecast: String,
    pub detailed_forecast: String,
    pub precip_chance: Option<u8>,
}

/// A day's forecast, folded from a daytime period and the night that follows it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyForecast {
    pub day: RawPeriod,
    pub night: Option<RawPeriod>,
}

impl DailyForecast {
    /// Identity of this entry: the day period's ordinal number.
    pub fn number(&self) -> i32 {
        self.day.number
    }

    /// Calendar date of the day period.
    pub fn date(&self) -> NaiveDate {
        self.day.start_time.date_naive()
    }

    pub fn high_text(&self) -> String {
        format!("{}°", self.day.temperature)
    }

    /// Low temperature text. Falls back to the day period's own temperature
    /// when no night period was paired; check `night.is_some()` to tell a
    /// real night reading from the fallback.
    pub fn low_text(&self) -> String {
        match &self.night {
            Some(night) => format!("{}°", night.temperature),
            None => format!("{}°", self.day.temperature),
        }
    }
}

/// Normalized current conditions in display units (°F, mph, inHg).
///
/// Overwritten wholesale on each successful fetch; the only persisted entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationSnapshot {
    pub temperature_f: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub wind_speed_mph: Option<f64>,
    pub wind_gust_mph: Option<f64>,
    /// Compass label derived from `wind_degrees`
    pub wind_compass: Option<String>,
    pub wind_degrees: Option<f64>,
    pub pressure_inhg: Option<f64>,
    pub description: String,
    /// Reporting station (NOAA source only)
    pub station_id: Option<String>,
    pub station_name: Option<String>,
    /// When the upstream captured these conditions
    pub captured_at: DateTime<Utc>,
}

/// An active weather alert for the requested point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub id: String,
    pub event: String,
    pub headline: Option<String>,
    pub severity: Option<String>,
    pub urgency: Option<String>,
    pub area_desc: Option<String>,
}

/// Everything the presentation layer needs, published on every change.
#[derive(Debug, Clone)]
pub struct DisplayState {
    pub snapshot: Option<ObservationSnapshot>,
    pub daily: Vec<DailyForecast>,
    pub alerts: Vec<WeatherAlert>,
    pub location_label: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub is_fetching: bool,
    pub error: Option<String>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            snapshot: None,
            daily: Vec::new(),
            alerts: Vec::new(),
            location_label: LOCATION_PLACEHOLDER.to_string(),
            last_updated: None,
            is_fetching: false,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(number: i32, temp: i32, is_daytime: bool) -> RawPeriod {
        RawPeriod {
            number,
            name: if is_daytime { "Monday" } else { "Monday Night" }.to_string(),
            start_time: DateTime::parse_from_rfc3339("2026-08-24T06:00:00-04:00").unwrap(),
            is_daytime,
            temperature: temp,
            temperature_unit: "F".to_string(),
            wind_speed: "5 to 10 mph".to_string(),
            wind_direction: "NW".to_string(),
            short_forecast: "Sunny".to_string(),
            detailed_forecast: "Sunny, with a high near 80.".to_string(),
            precip_chance: None,
        }
    }

    #[test]
    fn paired_forecast_uses_night_low() {
        let daily = DailyForecast {
            day: period(1, 80, true),
            night: Some(period(2, 61, false)),
        };
        assert_eq!(daily.high_text(), "80°");
        assert_eq!(daily.low_text(), "61°");
        assert_eq!(daily.number(), 1);
    }

    #[test]
    fn day_only_forecast_falls_back_to_day_temp() {
        let daily = DailyForecast {
            day: period(1, 80, true),
            night: None,
        };
        assert_eq!(daily.low_text(), daily.high_text());
    }

    #[test]
    fn forecast_date_comes_from_day_period() {
        let daily = DailyForecast {
            day: period(1, 80, true),
            night: None,
        };
        assert_eq!(daily.date().to_string(), "2026-08-24");
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = ObservationSnapshot {
            temperature_f: Some(50.0),
            humidity_percent: Some(40.0),
            wind_speed_mph: Some(11.2),
            wind_gust_mph: None,
            wind_compass: Some("W".to_string()),
            wind_degrees: Some(270.0),
            pressure_inhg: Some(29.92),
            description: "Partly Cloudy".to_string(),
            station_id: Some("KPHL".to_string()),
            station_name: Some("Philadelphia Intl".to_string()),
            captured_at: Utc::now(),
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: ObservationSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.temperature_f, Some(50.0));
        assert_eq!(back.wind_compass.as_deref(), Some("W"));
    }
}
