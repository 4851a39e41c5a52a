//! Weather-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Upstream returned status {0}")]
    BadStatus(u16),

    #[error("Could not decode upstream response: {0}")]
    Decode(String),

    #[error("No observation station found near the requested point")]
    NoStationNearby,

    #[error("Coordinates are required for the automatic station source")]
    MissingCoordinates,

    #[error("Missing configuration value: {0}")]
    MissingConfig(&'static str),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Cache error: {0}")]
    Cache(String),
}

impl WeatherError {
    /// User-friendly error message for UI display.
    ///
    /// Raw status codes and decode details stay in the logs; only the
    /// configuration variant names specifics, since those are actionable.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Network error. Check your connection.".to_string(),
            Self::Timeout => "The request timed out. Please try again.".to_string(),
            Self::BadStatus(_) | Self::Decode(_) => {
                "Weather service unavailable. Please try again later.".to_string()
            }
            Self::NoStationNearby => {
                "No weather station found for this location.".to_string()
            }
            Self::MissingCoordinates => "Location unavailable.".to_string(),
            Self::MissingConfig(key) => format!("Missing setting: {}. Check your settings.", key),
            Self::Cancelled => String::new(),
            Self::Cache(_) => "Cached weather data may be outdated.".to_string(),
        }
    }

    /// Cancellations are a normal, silent outcome, never surfaced as errors.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            WeatherError::Timeout
        } else if let Some(status) = error.status() {
            WeatherError::BadStatus(status.as_u16())
        } else if error.is_decode() {
            WeatherError::Decode(error.to_string())
        } else {
            WeatherError::Network(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_hide_raw_detail() {
        let err = WeatherError::BadStatus(503);
        assert!(!err.user_message().contains("503"));

        let err = WeatherError::Decode("expected value at line 1".to_string());
        assert!(!err.user_message().contains("line 1"));
    }

    #[test]
    fn missing_config_names_the_key() {
        let err = WeatherError::MissingConfig("station.api_key");
        assert!(err.user_message().contains("station.api_key"));
    }

    #[test]
    fn cancellation_is_not_an_error() {
        assert!(WeatherError::Cancelled.is_cancellation());
        assert!(!WeatherError::Timeout.is_cancellation());
    }
}
