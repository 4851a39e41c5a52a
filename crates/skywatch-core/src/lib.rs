pub mod config;

pub use config::{Config, StationConfig, WeatherConfig};

use anyhow::Result;

/// Initialize logging for the application.
///
/// App-assembly entry point: the embedding binary calls this once at
/// startup, before constructing the coordinator. Library code never calls
/// it.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Skywatch core initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_installs_a_subscriber() {
        // Sets the process-global subscriber; must run at most once per
        // test binary.
        assert!(super::init().is_ok());
        tracing::debug!("subscriber accepts events");
    }
}

