//! Refresh coordination: single-flight gate, force-supersede, normalization
//! and write-through caching.
//!
//! All UI triggers (timers, lifecycle events, pull-to-refresh) funnel into
//! `refresh`; at most one upstream fetch runs at a time. A forced refresh
//! cancels the in-flight fetch and replaces it. State is published through a
//! watch channel; the presentation layer decides when to re-render.

use std::future::Future;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use skywatch_core::WeatherConfig;

use crate::cache::SnapshotCache;
use crate::error::WeatherError;
use crate::forecast;
use crate::noaa::{self, NoaaClient};
use crate::staleness;
use crate::station::PersonalStationClient;
use crate::types::{
    Coordinates, DailyForecast, DisplayState, ObservationSnapshot, Source, WeatherAlert,
    LOCATION_PLACEHOLDER,
};

#[derive(Debug, Default)]
struct RefreshState {
    /// Token for the in-flight fetch, if any. At most one exists.
    in_flight: Option<CancellationToken>,
    /// Bumped on every fetch start; a fetch may only commit results while
    /// its generation is still current.
    generation: u64,
    /// True only between cancelling an in-flight fetch and starting its
    /// forced replacement.
    pending_forced: bool,
    last_fetch_attempt: Option<DateTime<Utc>>,
    last_success: Option<DateTime<Utc>>,
}

struct FetchOutcome {
    snapshot: ObservationSnapshot,
    daily: Vec<DailyForecast>,
    alerts: Vec<WeatherAlert>,
}

pub struct RefreshCoordinator {
    noaa: NoaaClient,
    station: PersonalStationClient,
    cache: SnapshotCache,
    stale_after_secs: u64,
    state: Mutex<RefreshState>,
    tx: watch::Sender<DisplayState>,
}

impl RefreshCoordinator {
    /// Build a coordinator around its injected collaborators.
    pub fn new(
        noaa: NoaaClient,
        station: PersonalStationClient,
        cache: SnapshotCache,
        weather: &WeatherConfig,
    ) -> Self {
        let (tx, _rx) = watch::channel(DisplayState::default());
        Self {
            noaa,
            station,
            cache,
            stale_after_secs: weather.stale_after_secs,
            state: Mutex::new(RefreshState::default()),
            tx,
        }
    }

    /// Subscribe to display-state changes.
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.tx.subscribe()
    }

    /// Point-in-time copy of the current display state.
    pub fn display_state(&self) -> DisplayState {
        self.tx.borrow().clone()
    }

    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        self.state.lock().last_success
    }

    pub fn last_fetch_attempt(&self) -> Option<DateTime<Utc>> {
        self.state.lock().last_fetch_attempt
    }

    /// True when there has been no successful fetch within the configured
    /// freshness threshold. Unaffected by cached snapshots loaded at startup.
    pub fn is_stale(&self) -> bool {
        match self.state.lock().last_success {
            Some(t) => staleness::is_stale_after(t, self.stale_after_secs),
            None => true,
        }
    }

    /// Relative-time phrase for the user-visible last-updated marker.
    pub fn last_updated_text(&self) -> String {
        staleness::last_updated_text(self.tx.borrow().last_updated)
    }

    /// Read the cached snapshot into display state. Called once at startup
    /// before any network activity; never affects `last_success`.
    pub fn load_cached(&self) -> Option<ObservationSnapshot> {
        let snapshot = self.cache.load()?;
        tracing::info!("Loaded cached snapshot from {}", snapshot.captured_at);
        self.tx.send_modify(|state| {
            state.snapshot = Some(snapshot.clone());
            state.last_updated = Some(snapshot.captured_at);
        });
        Some(snapshot)
    }

    /// Refresh from the selected source.
    ///
    /// Single-flight: a non-forced call while a fetch is in flight returns
    /// `false` without contacting any upstream. A forced call cancels the
    /// in-flight fetch and starts over; forced requests always run to
    /// completion or report failure.
    ///
    /// `coord` is required for [`Source::AutomaticStation`] and ignored for
    /// [`Source::PersonalStation`]. `location_label` is display-only; an
    /// empty label never overwrites a previously set real one.
    pub async fn refresh(
        &self,
        source: Source,
        coord: Option<Coordinates>,
        location_label: Option<&str>,
        force: bool,
    ) -> bool {
        let (token, generation) = {
            let mut st = self.state.lock();
            if let Some(active) = st.in_flight.take() {
                if !force {
                    st.in_flight = Some(active);
                    tracing::debug!("Refresh already in flight; ignoring non-forced request");
                    return false;
                }
                st.pending_forced = true;
                active.cancel();
            }
            if st.pending_forced {
                tracing::debug!("Starting forced refresh superseding the previous fetch");
            }
            // The pending-forced flag never survives into a running fetch.
            st.pending_forced = false;
            st.generation += 1;
            st.last_fetch_attempt = Some(Utc::now());
            let token = CancellationToken::new();
            st.in_flight = Some(token.clone());
            (token, st.generation)
        };

        self.tx.send_modify(|state| {
            state.is_fetching = true;
            Self::apply_label(state, location_label);
        });

        let result = self.run_fetch(source, coord, &token).await;

        // The generation check and the commit must be indivisible: once the
        // lock is released a newer fetch may start, and a stale commit would
        // overwrite its writes. Everything below is synchronous, so the lock
        // is held across cache write and state publication.
        let mut st = self.state.lock();
        if st.generation != generation {
            // Lost a force-supersede race; the winner owns all state.
            tracing::debug!("Fetch superseded; discarding its result");
            return false;
        }
        st.in_flight = None;

        match result {
            Ok(outcome) => {
                let now = Utc::now();
                st.last_success = Some(now);
                st.last_fetch_attempt = Some(now);
                if let Err(e) = self.cache.save(&outcome.snapshot) {
                    tracing::warn!("Failed to persist snapshot: {}", e);
                }
                // A forced refresh means "just now" to the caller, even
                // though the capture timestamp is the upstream's own clock.
                let last_updated = if force {
                    now
                } else {
                    outcome.snapshot.captured_at
                };
                self.tx.send_modify(|state| {
                    state.snapshot = Some(outcome.snapshot);
                    state.daily = outcome.daily;
                    state.alerts = outcome.alerts;
                    state.last_updated = Some(last_updated);
                    state.is_fetching = false;
                    state.error = None;
                });
                true
            }
            Err(e) if e.is_cancellation() => {
                // Cancelled from outside (transport teardown); silent.
                self.tx.send_modify(|state| state.is_fetching = false);
                false
            }
            Err(e) => {
                tracing::warn!("Refresh failed: {}", e);
                let message = e.user_message();
                // The last good snapshot stays; stale data beats no data.
                self.tx.send_modify(|state| {
                    state.is_fetching = false;
                    state.error = Some(message);
                });
                false
            }
        }
    }

    async fn run_fetch(
        &self,
        source: Source,
        coord: Option<Coordinates>,
        token: &CancellationToken,
    ) -> Result<FetchOutcome, WeatherError> {
        match source {
            Source::AutomaticStation => {
                let coord = coord.ok_or(WeatherError::MissingCoordinates)?;
                self.fetch_automatic(coord, token).await
            }
            Source::PersonalStation => self.fetch_personal(token).await,
        }
    }

    /// Three sequential suspending calls (grid point → nearest station →
    /// latest observation), then forecast and alerts. A failure at any
    /// stage fails the whole operation; partial results are never kept.
    async fn fetch_automatic(
        &self,
        coord: Coordinates,
        token: &CancellationToken,
    ) -> Result<FetchOutcome, WeatherError> {
        let point = cancellable(token, self.noaa.point(coord)).await?;
        let stations = cancellable(token, self.noaa.stations(&point.observation_stations)).await?;
        // First listed station wins; the upstream orders by distance.
        let station = stations.into_iter().next().ok_or(WeatherError::NoStationNearby)?;
        let observation = cancellable(
            token,
            self.noaa.latest_observation(&station.station_identifier),
        )
        .await?;
        let periods = cancellable(token, self.noaa.forecast(&point.forecast)).await?;
        let alerts = cancellable(token, self.noaa.active_alerts(coord)).await?;

        Ok(FetchOutcome {
            snapshot: noaa::snapshot_from_observation(observation, &station),
            daily: forecast::combine_day_night(&periods),
            alerts,
        })
    }

    async fn fetch_personal(&self, token: &CancellationToken) -> Result<FetchOutcome, WeatherError> {
        let snapshot = cancellable(token, self.station.latest_observation()).await?;
        // One active source per snapshot: no NOAA forecast or alerts are
        // carried over alongside personal-station conditions.
        Ok(FetchOutcome {
            snapshot,
            daily: Vec::new(),
            alerts: Vec::new(),
        })
    }

    fn apply_label(state: &mut DisplayState, incoming: Option<&str>) {
        match incoming {
            Some(label) if !label.trim().is_empty() => {
                state.location_label = label.to_string();
            }
            _ => {
                if state.location_label.is_empty() {
                    state.location_label = LOCATION_PLACEHOLDER.to_string();
                }
            }
        }
    }
}

async fn cancellable<T>(
    token: &CancellationToken,
    operation: impl Future<Output = Result<T, WeatherError>>,
) -> Result<T, WeatherError> {
    tokio::select! {
        _ = token.cancelled() => Err(WeatherError::Cancelled),
        result = operation => result,
    }
}
