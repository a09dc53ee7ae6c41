use crate::config::ClientConfig;
use crate::errors::Result;
use crate::fetch::{FetchOutcome, TelemetryFetcher};
use crate::merge::{apply_telemetry, MergeOutcome};
use crate::model::{EquipmentRecord, StatusReport};
use crate::status::{status_at, unavailable_report};
use chrono::Utc;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Polls one telemetry document and merges it into host-owned equipment lists.
///
/// The host owns the client; there is no global instance. Every operation takes
/// `&self`, so the client can sit behind an `Arc` without an async lock.
/// Dropping the client stops its poll timer.
#[derive(Debug)]
pub struct IoTDataClient {
    config: ClientConfig,
    fetcher: TelemetryFetcher,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl IoTDataClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let fetcher = TelemetryFetcher::new(&config)?;
        Ok(Self {
            config,
            fetcher,
            poll_task: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Handle for fetching from inside poll callbacks
    pub fn fetcher(&self) -> TelemetryFetcher {
        self.fetcher.clone()
    }

    pub fn poll_interval(&self) -> Duration {
        self.config.poll_interval
    }

    pub fn is_polling(&self) -> bool {
        self.poll_slot().is_some()
    }

    pub async fn fetch_telemetry(&self) -> FetchOutcome {
        self.fetcher.fetch().await
    }

    /// Fetches once and applies the reading to matching records
    pub async fn merge_telemetry(&self, records: &mut [EquipmentRecord]) -> MergeOutcome {
        match self.fetch_telemetry().await {
            FetchOutcome::Available(document) => apply_telemetry(&document, records),
            FetchOutcome::Unavailable(e) => MergeOutcome::Unavailable(e),
        }
    }

    pub async fn get_status(&self) -> StatusReport {
        match self.fetch_telemetry().await {
            FetchOutcome::Available(document) => status_at(&document, Utc::now()),
            FetchOutcome::Unavailable(_) => unavailable_report(),
        }
    }

    /// User-triggered fetch outside the timer cadence
    pub async fn manual_refresh(&self) -> FetchOutcome {
        info!("Manual IoT refresh from {}", self.fetcher.source());
        self.fetch_telemetry().await
    }

    /// Runs `callback` every poll interval, first run one interval from now.
    ///
    /// Returns false without touching the running timer if polling is already on.
    /// Each callback is awaited before the next tick; ticks missed meanwhile are skipped.
    pub fn start_polling<F, Fut>(&self, mut callback: F) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.poll_slot();
        if slot.is_some() {
            info!("IoT polling already running");
            return false;
        }

        let period = self.config.poll_interval;
        info!(
            "Starting IoT polling of {} every {}ms",
            self.fetcher.source(),
            period.as_millis()
        );

        *slot = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                debug!("IoT poll tick");
                callback().await;
            }
        }));

        true
    }

    /// Cancels the poll timer. No-op when not polling.
    pub fn stop_polling(&self) {
        if let Some(task) = self.poll_slot().take() {
            task.abort();
            info!("Stopped IoT polling");
        }
    }

    // The slot is only ever swapped, so a poisoned guard is still consistent
    fn poll_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.poll_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for IoTDataClient {
    fn drop(&mut self) {
        self.stop_polling();
    }
}
