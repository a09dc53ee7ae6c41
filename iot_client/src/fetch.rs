use crate::config::{ClientConfig, DataSource};
use crate::errors::{Error, Result};
use crate::metrics::{FETCHES_TOTAL, FETCH_FAILURES_TOTAL, FETCH_LATENCY_SECONDS};
use crate::model::TelemetryDocument;
use crate::validate::validate;
use std::time::Instant;
use tracing::{debug, error};

/// Result of a single retrieval attempt. Failures never escape as errors,
/// they are carried here so callers can tell why there is no data.
#[derive(Debug)]
pub enum FetchOutcome {
    Available(TelemetryDocument),
    Unavailable(Error),
}

impl FetchOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, FetchOutcome::Available(_))
    }

    pub fn document(&self) -> Option<&TelemetryDocument> {
        match self {
            FetchOutcome::Available(doc) => Some(doc),
            FetchOutcome::Unavailable(_) => None,
        }
    }

    pub fn into_document(self) -> Option<TelemetryDocument> {
        match self {
            FetchOutcome::Available(doc) => Some(doc),
            FetchOutcome::Unavailable(_) => None,
        }
    }
}

/// Retrieves the telemetry document. Cheap to clone, clones share the HTTP connection pool.
#[derive(Debug, Clone)]
pub struct TelemetryFetcher {
    source: DataSource,
    http: reqwest::Client,
}

impl TelemetryFetcher {
    /// Fails only if the HTTP client (TLS backend) cannot be initialised
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            source: config.source.clone(),
            http: builder.build()?,
        })
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Single attempt, no retries
    pub async fn fetch(&self) -> FetchOutcome {
        FETCHES_TOTAL.inc();
        let start = Instant::now();

        match self.try_fetch().await {
            Ok(document) => {
                FETCH_LATENCY_SECONDS.observe(start.elapsed().as_secs_f64());
                debug!(
                    "Fetched telemetry for device {} from {} ({:.1}h)",
                    document.device_id, self.source, document.current_hours
                );
                FetchOutcome::Available(document)
            }
            Err(e) => {
                FETCH_FAILURES_TOTAL.inc();
                error!("Error fetching IoT data from {}: {}", self.source, e);
                FetchOutcome::Unavailable(e)
            }
        }
    }

    async fn try_fetch(&self) -> Result<TelemetryDocument> {
        let payload = match &self.source {
            DataSource::Http(url) => {
                let response = self.http.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(Error::Status(response.status()));
                }
                response.bytes().await?.to_vec()
            }
            DataSource::File(path) => tokio::fs::read(path).await?,
        };

        parse_document(&payload)
    }
}

/// Parses and validates a raw payload
pub fn parse_document(payload: &[u8]) -> Result<TelemetryDocument> {
    let document = serde_json::from_slice::<TelemetryDocument>(payload)?;
    validate(&document)?;
    Ok(document)
}
