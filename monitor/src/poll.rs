use crate::equipment::SharedEquipment;
use chrono::{DateTime, Utc};
use iot_client::status::{status_at, unavailable_report};
use iot_client::{apply_telemetry, FetchOutcome, MergeOutcome, StatusReport};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

pub type SharedPoll = Arc<RwLock<Option<PollSummary>>>;

/// What the most recent poll or manual refresh did
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSummary {
    pub polled_at: DateTime<Utc>,
    pub available: bool,
    pub updated: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: StatusReport,
}

impl PollSummary {
    fn new(outcome: &MergeOutcome, status: StatusReport) -> Self {
        let (available, reason) = match outcome {
            MergeOutcome::Applied { .. } => (true, None),
            MergeOutcome::NoMapping => {
                let reason = "document has no equipment mapping".to_string();
                (true, Some(reason))
            }
            MergeOutcome::Unavailable(e) => (false, Some(e.to_string())),
        };

        Self {
            polled_at: Utc::now(),
            available,
            updated: outcome.updated(),
            reason,
            status,
        }
    }
}

/// Merges a fetch result into the equipment list and stores the summary as the latest poll
pub async fn merge_and_record(
    fetched: FetchOutcome,
    equipment: &SharedEquipment,
    latest: &SharedPoll,
) -> PollSummary {
    let (merged, status) = match fetched {
        FetchOutcome::Available(document) => {
            let merged = apply_telemetry(&document, &mut equipment.write().await);
            (merged, status_at(&document, Utc::now()))
        }
        FetchOutcome::Unavailable(e) => (MergeOutcome::Unavailable(e), unavailable_report()),
    };

    match &merged {
        MergeOutcome::Applied { updated } => info!(
            "Merged IoT data into {} records, device {:?}: {}",
            updated, status.status, status.message
        ),
        MergeOutcome::NoMapping => {
            warn!("Telemetry document has no equipment mapping, nothing merged")
        }
        MergeOutcome::Unavailable(e) => warn!("IoT data unavailable: {}", e),
    }

    let summary = PollSummary::new(&merged, status);
    *latest.write().await = Some(summary.clone());
    summary
}
