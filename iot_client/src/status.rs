use crate::metrics::DATA_AGE_MINUTES;
use crate::model::{format_local, DeviceStatus, StatusReport, TelemetryDocument};
use chrono::{DateTime, Utc};
use tracing::warn;

pub const STALE_AFTER_MINUTES: i64 = 60;
pub const OFFLINE_AFTER_MINUTES: i64 = 24 * 60;

pub const UNAVAILABLE_MESSAGE: &str = "IoT data unavailable";
pub const VERY_OLD_MESSAGE: &str = "Data is very old (>24h)";

/// Maps elapsed whole minutes onto a status and message.
/// Later thresholds override earlier ones.
pub fn classify(elapsed_minutes: i64) -> (DeviceStatus, String) {
    let mut status = DeviceStatus::Online;
    let mut message = format!("Updated {} min ago", elapsed_minutes);

    if elapsed_minutes > STALE_AFTER_MINUTES {
        status = DeviceStatus::Stale;
        message = format!(
            "Last update: {}h {}m ago",
            elapsed_minutes / 60,
            elapsed_minutes % 60
        );
    }

    if elapsed_minutes > OFFLINE_AFTER_MINUTES {
        status = DeviceStatus::Offline;
        message = VERY_OLD_MESSAGE.to_string();
    }

    (status, message)
}

/// Whole minutes from `updated_at` to `now`, floored. Negative when `updated_at` is in the future.
pub fn elapsed_minutes(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - updated_at).num_milliseconds().div_euclid(60_000)
}

pub fn unavailable_report() -> StatusReport {
    StatusReport {
        status: DeviceStatus::Offline,
        message: UNAVAILABLE_MESSAGE.to_string(),
        last_update: "Never".to_string(),
        device_id: None,
        current_hours: None,
    }
}

/// Builds the report for a document as seen at `now`
pub fn status_at(document: &TelemetryDocument, now: DateTime<Utc>) -> StatusReport {
    let updated_at = match document.updated_at() {
        Ok(ts) => ts,
        Err(e) => {
            warn!("Telemetry for {} has {}", document.device_id, e);
            return unavailable_report();
        }
    };

    let elapsed = elapsed_minutes(updated_at, now);
    if elapsed < 0 {
        warn!(
            "Telemetry for {} is timestamped {} min in the future",
            document.device_id, -elapsed
        );
    }
    DATA_AGE_MINUTES.set(elapsed as f64);

    let (status, message) = classify(elapsed);

    StatusReport {
        status,
        message,
        last_update: format_local(updated_at),
        device_id: Some(document.device_id.clone()),
        current_hours: Some(document.current_hours),
    }
}
