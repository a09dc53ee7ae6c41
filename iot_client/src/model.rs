use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::errors::{Error, Result};

/// Equipment-hours telemetry document as published by the data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryDocument {
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_mapping: Option<HashMap<String, String>>,
    pub current_hours: f64,
    pub last_updated: String,
}

impl TelemetryDocument {
    /// Device id the given equipment number is mapped to, if any
    pub fn mapped_device(&self, equipment_number: &str) -> Option<&str> {
        self.equipment_mapping
            .as_ref()
            .and_then(|mapping| mapping.get(equipment_number))
            .map(String::as_str)
    }

    pub fn updated_at(&self) -> Result<DateTime<Utc>> {
        parse_timestamp(&self.last_updated)
    }
}

/// Caller-owned equipment entry. Unknown fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    #[serde(rename = "equipmentNumber")]
    pub equipment_number: String,
    #[serde(
        rename = "currentHours",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub current_hours: Option<f64>,
    #[serde(
        rename = "lastIoTUpdate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_iot_update: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EquipmentRecord {
    pub fn new(equipment_number: impl Into<String>) -> Self {
        Self {
            equipment_number: equipment_number.into(),
            current_hours: None,
            last_iot_update: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Stale,
    Offline,
}

/// Freshness report handed back to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub status: DeviceStatus,
    pub message: String,
    pub last_update: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_hours: Option<f64>,
}

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses the timestamp formats data sources are known to emit.
///
/// Offset-less date-times are local time, a bare date is UTC midnight.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    // Explicit offsets, basic (+0200) or extended (+02:00)
    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(raw, format) {
            return Ok(ts.with_timezone(&Utc));
        }
    }

    // Zulu suffix without seconds, e.g. 2024-05-01T12:30Z
    if let Some(utc) = raw.strip_suffix(['Z', 'z']) {
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(utc, format) {
                return Ok(naive.and_utc());
            }
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|ts| ts.with_timezone(&Utc))
                .ok_or_else(|| Error::Timestamp(raw.to_string()));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::Timestamp(raw.to_string()))
}

/// Human readable local rendering used in status reports
pub fn format_local(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}
