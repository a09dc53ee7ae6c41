//! Equipment-hours telemetry polling.
//!
//! [`IoTDataClient`] fetches a single JSON telemetry document, merges its hour
//! meter reading into caller-owned [`EquipmentRecord`]s and classifies how fresh
//! the reading is.

pub mod client;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod merge;
pub mod metrics;
pub mod model;
pub mod status;
pub mod validate;

pub use client::IoTDataClient;
pub use config::{ClientConfig, DataSource};
pub use errors::{Error, Result};
pub use fetch::{FetchOutcome, TelemetryFetcher};
pub use merge::{apply_telemetry, MergeOutcome};
pub use model::{DeviceStatus, EquipmentRecord, StatusReport, TelemetryDocument};
