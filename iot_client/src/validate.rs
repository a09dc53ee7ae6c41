use crate::errors::{Error, Result};
use crate::model::TelemetryDocument;

/// Validates a freshly parsed telemetry document.
/// An unparseable `last_updated` is not rejected here.
pub fn validate(document: &TelemetryDocument) -> Result<()> {
    // Validate device_id
    if document.device_id.trim().is_empty() {
        return Err(Error::Validation("Device ID cannot be empty".to_string()));
    }

    // Validate hours meter
    if !document.current_hours.is_finite() || document.current_hours < 0.0 {
        return Err(Error::Validation(format!(
            "Current hours {} is not a valid meter reading",
            document.current_hours
        )));
    }

    // last_updated is copied verbatim by merges; status reports parse it on demand

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> TelemetryDocument {
        TelemetryDocument {
            device_id: "hm-001".to_string(),
            equipment_mapping: None,
            current_hours: 1520.5,
            last_updated: "2024-05-01T12:30:00Z".to_string(),
        }
    }

    #[test]
    fn test_valid_document() {
        assert!(validate(&document()).is_ok());
    }

    #[test]
    fn test_empty_device_id() {
        let mut doc = document();
        doc.device_id = "  ".to_string();

        assert!(matches!(validate(&doc), Err(Error::Validation(_))));
    }

    #[test]
    fn test_negative_hours() {
        let mut doc = document();
        doc.current_hours = -3.0;

        assert!(validate(&doc).is_err());
    }

    #[test]
    fn test_nan_hours() {
        let mut doc = document();
        doc.current_hours = f64::NAN;

        assert!(validate(&doc).is_err());
    }

    #[test]
    fn test_unparseable_timestamp_still_valid() {
        let mut doc = document();
        doc.last_updated = "not a date".to_string();

        assert!(validate(&doc).is_ok());
        assert!(matches!(doc.updated_at(), Err(Error::Timestamp(_))));
    }

    #[test]
    fn test_basic_offset_timestamp_valid() {
        let mut doc = document();
        doc.last_updated = "2024-05-01T12:30:00+0200".to_string();

        assert!(validate(&doc).is_ok());
        assert!(doc.updated_at().is_ok());
    }
}
