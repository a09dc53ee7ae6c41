use crate::errors::Error;
use crate::metrics::RECORDS_UPDATED_TOTAL;
use crate::model::{EquipmentRecord, TelemetryDocument};
use tracing::{debug, info};

/// What a merge pass did to the equipment list
#[derive(Debug)]
pub enum MergeOutcome {
    Applied { updated: usize },
    /// Nothing fetched; the list is untouched
    Unavailable(Error),
    /// Document arrived without an equipment mapping; the list is untouched
    NoMapping,
}

impl MergeOutcome {
    pub fn updated(&self) -> usize {
        match self {
            MergeOutcome::Applied { updated } => *updated,
            _ => 0,
        }
    }
}

/// Copies the document's reading onto every record mapped to the document's own device.
///
/// Records mapped to another device, or not mapped at all, keep their fields.
pub fn apply_telemetry(
    document: &TelemetryDocument,
    records: &mut [EquipmentRecord],
) -> MergeOutcome {
    if document.equipment_mapping.is_none() {
        debug!("Telemetry for {} has no equipment mapping", document.device_id);
        return MergeOutcome::NoMapping;
    }

    let mut updated = 0;
    for record in records.iter_mut() {
        let mapped = document.mapped_device(&record.equipment_number);
        if mapped != Some(document.device_id.as_str()) {
            continue;
        }

        record.current_hours = Some(document.current_hours);
        record.last_iot_update = Some(document.last_updated.clone());
        updated += 1;

        info!(
            "Updated {} with IoT data: {} hours",
            record.equipment_number, document.current_hours
        );
    }

    RECORDS_UPDATED_TOTAL.inc_by(updated as f64);
    MergeOutcome::Applied { updated }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn document(mapping: Option<&[(&str, &str)]>) -> TelemetryDocument {
        TelemetryDocument {
            device_id: "hm-001".to_string(),
            equipment_mapping: mapping.map(|pairs| {
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<HashMap<_, _>>()
            }),
            current_hours: 2048.25,
            last_updated: "2024-05-01T12:30:00Z".to_string(),
        }
    }

    fn fleet() -> Vec<EquipmentRecord> {
        let mut loader = EquipmentRecord::new("EQ-2");
        loader.current_hours = Some(10.0);
        loader.last_iot_update = Some("2023-01-01T00:00:00Z".to_string());
        vec![EquipmentRecord::new("EQ-1"), loader, EquipmentRecord::new("EQ-3")]
    }

    #[test]
    fn test_missing_mapping_leaves_records_untouched() {
        let mut records = fleet();
        let before = records.clone();

        let outcome = apply_telemetry(&document(None), &mut records);

        assert!(matches!(outcome, MergeOutcome::NoMapping));
        assert_eq!(records, before);
    }

    #[test]
    fn test_matching_records_updated() {
        let mut records = fleet();
        let doc = document(Some(&[("EQ-1", "hm-001"), ("EQ-3", "hm-001")]));

        let outcome = apply_telemetry(&doc, &mut records);

        assert_eq!(outcome.updated(), 2);
        for idx in [0, 2] {
            assert_eq!(records[idx].current_hours, Some(2048.25));
            assert_eq!(
                records[idx].last_iot_update.as_deref(),
                Some("2024-05-01T12:30:00Z")
            );
        }
        assert_eq!(records[1], fleet()[1]);
    }

    #[test]
    fn test_record_mapped_to_other_device_untouched() {
        let mut records = fleet();
        let doc = document(Some(&[("EQ-1", "hm-001"), ("EQ-2", "hm-999")]));

        let outcome = apply_telemetry(&doc, &mut records);

        assert_eq!(outcome.updated(), 1);
        assert_eq!(records[1].current_hours, Some(10.0));
        assert_eq!(
            records[1].last_iot_update.as_deref(),
            Some("2023-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_timestamp_copied_verbatim() {
        let mut records = fleet();
        let mut doc = document(Some(&[("EQ-1", "hm-001")]));
        doc.last_updated = "01.05.2024 12:30".to_string();

        let outcome = apply_telemetry(&doc, &mut records);

        assert_eq!(outcome.updated(), 1);
        assert_eq!(records[0].last_iot_update.as_deref(), Some("01.05.2024 12:30"));
    }

    #[test]
    fn test_empty_mapping_updates_nothing() {
        let mut records = fleet();
        let before = records.clone();

        let outcome = apply_telemetry(&document(Some(&[])), &mut records);

        assert!(matches!(outcome, MergeOutcome::Applied { updated: 0 }));
        assert_eq!(records, before);
    }
}
