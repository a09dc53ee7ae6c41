use anyhow::Context;
use iot_client::EquipmentRecord;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

pub type SharedEquipment = Arc<RwLock<Vec<EquipmentRecord>>>;

/// Loads the equipment list the monitor keeps up to date.
/// A missing file yields an empty list.
pub async fn load_equipment(path: &Path) -> anyhow::Result<Vec<EquipmentRecord>> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Equipment file {} not found, starting empty", path.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading {}", path.display()));
        }
    };

    let records: Vec<EquipmentRecord> = serde_json::from_slice(&raw)
        .with_context(|| format!("parsing equipment list {}", path.display()))?;

    info!("Loaded {} equipment records from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_equipment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"[{"equipmentNumber":"EQ-1","model":"D6"},{"equipmentNumber":"EQ-2"}]"#)
            .unwrap();

        let records = load_equipment(file.path()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].equipment_number, "EQ-1");
        assert_eq!(records[0].extra["model"], "D6");
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let records = load_equipment(Path::new("/nonexistent/equipment.json"))
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[{\"name\": 1}]").unwrap();

        assert!(load_equipment(file.path()).await.is_err());
    }
}
