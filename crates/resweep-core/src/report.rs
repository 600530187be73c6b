//! Failure report: the only artifact a run leaves behind.
//!
//! Written only when a sweep collected failures. Each write fully
//! replaces the file at the target path.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::store::StoreError;
use crate::sweep::DocumentLabel;

/// Where failing sweeps write their records.
pub const REPORT_PATH: &str = "./report.json";

/// One per-document failure, with enough context to re-identify the
/// affected document after the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    pub account_id: String,
    pub account_name: String,
    pub cause: String,
}

impl FailureRecord {
    pub fn new(label: DocumentLabel, cause: &StoreError) -> Self {
        Self {
            account_id: label.id,
            account_name: label.name,
            cause: cause.to_string(),
        }
    }
}

/// Errors from report serialization and writing.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to render report: {0}")]
    Serialize(String),

    #[error("failed to write report {0}: {1}")]
    Io(String, String),
}

/// Serialize `records` to `path`, replacing any existing file.
///
/// The write goes through a temp file and a rename so a crashed run
/// never leaves a half-written report behind.
pub fn write_report(path: impl AsRef<Path>, records: &[FailureRecord]) -> Result<(), ReportError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(records)
        .map_err(|e| ReportError::Serialize(e.to_string()))?;

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), ReportError> {
        let mut file = File::create(&tmp_path)
            .map_err(|e| ReportError::Io(tmp_path.display().to_string(), e.to_string()))?;
        file.write_all(json.as_bytes())
            .map_err(|e| ReportError::Io(tmp_path.display().to_string(), e.to_string()))?;
        file.write_all(b"\n")
            .map_err(|e| ReportError::Io(tmp_path.display().to_string(), e.to_string()))?;
        file.sync_all()
            .map_err(|e| ReportError::Io(tmp_path.display().to_string(), e.to_string()))?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        ReportError::Io(
            format!("{} -> {}", tmp_path.display(), path.display()),
            e.to_string(),
        )
    })?;

    Ok(())
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_report(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "resweep-report-{prefix}-{}-{unique}.json",
            std::process::id()
        ))
    }

    fn record(id: &str, name: &str, cause: &str) -> FailureRecord {
        FailureRecord {
            account_id: id.to_string(),
            account_name: name.to_string(),
            cause: cause.to_string(),
        }
    }

    #[test]
    fn record_serializes_camel_case() {
        let json = serde_json::to_value(record("P1", "deploy", "backend error: boom"))
            .expect("record should serialize");
        assert_eq!(json["accountId"], "P1");
        assert_eq!(json["accountName"], "deploy");
        assert_eq!(json["cause"], "backend error: boom");
    }

    #[test]
    fn write_report_round_trips() {
        let path = temp_report("roundtrip");
        let records = vec![record("P1", "deploy", "boom"), record("P2", "build", "bust")];

        write_report(&path, &records).expect("report should write");
        let text = fs::read_to_string(&path).expect("report should exist");
        let parsed: Vec<FailureRecord> =
            serde_json::from_str(&text).expect("report should parse back");
        assert_eq!(parsed, records);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn write_report_replaces_previous_content() {
        let path = temp_report("overwrite");

        write_report(&path, &[record("P1", "deploy", "boom")]).expect("first write");
        write_report(&path, &[record("R1", "system-v2", "bust")]).expect("second write");

        let text = fs::read_to_string(&path).expect("report should exist");
        assert!(!text.contains("P1"));
        assert!(text.contains("R1"));

        let _ = fs::remove_file(path);
    }
}
