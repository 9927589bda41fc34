//! JSON output structures for the fsync CLI

use crate::sync::SyncReport;
use fsync_types::CopyStats;
use serde::{Deserialize, Serialize};

/// Complete JSON output for a synchronization run
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResultJson {
    /// Operation metadata
    pub metadata: OperationMetadata,
    /// Differences per kind
    pub differences: DifferenceCountsJson,
    /// Copy statistics
    pub copy_stats: CopyStatsJson,
    /// Overall result
    pub result: OperationResult,
}

/// Operation metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationMetadata {
    /// fsync version
    pub version: String,
    /// Request ID
    pub request_id: String,
    /// Timestamp when the report was produced
    pub timestamp: String,
    /// First (authoritative) directory
    pub first_path: String,
    /// Second directory
    pub second_path: String,
    /// Whether the run was a simulation
    pub simulated: bool,
}

/// Differences per kind
#[derive(Debug, Serialize, Deserialize)]
pub struct DifferenceCountsJson {
    /// Unchanged pairs
    pub unchanged: u64,
    /// Files only in the first tree
    pub created: u64,
    /// Files only in the second tree
    pub deleted: u64,
    /// Changed pairs
    pub modified: u64,
}

/// Copy statistics in JSON format
#[derive(Debug, Serialize, Deserialize)]
pub struct CopyStatsJson {
    /// Number of files copied
    pub files_copied: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Number of directories created
    pub directories_created: u64,
    /// Number of files deleted
    pub files_deleted: u64,
    /// Number of differences left untouched
    pub files_skipped: u64,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Transfer rate in bytes per second
    pub transfer_rate_bps: f64,
}

impl From<&CopyStats> for CopyStatsJson {
    fn from(stats: &CopyStats) -> Self {
        Self {
            files_copied: stats.files_copied,
            bytes_copied: stats.bytes_copied,
            directories_created: stats.directories_created,
            files_deleted: stats.files_deleted,
            files_skipped: stats.files_skipped,
            duration_ms: u64::try_from(stats.duration.as_millis()).unwrap_or(u64::MAX),
            transfer_rate_bps: stats.transfer_rate(),
        }
    }
}

/// A copy or enumeration failure
#[derive(Debug, Serialize, Deserialize)]
pub struct FailureJson {
    /// Path involved, when known
    pub path: Option<String>,
    /// Rendered error
    pub message: String,
    /// Whether a later run may succeed
    pub retryable: bool,
}

/// Overall operation result
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationResult {
    /// Whether every difference was enumerated and applied
    pub success: bool,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Failures, in the order they were met
    pub failures: Vec<FailureJson>,
}

impl SyncResultJson {
    /// Build the JSON view of a report
    pub fn from_report(report: &SyncReport) -> Self {
        let mut failures: Vec<FailureJson> = report
            .errors
            .iter()
            .map(|message| FailureJson {
                path: None,
                message: message.clone(),
                retryable: false,
            })
            .collect();
        failures.extend(report.copy_failures.iter().map(|f| FailureJson {
            path: Some(f.item.source.display().to_string()),
            message: f.message.clone(),
            retryable: f.retryable,
        }));

        Self {
            metadata: OperationMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                request_id: report.request_id.to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                first_path: report.first.display().to_string(),
                second_path: report.second.display().to_string(),
                simulated: report.simulated,
            },
            differences: DifferenceCountsJson {
                unchanged: report.counts.unchanged,
                created: report.counts.created,
                deleted: report.counts.deleted,
                modified: report.counts.modified,
            },
            copy_stats: CopyStatsJson::from(&report.stats),
            result: OperationResult {
                success: report.is_success(),
                duration_ms: u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
                failures,
            },
        }
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::DifferenceCounts;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_report_serializes() {
        let report = SyncReport {
            request_id: uuid::Uuid::new_v4(),
            first: PathBuf::from("a"),
            second: PathBuf::from("b"),
            simulated: false,
            counts: DifferenceCounts {
                unchanged: 1,
                created: 2,
                deleted: 0,
                modified: 1,
            },
            stats: CopyStats::new(),
            copy_failures: Vec::new(),
            errors: vec!["Enumeration error".to_string()],
            duration: Duration::from_millis(42),
        };

        let json = SyncResultJson::from_report(&report);
        assert!(!json.result.success);
        assert_eq!(json.result.duration_ms, 42);

        let value: serde_json::Value = serde_json::from_str(&json.to_json().unwrap()).unwrap();
        assert_eq!(value["differences"]["created"], 2);
        assert_eq!(value["metadata"]["first_path"], "a");
    }
}
