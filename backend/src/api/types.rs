//! REST API types for frontend integration.
//!
//! Responses mirror the frontend wire types (camelCase keys) so the
//! existing clients keep working unchanged against this backend.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::updater::UpdateStats;

/// Response sent to frontend after an analysis result has been folded
/// into the knowledge graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReport {
    /// Whether the update run completed
    pub success: bool,

    /// Status: "updated", "unchanged", "error"
    pub status: String,

    /// What the run changed, mutation by mutation
    pub stats: UpdateStats,

    /// Metadata about the request
    pub metadata: ReportMetadata,
}

/// Metadata about an update request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Unique request identifier
    pub request_id: String,

    /// RFC 3339 completion time
    pub completed_at: String,
}

/// Convert run statistics into the wire report
impl From<UpdateStats> for UpdateReport {
    fn from(stats: UpdateStats) -> Self {
        let status = if stats.is_unchanged() { "unchanged" } else { "updated" };

        UpdateReport {
            success: true,
            status: status.to_string(),
            stats,
            metadata: ReportMetadata {
                request_id: Uuid::new_v4().to_string(),
                completed_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "success": false,
        "status": "error",
        "error": error,
        "metadata": {
            "requestId": Uuid::new_v4().to_string(),
            "completedAt": chrono::Utc::now().to_rfc3339()
        }
    })
}
