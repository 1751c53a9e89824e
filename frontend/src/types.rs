//! Common types used across the frontend application.
//!
//! This module centralizes the wire types shared with the backend
//! so the two sides cannot drift apart.
//!
//! # Categories
//!
//! - **Entity Types** - Detected entity kinds and risk levels
//! - **Analysis Types** - Analysis result structures
//! - **Log Types** - Real-time log streaming
//! - **Report Types** - Knowledge update reports

use serde::{Deserialize, Serialize};

// =============================================================================
// Entity Types
// =============================================================================

/// Category of a detected entity.
///
/// Matches the backend's wire codes. Unknown codes fall back to `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Insect,
    DiseaseSymptom,
    Tree,
    Plant,
    Environment,
    Vehicle,
    Building,
    Natural,
    Industrial,
    #[serde(other)]
    Other,
}

impl EntityKind {
    /// Wire code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            EntityKind::Insect => "insect",
            EntityKind::DiseaseSymptom => "disease_symptom",
            EntityKind::Tree => "tree",
            EntityKind::Plant => "plant",
            EntityKind::Environment => "environment",
            EntityKind::Vehicle => "vehicle",
            EntityKind::Building => "building",
            EntityKind::Natural => "natural",
            EntityKind::Industrial => "industrial",
            EntityKind::Other => "other",
        }
    }

    /// Display colour, for the kinds that have a documented one.
    pub fn color(&self) -> Option<&'static str> {
        crate::config::ui::entity_color(*self)
    }
}

/// Overall risk level of an analysis result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Wire code for this level.
    pub fn code(&self) -> &'static str {
        match self {
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
        }
    }

    /// Display colour.
    pub fn color(&self) -> &'static str {
        crate::config::ui::risk_color(*self)
    }
}

// =============================================================================
// Analysis Types
// =============================================================================

/// One entity detected in an analyzed image.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedEntity {
    /// Entity name as reported by the vision service
    pub name: String,
    /// Entity category
    pub kind: EntityKind,
    /// Detection confidence (0.0 - 1.0)
    pub confidence: f64,
    /// Similarity to the closest known entity
    #[serde(default)]
    pub similarity: Option<f64>,
    /// Name of the matched knowledge-base entity, if any
    #[serde(default)]
    pub matched_kb_entity: Option<String>,
    /// Visual features (colour, area, texture)
    #[serde(default)]
    pub features: Option<serde_json::Value>,
}

/// A full image analysis result.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Analysis mode ("full", "quick", ...)
    #[serde(default = "default_analysis_mode")]
    pub analysis_mode: String,
    /// Detected entities
    #[serde(default)]
    pub detected_entities: Vec<DetectedEntity>,
    /// Overall risk level
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
}

fn default_analysis_mode() -> String {
    crate::config::analysis::DEFAULT_ANALYSIS_MODE.to_string()
}

// =============================================================================
// Log Types
// =============================================================================

/// Log severity level.
///
/// Matches the backend's log levels for SSE streaming.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Informational message
    Info,
    /// Success/completion message
    Success,
    /// Warning message
    Warning,
    /// Error message
    Error,
}

impl LogLevel {
    /// Get CSS class for styling.
    pub fn css_class(&self) -> &'static str {
        match self {
            LogLevel::Info => "log-info",
            LogLevel::Success => "log-success",
            LogLevel::Warning => "log-warning",
            LogLevel::Error => "log-error",
        }
    }

    /// Get emoji prefix for display.
    pub fn emoji(&self) -> &'static str {
        match self {
            LogLevel::Info => "ℹ️",
            LogLevel::Success => "✅",
            LogLevel::Warning => "⚠️",
            LogLevel::Error => "❌",
        }
    }
}

/// A single log entry from the backend.
///
/// Received via SSE from the `/api/logs` endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Severity level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Indentation level (for nested logs)
    #[serde(default)]
    pub indent: u8,
}

// =============================================================================
// Report Types
// =============================================================================

/// Statistics of one knowledge update run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStats {
    /// Entities added to the graph
    pub new_entities_added: usize,
    /// Relations added between entities
    pub new_relations_added: usize,
    /// Entities whose stored features were refreshed
    pub features_updated: usize,
    /// Detections ignored for low confidence
    pub skipped_low_confidence: usize,
    /// Every mutation, in order
    #[serde(default)]
    pub updates: Vec<serde_json::Value>,
}

/// Metadata about an update request.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Unique request identifier
    pub request_id: String,
    /// RFC 3339 completion time
    pub completed_at: String,
}

/// Response from the backend knowledge-process endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReport {
    /// Whether the update run completed
    pub success: bool,
    /// Status: "updated", "unchanged", "error"
    pub status: String,
    /// What the run changed
    pub stats: UpdateStats,
    /// Metadata about the request
    pub metadata: ReportMetadata,
}
