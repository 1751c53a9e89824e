//! # SylvaScan - Forest pest & disease knowledge backend
//!
//! SylvaScan maintains a knowledge graph of forest pests, host trees and
//! disease symptoms, and grows it from image analysis results: every analyzed
//! photo can add entities, relations and visual features to the graph.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │ Analysis JSON│────▶│ Validation  │────▶│   Updater    │────▶│  Knowledge  │
//! │ (detections) │     │ (schema)    │     │ (rules + AI) │     │ graph (DB)  │
//! └──────────────┘     └─────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sylvascan::{example_analysis_result, KnowledgeStore, KnowledgeUpdater};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = KnowledgeStore::open_default().await.unwrap();
//!     let updater = KnowledgeUpdater::new(store);
//!     let stats = updater.process(&example_analysis_result()).await.unwrap();
//!     println!("Added {} entities", stats.new_entities_added);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (DetectedEntity, AnalysisResult, EntityKind)
//! - [`validation`] - Analysis result schema validation
//! - [`graph`] - SQLite-backed knowledge triple store
//! - [`updater`] - Update rules, feature refresh and suggestions
//! - [`ai`] - AI-powered relation discovery
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Validation
pub mod validation;

// Knowledge graph storage
pub mod graph;

// Knowledge updating
pub mod updater;

// AI
pub mod ai;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AiError,
    StoreError,
    UpdateError,
    ValidationError,
    ServerError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    relations,
    example_analysis_result,
    AnalysisResult,
    DetectedEntity,
    EntityFeatures,
    EntityKind,
    RiskLevel,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    is_valid,
    validate,
    is_valid_analysis_result,
    validate_analysis_result,
};

// =============================================================================
// Re-exports - Knowledge Store
// =============================================================================

pub use graph::{
    FeatureRow,
    KnowledgeStore,
    Triple,
    DEFAULT_DB_PATH,
};

// =============================================================================
// Re-exports - Updater
// =============================================================================

pub use updater::{
    KnowledgeUpdater,
    Priority,
    Suggestion,
    UpdateOptions,
    UpdateRecord,
    UpdateStats,
};

// =============================================================================
// Re-exports - AI Client
// =============================================================================

pub use ai::AiClient;

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{
    UpdateReport,
    ReportMetadata,
    error_response,
};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
