//! SylvaScan - Frontend configuration library
//!
//! Client-side configuration for the SylvaScan forest health platform:
//! API origin resolution, upload limits, analysis defaults, UI colour maps
//! and the development toolchain descriptor, plus the wire types shared
//! with the backend.
//!
//! # Modules
//!
//! - [`config`] - Configuration constants and the resolved snapshot
//! - [`dev`] - Development toolchain descriptor
//! - [`types`] - Wire types shared with the backend

// =============================================================================
// Module declarations
// =============================================================================

pub mod config;
pub mod dev;
pub mod types;

// =============================================================================
// Re-exports
// =============================================================================

// Configuration
pub use config::{
    AnalysisConfig, ApiConfig, AppConfig, EntityColors, RiskColors, UiConfig, UploadConfig,
    CONFIG,
};

// Dev descriptor
pub use dev::{DevConfig, DevServer, PathAlias, ProxyRule};

// Types
pub use types::{
    // Entities
    EntityKind, RiskLevel,
    // Analysis
    AnalysisResult, DetectedEntity,
    // Logs
    LogEntry, LogLevel,
    // Reports
    ReportMetadata, UpdateReport, UpdateStats,
};
