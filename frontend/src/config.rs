//! Application configuration.
//!
//! Centralized configuration for the SylvaScan frontend. Everything the
//! client needs to agree on with the backend and the dev tooling lives
//! here: API origin, upload limits, analysis defaults and UI colours.
//!
//! Constants are grouped by concern ([`api`], [`upload`], [`analysis`],
//! [`ui`]); [`AppConfig`] bundles a resolved snapshot of all of them.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Backend API settings.
pub mod api {
    use std::env;
    use std::time::Duration;

    /// Default backend origin.
    ///
    /// The SylvaScan knowledge backend in local development.
    pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

    /// Environment variable overriding the backend origin.
    ///
    /// The only environment knob the frontend reads.
    pub const BASE_URL_ENV: &str = "SYLVASCAN_API_BASE_URL";

    /// General request timeout.
    pub const TIMEOUT: Duration = Duration::from_millis(30_000);

    /// Extended timeout for image analysis requests.
    pub const IMAGE_ANALYSIS_TIMEOUT: Duration = Duration::from_millis(60_000);

    /// Resolve the backend origin.
    ///
    /// Returns the override variable's value verbatim when it is set and
    /// non-empty, the default otherwise.
    pub fn base_url() -> String {
        match env::var(BASE_URL_ENV) {
            Ok(value) if !value.is_empty() => value,
            _ => DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Image upload limits.
pub mod upload {
    /// One accepted image format.
    #[derive(Clone, Copy, Debug)]
    pub struct ImageFormat {
        /// Human-readable name
        pub label: &'static str,
        /// MIME type
        pub mime: &'static str,
        /// Canonical file extension
        pub extension: &'static str,
    }

    /// Accepted upload formats, in fixed order.
    ///
    /// Single source of truth: the MIME and extension lists below are
    /// derived from this table index by index.
    pub const FORMATS: [ImageFormat; 3] = [
        ImageFormat { label: "JPEG", mime: "image/jpeg", extension: ".jpg" },
        ImageFormat { label: "PNG", mime: "image/png", extension: ".png" },
        ImageFormat { label: "GIF", mime: "image/gif", extension: ".gif" },
    ];

    /// Maximum upload size in bytes (10 MiB).
    pub const MAX_SIZE: u64 = 10 * 1024 * 1024;

    /// Accepted MIME types.
    pub const ACCEPTED_TYPES: [&str; 3] = [FORMATS[0].mime, FORMATS[1].mime, FORMATS[2].mime];

    /// Accepted file extensions.
    pub const ACCEPTED_EXTENSIONS: [&str; 3] =
        [FORMATS[0].extension, FORMATS[1].extension, FORMATS[2].extension];

    /// Check a MIME type against the accepted list.
    pub fn is_accepted_type(mime: &str) -> bool {
        ACCEPTED_TYPES.iter().any(|accepted| *accepted == mime)
    }

    /// Check a file name against the accepted extensions, case-insensitive.
    pub fn is_accepted_extension(file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        // ".jpeg" is tolerated as an alias of ".jpg"
        lower.ends_with(".jpeg") || ACCEPTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
    }
}

/// Analysis defaults.
pub mod analysis {
    use std::time::Duration;

    /// Default confidence threshold for displaying detections.
    pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

    /// Default analysis mode.
    pub const DEFAULT_ANALYSIS_MODE: &str = "full";

    /// Polling cadence for long-running analysis progress.
    pub const PROGRESS_UPDATE_INTERVAL: Duration = Duration::from_millis(1_000);
}

/// UI colour maps.
pub mod ui {
    use crate::types::{EntityKind, RiskLevel};

    /// Colour for insect detections.
    pub const INSECT_COLOR: &str = "#f56c6c";
    /// Colour for tree detections.
    pub const TREE_COLOR: &str = "#67c23a";
    /// Colour for disease symptom detections.
    pub const DISEASE_SYMPTOM_COLOR: &str = "#e6a23c";
    /// Colour for environment detections.
    pub const ENVIRONMENT_COLOR: &str = "#409eff";

    /// Colour for high risk.
    pub const RISK_HIGH_COLOR: &str = "#f56c6c";
    /// Colour for medium risk.
    pub const RISK_MEDIUM_COLOR: &str = "#e6a23c";
    /// Colour for low risk.
    pub const RISK_LOW_COLOR: &str = "#67c23a";

    /// Display colour of an entity kind.
    ///
    /// Only the four documented kinds have a colour.
    pub fn entity_color(kind: EntityKind) -> Option<&'static str> {
        match kind {
            EntityKind::Insect => Some(INSECT_COLOR),
            EntityKind::Tree => Some(TREE_COLOR),
            EntityKind::DiseaseSymptom => Some(DISEASE_SYMPTOM_COLOR),
            EntityKind::Environment => Some(ENVIRONMENT_COLOR),
            _ => None,
        }
    }

    /// Display colour of a risk level.
    pub fn risk_color(level: RiskLevel) -> &'static str {
        match level {
            RiskLevel::High => RISK_HIGH_COLOR,
            RiskLevel::Medium => RISK_MEDIUM_COLOR,
            RiskLevel::Low => RISK_LOW_COLOR,
        }
    }
}

// =============================================================================
// Aggregate snapshot
// =============================================================================

/// Resolved API settings (wire form).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Backend origin after applying the environment override
    pub base_url: String,
    /// General request timeout in milliseconds
    pub timeout_ms: u64,
    /// Image analysis timeout in milliseconds
    pub image_analysis_timeout_ms: u64,
}

/// Upload limits (wire form).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadConfig {
    /// Maximum upload size in bytes
    pub max_size: u64,
    /// Accepted MIME types
    pub accepted_types: Vec<String>,
    /// Accepted file extensions
    pub accepted_extensions: Vec<String>,
}

/// Analysis defaults (wire form).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Default confidence threshold
    pub default_confidence_threshold: f64,
    /// Default analysis mode
    pub default_analysis_mode: String,
    /// Progress polling cadence in milliseconds
    pub progress_update_interval_ms: u64,
}

/// Entity colours, keyed by wire code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityColors {
    pub insect: String,
    pub tree: String,
    pub disease_symptom: String,
    pub environment: String,
}

/// Risk colours, keyed by wire code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskColors {
    pub high: String,
    pub medium: String,
    pub low: String,
}

/// UI colour maps (wire form).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    /// Entity kind colours
    pub entity_colors: EntityColors,
    /// Risk level colours
    pub risk_colors: RiskColors,
}

/// Full configuration snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Backend API settings
    pub api: ApiConfig,
    /// Upload limits
    pub upload: UploadConfig,
    /// Analysis defaults
    pub analysis: AnalysisConfig,
    /// UI colour maps
    pub ui: UiConfig,
}

impl AppConfig {
    /// Build a snapshot with the environment override applied.
    pub fn resolve() -> Self {
        AppConfig {
            api: ApiConfig {
                base_url: api::base_url(),
                timeout_ms: api::TIMEOUT.as_millis() as u64,
                image_analysis_timeout_ms: api::IMAGE_ANALYSIS_TIMEOUT.as_millis() as u64,
            },
            upload: UploadConfig {
                max_size: upload::MAX_SIZE,
                accepted_types: upload::ACCEPTED_TYPES.iter().map(|s| s.to_string()).collect(),
                accepted_extensions: upload::ACCEPTED_EXTENSIONS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
            analysis: AnalysisConfig {
                default_confidence_threshold: analysis::DEFAULT_CONFIDENCE_THRESHOLD,
                default_analysis_mode: analysis::DEFAULT_ANALYSIS_MODE.to_string(),
                progress_update_interval_ms: analysis::PROGRESS_UPDATE_INTERVAL.as_millis() as u64,
            },
            ui: UiConfig {
                entity_colors: EntityColors {
                    insect: ui::INSECT_COLOR.to_string(),
                    tree: ui::TREE_COLOR.to_string(),
                    disease_symptom: ui::DISEASE_SYMPTOM_COLOR.to_string(),
                    environment: ui::ENVIRONMENT_COLOR.to_string(),
                },
                risk_colors: RiskColors {
                    high: ui::RISK_HIGH_COLOR.to_string(),
                    medium: ui::RISK_MEDIUM_COLOR.to_string(),
                    low: ui::RISK_LOW_COLOR.to_string(),
                },
            },
        }
    }
}

/// Process-wide configuration snapshot, resolved on first use.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::resolve);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityKind, RiskLevel};
    use std::env;

    #[test]
    fn test_max_size_is_ten_mebibytes() {
        assert_eq!(upload::MAX_SIZE, 10_485_760);
    }

    #[test]
    fn test_format_table_derives_both_lists() {
        assert_eq!(upload::FORMATS.len(), 3);
        for (i, format) in upload::FORMATS.iter().enumerate() {
            assert_eq!(upload::ACCEPTED_TYPES[i], format.mime);
            assert_eq!(upload::ACCEPTED_EXTENSIONS[i], format.extension);
        }
        assert_eq!(
            upload::ACCEPTED_TYPES,
            ["image/jpeg", "image/png", "image/gif"]
        );
        assert_eq!(upload::ACCEPTED_EXTENSIONS, [".jpg", ".png", ".gif"]);
    }

    #[test]
    fn test_accepted_type_is_exact() {
        assert!(upload::is_accepted_type("image/jpeg"));
        assert!(upload::is_accepted_type("image/gif"));
        assert!(!upload::is_accepted_type("image/webp"));
        assert!(!upload::is_accepted_type("IMAGE/JPEG"));
    }

    #[test]
    fn test_accepted_extension_tolerates_jpeg_alias() {
        assert!(upload::is_accepted_extension("crown.jpg"));
        assert!(upload::is_accepted_extension("crown.JPG"));
        assert!(upload::is_accepted_extension("crown.jpeg"));
        assert!(upload::is_accepted_extension("bark.PNG"));
        assert!(upload::is_accepted_extension("trap.gif"));
        assert!(!upload::is_accepted_extension("scan.webp"));
        assert!(!upload::is_accepted_extension("notes.txt"));
    }

    #[test]
    fn test_analysis_timeout_exceeds_general_timeout() {
        assert!(api::IMAGE_ANALYSIS_TIMEOUT > api::TIMEOUT);
        assert_eq!(api::TIMEOUT.as_millis(), 30_000);
        assert_eq!(api::IMAGE_ANALYSIS_TIMEOUT.as_millis(), 60_000);
    }

    #[test]
    fn test_analysis_defaults() {
        assert_eq!(analysis::DEFAULT_CONFIDENCE_THRESHOLD, 0.5);
        assert_eq!(analysis::DEFAULT_ANALYSIS_MODE, "full");
        assert_eq!(analysis::PROGRESS_UPDATE_INTERVAL.as_millis(), 1_000);
    }

    #[test]
    fn test_entity_colors() {
        assert_eq!(ui::entity_color(EntityKind::Insect), Some("#f56c6c"));
        assert_eq!(ui::entity_color(EntityKind::Tree), Some("#67c23a"));
        assert_eq!(ui::entity_color(EntityKind::DiseaseSymptom), Some("#e6a23c"));
        assert_eq!(ui::entity_color(EntityKind::Environment), Some("#409eff"));
        assert_eq!(ui::entity_color(EntityKind::Vehicle), None);
        assert_eq!(ui::entity_color(EntityKind::Other), None);
    }

    #[test]
    fn test_risk_colors() {
        assert_eq!(ui::risk_color(RiskLevel::High), "#f56c6c");
        assert_eq!(ui::risk_color(RiskLevel::Medium), "#e6a23c");
        assert_eq!(ui::risk_color(RiskLevel::Low), "#67c23a");
    }

    #[test]
    fn test_base_url_env_override() {
        // cargo test runs tests in parallel threads; all env access
        // (including the first CONFIG touch) stays in this single test.
        let saved = env::var(api::BASE_URL_ENV).ok();

        env::remove_var(api::BASE_URL_ENV);
        assert_eq!(api::base_url(), api::DEFAULT_BASE_URL);

        env::set_var(api::BASE_URL_ENV, "http://10.1.2.3:9000");
        assert_eq!(api::base_url(), "http://10.1.2.3:9000");

        // Values pass through verbatim, spaces included
        env::set_var(api::BASE_URL_ENV, " http://spaced ");
        assert_eq!(api::base_url(), " http://spaced ");

        // Empty counts as unset
        env::set_var(api::BASE_URL_ENV, "");
        assert_eq!(api::base_url(), api::DEFAULT_BASE_URL);

        // The dev proxy resolves through the same function
        env::set_var(api::BASE_URL_ENV, "http://backend.test:8000");
        let dev = crate::dev::DevConfig::resolve();
        assert_eq!(dev.dev_server.proxy[0].target, "http://backend.test:8000");

        // And so does the aggregate snapshot
        let snapshot = AppConfig::resolve();
        assert_eq!(snapshot.api.base_url, "http://backend.test:8000");
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["api"]["baseUrl"], "http://backend.test:8000");
        assert!(value["upload"]["acceptedTypes"].is_array());
        assert_eq!(value["ui"]["entityColors"]["disease_symptom"], "#e6a23c");

        match saved {
            Some(value) => env::set_var(api::BASE_URL_ENV, value),
            None => env::remove_var(api::BASE_URL_ENV),
        }

        // Env-independent fields of the shared snapshot
        assert_eq!(CONFIG.api.timeout_ms, 30_000);
        assert_eq!(CONFIG.upload.max_size, upload::MAX_SIZE);
        assert_eq!(CONFIG.analysis.default_analysis_mode, "full");
        assert_eq!(CONFIG.ui.risk_colors.low, "#67c23a");
    }
}
