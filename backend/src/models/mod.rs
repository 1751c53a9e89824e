//! Domain models for the SylvaScan knowledge backend.
//!
//! This module contains the core data structures shared across the crate:
//!
//! - [`AnalysisResult`] - Complete image analysis result with all detections
//! - [`DetectedEntity`] - A single detected entity with scores and features
//! - [`EntityFeatures`] - Visual features extracted for an entity
//! - [`EntityKind`] - Recognised entity categories (insect, tree, etc.)
//! - [`RiskLevel`] - Overall risk assessment of an analysis
//! - [`relations`] - Canonical relation labels used in knowledge triples

use serde::{Deserialize, Serialize};

// =============================================================================
// Entity Kind
// =============================================================================

/// Category of a detected entity.
///
/// Codes are the snake_case strings produced by the analysis service.
/// Unknown codes deserialize to [`EntityKind::Other`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Insect pest.
    Insect,
    /// Visible disease symptom (lesion, discoloration, etc.).
    DiseaseSymptom,
    /// Tree.
    Tree,
    /// Non-tree plant.
    Plant,
    /// Environmental factor (moisture, light, soil).
    Environment,
    /// Vehicle.
    Vehicle,
    /// Building or man-made facility.
    Building,
    /// Natural surroundings (rock, water, sky).
    Natural,
    /// Industrial object.
    Industrial,
    /// Anything else.
    #[serde(other)]
    Other,
}

impl EntityKind {
    /// Parse a kind from its code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "insect" => Some(Self::Insect),
            "disease_symptom" => Some(Self::DiseaseSymptom),
            "tree" => Some(Self::Tree),
            "plant" => Some(Self::Plant),
            "environment" => Some(Self::Environment),
            "vehicle" => Some(Self::Vehicle),
            "building" => Some(Self::Building),
            "natural" => Some(Self::Natural),
            "industrial" => Some(Self::Industrial),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Convert to the code string.
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::Insect => "insect",
            Self::DiseaseSymptom => "disease_symptom",
            Self::Tree => "tree",
            Self::Plant => "plant",
            Self::Environment => "environment",
            Self::Vehicle => "vehicle",
            Self::Building => "building",
            Self::Natural => "natural",
            Self::Industrial => "industrial",
            Self::Other => "other",
        }
    }

    /// Classification label used as the tail of "is a" triples.
    ///
    /// Trees classify as plants, so both [`EntityKind::Tree`] and
    /// [`EntityKind::Plant`] map to "plant".
    pub fn category_label(&self) -> &'static str {
        match self {
            Self::Insect => "insect",
            Self::DiseaseSymptom => "symptom",
            Self::Tree | Self::Plant => "plant",
            Self::Environment => "environmental factor",
            Self::Vehicle => "vehicle",
            Self::Building => "building",
            Self::Natural => "natural environment",
            Self::Industrial => "industrial object",
            Self::Other => "other",
        }
    }
}

// =============================================================================
// Risk Level
// =============================================================================

/// Overall risk assessment attached to an analysis result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Parse a risk level from its code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Convert to the code string.
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

// =============================================================================
// Entity Features
// =============================================================================

/// Visual features extracted for a detected entity.
///
/// The analysis service may attach feature keys beyond the known three;
/// they are preserved in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntityFeatures {
    /// Dominant colour name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_color: Option<String>,
    /// Bounding area in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    /// Texture roughness score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture_roughness: Option<f64>,
    /// Any additional feature keys.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EntityFeatures {
    /// Whether no features are present at all.
    pub fn is_empty(&self) -> bool {
        self.dominant_color.is_none()
            && self.area.is_none()
            && self.texture_roughness.is_none()
            && self.extra.is_empty()
    }
}

// =============================================================================
// Detected Entity
// =============================================================================

/// A single entity detected in an analysed image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedEntity {
    /// Name reported by the analysis service.
    pub name: String,
    /// Entity category.
    pub kind: EntityKind,
    /// Detection confidence (0.0 - 1.0).
    pub confidence: f64,
    /// Similarity to the closest known knowledge-base entity (0.0 - 1.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    /// Name of the matched knowledge-base entity, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_kb_entity: Option<String>,
    /// Extracted visual features.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<EntityFeatures>,
}

impl DetectedEntity {
    /// Create an entity with just a name, kind and confidence.
    pub fn new(name: impl Into<String>, kind: EntityKind, confidence: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            confidence,
            similarity: None,
            matched_kb_entity: None,
            features: None,
        }
    }

    /// Similarity score, treating absent as fully novel.
    pub fn similarity_or_zero(&self) -> f64 {
        self.similarity.unwrap_or(0.0)
    }
}

// =============================================================================
// Analysis Result
// =============================================================================

fn default_analysis_mode() -> String {
    "full".to_string()
}

/// A complete image analysis result as produced by the analysis service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Analysis mode ("full", "quick", ...). Defaults to "full".
    #[serde(default = "default_analysis_mode")]
    pub analysis_mode: String,
    /// All entities detected in the image.
    #[serde(default)]
    pub detected_entities: Vec<DetectedEntity>,
    /// Overall risk assessment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
}

impl AnalysisResult {
    /// Create an empty result in the default mode.
    pub fn new() -> Self {
        Self {
            analysis_mode: default_analysis_mode(),
            detected_entities: Vec::new(),
            risk_level: None,
        }
    }
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Relation Labels
// =============================================================================

/// Canonical relation labels used in knowledge triples.
pub mod relations {
    /// Entity classification ("X is a plant").
    pub const IS_A: &str = "is a";
    /// Dominant colour feature.
    pub const HAS_COLOR: &str = "has color";
    /// Size class feature (large / medium / small).
    pub const HAS_SIZE: &str = "has size";
    /// Texture feature.
    pub const HAS_TEXTURE: &str = "has texture";
    /// An insect transmits a disease symptom.
    pub const TRANSMITS: &str = "transmits";
    /// A tree is susceptible to a disease symptom.
    pub const SUSCEPTIBLE_TO: &str = "susceptible to";
    /// An insect is hosted by a tree.
    pub const HOSTED_BY: &str = "hosted by";

    /// Relations the inference layer is allowed to propose between entities.
    pub const DEFAULT_VALID_RELATIONS: [&str; 3] = [TRANSMITS, SUSCEPTIBLE_TO, HOSTED_BY];
}

// =============================================================================
// Example Result
// =============================================================================

/// Canonical sample analysis result used by the CLI and tests.
///
/// Contains one novel insect (high confidence, low similarity) and one
/// well-matched tree, so an update run against an empty store adds the
/// insect, links it to the tree, and refreshes the tree's features.
pub fn example_analysis_result() -> AnalysisResult {
    let mut insect_features = EntityFeatures::default();
    insect_features.dominant_color = Some("dark brown".to_string());
    insect_features.area = Some(5600.0);
    insect_features.texture_roughness = Some(132.0);

    let mut tree_features = EntityFeatures::default();
    tree_features.dominant_color = Some("green".to_string());
    tree_features.area = Some(182_000.0);

    AnalysisResult {
        analysis_mode: "full".to_string(),
        detected_entities: vec![
            DetectedEntity {
                name: "pine sawyer beetle".to_string(),
                kind: EntityKind::Insect,
                confidence: 0.85,
                similarity: Some(0.32),
                matched_kb_entity: None,
                features: Some(insect_features),
            },
            DetectedEntity {
                name: "masson pine".to_string(),
                kind: EntityKind::Tree,
                confidence: 0.92,
                similarity: Some(0.88),
                matched_kb_entity: Some("masson pine".to_string()),
                features: Some(tree_features),
            },
        ],
        risk_level: Some(RiskLevel::High),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_from_code() {
        assert_eq!(EntityKind::from_code("insect"), Some(EntityKind::Insect));
        assert_eq!(
            EntityKind::from_code("DISEASE_SYMPTOM"),
            Some(EntityKind::DiseaseSymptom)
        );
        assert_eq!(EntityKind::from_code(" tree "), Some(EntityKind::Tree));
        assert_eq!(EntityKind::from_code("coleoptera"), None);
    }

    #[test]
    fn test_entity_kind_roundtrip() {
        for kind in [
            EntityKind::Insect,
            EntityKind::DiseaseSymptom,
            EntityKind::Tree,
            EntityKind::Environment,
            EntityKind::Other,
        ] {
            assert_eq!(EntityKind::from_code(kind.to_code()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_kind_deserializes_to_other() {
        let kind: EntityKind = serde_json::from_str("\"spacecraft\"").unwrap();
        assert_eq!(kind, EntityKind::Other);
    }

    #[test]
    fn test_trees_classify_as_plants() {
        assert_eq!(EntityKind::Tree.category_label(), "plant");
        assert_eq!(EntityKind::Plant.category_label(), "plant");
    }

    #[test]
    fn test_risk_level_roundtrip() {
        assert_eq!(RiskLevel::from_code("HIGH"), Some(RiskLevel::High));
        assert_eq!(RiskLevel::from_code(RiskLevel::Medium.to_code()), Some(RiskLevel::Medium));
        assert_eq!(RiskLevel::from_code("severe"), None);
    }

    #[test]
    fn test_analysis_result_serialization() {
        let result = example_analysis_result();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"detectedEntities\""));
        assert!(json.contains("\"matchedKbEntity\""));
        assert!(json.contains("\"analysisMode\":\"full\""));
        assert!(json.contains("\"riskLevel\":\"high\""));
    }

    #[test]
    fn test_analysis_mode_defaults_to_full() {
        let result: AnalysisResult = serde_json::from_str(r#"{"detectedEntities":[]}"#).unwrap();
        assert_eq!(result.analysis_mode, "full");
        assert!(result.detected_entities.is_empty());
    }

    #[test]
    fn test_extra_features_preserved() {
        let json = r#"{"dominantColor":"green","area":1200.0,"leafShape":"needle"}"#;
        let features: EntityFeatures = serde_json::from_str(json).unwrap();
        assert_eq!(features.dominant_color.as_deref(), Some("green"));
        assert_eq!(features.extra.get("leafShape").and_then(|v| v.as_str()), Some("needle"));
        assert!(!features.is_empty());
    }
}
