//! Knowledge graph updater.
//!
//! Consumes image analysis results and keeps the knowledge graph current:
//! novel high-confidence entities become new nodes with feature triples,
//! co-detected entities get linked through fixed kind rules, remaining
//! unrelated pairs can be submitted to the AI for relation inference, and
//! well-matched known entities get their stored features refreshed.
//!
//! # Example
//!
//! ```rust,ignore
//! use sylvascan::graph::KnowledgeStore;
//! use sylvascan::updater::KnowledgeUpdater;
//! use sylvascan::models::example_analysis_result;
//!
//! let store = KnowledgeStore::open_default().await?;
//! let updater = KnowledgeUpdater::new(store);
//! let stats = updater.process(&example_analysis_result()).await?;
//! println!("added {} entities", stats.new_entities_added);
//! ```

pub mod rules;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai::AiClient;
use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::error::{UpdateResult, ValidationError};
use crate::graph::KnowledgeStore;
use crate::models::{relations, AnalysisResult, DetectedEntity, EntityFeatures, EntityKind};
use crate::validation::validate_analysis_result;

// =============================================================================
// Thresholds
// =============================================================================

/// At or below this similarity a detection counts as novel.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Below this confidence a detection is ignored entirely.
pub const CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Unmatched detections need more than this confidence to become entities.
pub const NEW_ENTITY_MIN_CONFIDENCE: f64 = 0.7;

/// Matched detections above this similarity get their features refreshed.
pub const FEATURE_REFRESH_MIN_SIMILARITY: f64 = 0.7;

/// Prefix the analysis service puts on names it could not identify.
pub const UNKNOWN_ENTITY_PREFIX: &str = "unknown entity:";

/// Area above which an entity counts as large (pixels).
const LARGE_AREA: f64 = 10_000.0;

/// Area above which an entity counts as medium (pixels).
const MEDIUM_AREA: f64 = 5_000.0;

/// Texture roughness above which an entity counts as rough.
const ROUGH_TEXTURE: f64 = 100.0;

// =============================================================================
// Options
// =============================================================================

/// Options for a knowledge update run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOptions {
    /// Novelty cutoff, see [`SIMILARITY_THRESHOLD`].
    pub similarity_threshold: f64,

    /// Ignore detections below this confidence.
    pub confidence_threshold: f64,

    /// Minimum confidence for adding an unmatched entity.
    pub new_entity_min_confidence: f64,

    /// Ask the AI about entity pairs no rule or triple covers.
    pub infer_relations: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            similarity_threshold: SIMILARITY_THRESHOLD,
            confidence_threshold: CONFIDENCE_THRESHOLD,
            new_entity_min_confidence: NEW_ENTITY_MIN_CONFIDENCE,
            infer_relations: true,
        }
    }
}

// =============================================================================
// Run Statistics
// =============================================================================

/// One mutation applied during an update run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateRecord {
    /// A new entity node with its classification and feature triples.
    #[serde(rename_all = "camelCase")]
    NewEntity {
        entity: String,
        kind: EntityKind,
        confidence: f64,
    },
    /// A new triple between two entities.
    #[serde(rename_all = "camelCase")]
    NewRelation {
        head: String,
        relation: String,
        tail: String,
    },
    /// Stored features of a known entity were refreshed.
    #[serde(rename_all = "camelCase")]
    FeaturesUpdated { entity: String, count: usize },
}

/// Statistics of one update run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStats {
    /// Entities added to the graph.
    pub new_entities_added: usize,
    /// Relations added between entities.
    pub new_relations_added: usize,
    /// Entities whose stored features were refreshed.
    pub features_updated: usize,
    /// Detections ignored for low confidence.
    pub skipped_low_confidence: usize,
    /// Every mutation, in order.
    pub updates: Vec<UpdateRecord>,
}

impl UpdateStats {
    /// Whether the run changed anything.
    pub fn is_unchanged(&self) -> bool {
        self.updates.is_empty()
    }
}

// =============================================================================
// Suggestions
// =============================================================================

/// Priority of an update suggestion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// A suggested (not applied) knowledge graph change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Suggestion {
    /// A novel entity worth adding.
    #[serde(rename_all = "camelCase")]
    AddEntity {
        priority: Priority,
        entity_name: String,
        kind: EntityKind,
        confidence: f64,
        similarity: f64,
        reason: String,
        action: String,
    },
    /// A known entity with fresh feature information.
    #[serde(rename_all = "camelCase")]
    UpdateFeatures {
        priority: Priority,
        entity_name: String,
        new_features: EntityFeatures,
        reason: String,
        action: String,
    },
    /// Several entities in one image may stand in unrecorded relations.
    #[serde(rename_all = "camelCase")]
    DiscoverRelations {
        priority: Priority,
        entities: Vec<String>,
        reason: String,
        action: String,
    },
}

// =============================================================================
// Updater
// =============================================================================

/// Applies analysis results to the knowledge graph.
pub struct KnowledgeUpdater {
    store: KnowledgeStore,
    ai: Option<AiClient>,
    options: UpdateOptions,
}

impl KnowledgeUpdater {
    /// Create an updater with default options and no AI client.
    pub fn new(store: KnowledgeStore) -> Self {
        Self {
            store,
            ai: None,
            options: UpdateOptions::default(),
        }
    }

    /// Attach an AI client for relation discovery.
    pub fn with_ai(mut self, client: AiClient) -> Self {
        self.ai = Some(client);
        self
    }

    /// Override the run options.
    pub fn with_options(mut self, options: UpdateOptions) -> Self {
        self.options = options;
        self
    }

    /// The underlying knowledge store.
    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    /// Validate a raw JSON result, then process it.
    pub async fn process_value(&self, value: &Value) -> UpdateResult<UpdateStats> {
        validate_analysis_result(value)?;
        let result: AnalysisResult =
            serde_json::from_value(value.clone()).map_err(ValidationError::from)?;
        self.process(&result).await
    }

    /// Process an analysis result and update the knowledge graph.
    ///
    /// Per detected entity, in order: low-confidence detections are counted
    /// and skipped; detections similar to known entities are left alone;
    /// already-stored candidates are left alone; the rest become new nodes
    /// when unmatched and confident enough. Afterwards, one pass applies
    /// kind-rule relations, strong matches get their features refreshed,
    /// and remaining unrelated pairs go to the AI (when configured).
    pub async fn process(&self, result: &AnalysisResult) -> UpdateResult<UpdateStats> {
        let entities = &result.detected_entities;
        log_info(format!(
            "🧠 Processing analysis result ({} entities, mode: {})...",
            entities.len(),
            result.analysis_mode
        ));

        let mut stats = UpdateStats::default();

        for entity in entities {
            let candidate = candidate_name(&entity.name);

            if candidate.is_empty() {
                log_warning("Ignoring detection with an empty name");
                continue;
            }

            if entity.confidence < self.options.confidence_threshold {
                stats.skipped_low_confidence += 1;
                log_info_indent(
                    format!("Skipping '{}' (confidence {:.2})", candidate, entity.confidence),
                    1,
                );
                continue;
            }

            if entity.similarity_or_zero() > self.options.similarity_threshold {
                // Close enough to a known entity, nothing to add
                continue;
            }

            if self.store.entity_exists(candidate).await? {
                log_info_indent(format!("'{}' already in the graph, skipping", candidate), 1);
                continue;
            }

            if entity.matched_kb_entity.is_none()
                && entity.confidence > self.options.new_entity_min_confidence
            {
                self.add_entity(candidate, entity, &mut stats).await?;
            }
        }

        if entities.len() > 1 {
            self.apply_rule_relations(entities, &mut stats).await?;
        }

        self.refresh_matched_features(entities, &mut stats).await?;

        if self.options.infer_relations {
            self.discover_relations(entities, &mut stats).await?;
        }

        log_success(format!(
            "Update complete: +{} entities, +{} relations, {} features refreshed, {} skipped",
            stats.new_entities_added,
            stats.new_relations_added,
            stats.features_updated,
            stats.skipped_low_confidence
        ));
        Ok(stats)
    }

    /// Add a new entity node: classification triple plus feature triples.
    async fn add_entity(
        &self,
        candidate: &str,
        entity: &DetectedEntity,
        stats: &mut UpdateStats,
    ) -> UpdateResult<()> {
        self.store
            .insert_triple(candidate, relations::IS_A, entity.kind.category_label())
            .await?;

        if let Some(features) = &entity.features {
            self.add_feature_triples(candidate, features).await?;
        }

        stats.new_entities_added += 1;
        stats.updates.push(UpdateRecord::NewEntity {
            entity: candidate.to_string(),
            kind: entity.kind,
            confidence: entity.confidence,
        });

        log_success(format!(
            "🌱 Added new entity: {} ({})",
            candidate,
            entity.kind.to_code()
        ));
        Ok(())
    }

    /// Derive triples from visual features.
    async fn add_feature_triples(
        &self,
        name: &str,
        features: &EntityFeatures,
    ) -> UpdateResult<()> {
        if let Some(color) = &features.dominant_color {
            self.store
                .insert_triple(name, relations::HAS_COLOR, color)
                .await?;
        }

        if let Some(area) = features.area {
            let size = if area > LARGE_AREA {
                "large"
            } else if area > MEDIUM_AREA {
                "medium"
            } else {
                "small"
            };
            self.store
                .insert_triple(name, relations::HAS_SIZE, size)
                .await?;
        }

        if features.texture_roughness.is_some_and(|t| t > ROUGH_TEXTURE) {
            self.store
                .insert_triple(name, relations::HAS_TEXTURE, "rough")
                .await?;
        }

        Ok(())
    }

    /// One pass of the fixed kind rules over all detected entity pairs.
    async fn apply_rule_relations(
        &self,
        entities: &[DetectedEntity],
        stats: &mut UpdateStats,
    ) -> UpdateResult<()> {
        for head in entities {
            for tail in entities {
                if let Some(relation) = rules::rule_relation(head.kind, tail.kind) {
                    self.add_relation_if_new(
                        &resolved_name(head),
                        relation,
                        &resolved_name(tail),
                        stats,
                    )
                    .await?;
                }
            }
        }
        Ok(())
    }

    /// Refresh stored features of well-matched known entities.
    async fn refresh_matched_features(
        &self,
        entities: &[DetectedEntity],
        stats: &mut UpdateStats,
    ) -> UpdateResult<()> {
        for entity in entities {
            let (Some(matched), Some(features)) = (&entity.matched_kb_entity, &entity.features)
            else {
                continue;
            };

            if entity.similarity_or_zero() > FEATURE_REFRESH_MIN_SIMILARITY && !features.is_empty()
            {
                let count = self.update_entity_features(matched, features).await?;
                if count > 0 {
                    stats.features_updated += 1;
                    stats.updates.push(UpdateRecord::FeaturesUpdated {
                        entity: matched.clone(),
                        count,
                    });
                }
            }
        }
        Ok(())
    }

    /// Ask the AI about pairs no triple links yet.
    ///
    /// Per-pair failures are logged and skipped so one bad call cannot
    /// abort the whole run.
    async fn discover_relations(
        &self,
        entities: &[DetectedEntity],
        stats: &mut UpdateStats,
    ) -> UpdateResult<()> {
        if entities.len() < 2 {
            return Ok(());
        }

        let valid = self.store.valid_relations().await?;
        if valid.is_empty() {
            return Ok(());
        }

        let Some(ai) = &self.ai else {
            log_info("(no AI client configured, skipping relation discovery)");
            return Ok(());
        };

        for (i, entity_a) in entities.iter().enumerate() {
            for entity_b in &entities[i + 1..] {
                let name_a = resolved_name(entity_a);
                let name_b = resolved_name(entity_b);

                if name_a == name_b || self.store.any_relation_between(&name_a, &name_b).await? {
                    continue;
                }

                match ai.infer_relation(&name_a, &name_b, &valid).await {
                    Ok(Some(relation)) => {
                        self.add_relation_if_new(&name_a, &relation, &name_b, stats)
                            .await?;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        log_warning(format!(
                            "Relation inference failed: {} <-> {}: {}",
                            name_a, name_b, e
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Insert a triple and record it if it was actually new.
    async fn add_relation_if_new(
        &self,
        head: &str,
        relation: &str,
        tail: &str,
        stats: &mut UpdateStats,
    ) -> UpdateResult<()> {
        if head.is_empty() || tail.is_empty() {
            return Ok(());
        }

        if self.store.insert_triple(head, relation, tail).await? {
            stats.new_relations_added += 1;
            stats.updates.push(UpdateRecord::NewRelation {
                head: head.to_string(),
                relation: relation.to_string(),
                tail: tail.to_string(),
            });
            log_info(format!("🔗 {} --[{}]--> {}", head, relation, tail));
        }
        Ok(())
    }

    /// Upsert feature values for an entity. Returns how many were written.
    pub async fn update_entity_features(
        &self,
        entity: &str,
        features: &EntityFeatures,
    ) -> UpdateResult<usize> {
        let mut count = 0;

        if let Some(color) = &features.dominant_color {
            self.store
                .upsert_feature(entity, "dominantColor", color)
                .await?;
            count += 1;
        }

        if let Some(area) = features.area {
            self.store
                .upsert_feature(entity, "area", &area.to_string())
                .await?;
            count += 1;
        }

        if let Some(texture) = features.texture_roughness {
            self.store
                .upsert_feature(entity, "textureRoughness", &texture.to_string())
                .await?;
            count += 1;
        }

        for (key, value) in &features.extra {
            self.store
                .upsert_feature(entity, key, &feature_value_string(value))
                .await?;
            count += 1;
        }

        if count > 0 {
            log_success(format!("Refreshed {} feature(s) of '{}'", count, entity));
        }
        Ok(count)
    }

    /// Advisory suggestions for an analysis result. Reads nothing, writes
    /// nothing.
    pub fn suggestions(&self, result: &AnalysisResult) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        for entity in &result.detected_entities {
            let similarity = entity.similarity_or_zero();

            if similarity < self.options.similarity_threshold
                && entity.confidence > self.options.confidence_threshold
            {
                suggestions.push(Suggestion::AddEntity {
                    priority: Priority::High,
                    entity_name: entity.name.clone(),
                    kind: entity.kind,
                    confidence: entity.confidence,
                    similarity,
                    reason: format!(
                        "high confidence ({:.2}) but low similarity ({:.2})",
                        entity.confidence, similarity
                    ),
                    action: format!(
                        "add '{}' as a new {} entity",
                        entity.name,
                        entity.kind.to_code()
                    ),
                });
            }

            if let Some(matched) = &entity.matched_kb_entity {
                if similarity > FEATURE_REFRESH_MIN_SIMILARITY {
                    suggestions.push(Suggestion::UpdateFeatures {
                        priority: Priority::Medium,
                        entity_name: matched.clone(),
                        new_features: entity.features.clone().unwrap_or_default(),
                        reason: "new feature information for a known entity".to_string(),
                        action: format!("refresh stored features of '{}'", matched),
                    });
                }
            }
        }

        if result.detected_entities.len() > 1 {
            suggestions.push(Suggestion::DiscoverRelations {
                priority: Priority::Medium,
                entities: result.detected_entities.iter().map(resolved_name).collect(),
                reason: "multiple entities detected in one image, unrecorded relations may exist"
                    .to_string(),
                action: "analyse pairwise relations and add them to the knowledge graph"
                    .to_string(),
            });
        }

        suggestions
    }
}

/// Name to store for a detection: the matched knowledge-base entity when
/// known, otherwise the (prefix-stripped) detected name.
fn resolved_name(entity: &DetectedEntity) -> String {
    entity
        .matched_kb_entity
        .clone()
        .unwrap_or_else(|| candidate_name(&entity.name).to_string())
}

/// Strip the unknown-entity prefix (any case) and surrounding whitespace.
fn candidate_name(name: &str) -> &str {
    let trimmed = name.trim();
    let n = UNKNOWN_ENTITY_PREFIX.len();
    if trimmed.len() >= n
        && trimmed.is_char_boundary(n)
        && trimmed[..n].eq_ignore_ascii_case(UNKNOWN_ENTITY_PREFIX)
    {
        trimmed[n..].trim()
    } else {
        trimmed
    }
}

/// Stringify a loose feature value; strings stay unquoted.
fn feature_value_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{example_analysis_result, RiskLevel};

    async fn fresh_updater() -> KnowledgeUpdater {
        let store = KnowledgeStore::open_in_memory().await.unwrap();
        KnowledgeUpdater::new(store)
    }

    fn entity(
        name: &str,
        kind: EntityKind,
        confidence: f64,
        similarity: f64,
        matched: Option<&str>,
    ) -> DetectedEntity {
        DetectedEntity {
            name: name.to_string(),
            kind,
            confidence,
            similarity: Some(similarity),
            matched_kb_entity: matched.map(str::to_string),
            features: None,
        }
    }

    fn result_with(entities: Vec<DetectedEntity>) -> AnalysisResult {
        AnalysisResult {
            analysis_mode: "full".to_string(),
            detected_entities: entities,
            risk_level: Some(RiskLevel::Medium),
        }
    }

    #[test]
    fn test_default_options() {
        let opts = UpdateOptions::default();
        assert_eq!(opts.similarity_threshold, SIMILARITY_THRESHOLD);
        assert_eq!(opts.confidence_threshold, CONFIDENCE_THRESHOLD);
        assert_eq!(opts.new_entity_min_confidence, NEW_ENTITY_MIN_CONFIDENCE);
        assert!(opts.infer_relations);
    }

    #[test]
    fn test_candidate_name_strips_prefix() {
        assert_eq!(candidate_name("pine sawyer beetle"), "pine sawyer beetle");
        assert_eq!(candidate_name("unknown entity: oak borer"), "oak borer");
        assert_eq!(candidate_name("Unknown Entity:  oak borer "), "oak borer");
        assert_eq!(candidate_name("  bark lesion  "), "bark lesion");
    }

    #[tokio::test]
    async fn test_process_example_result() {
        let updater = fresh_updater().await;
        let stats = updater.process(&example_analysis_result()).await.unwrap();

        assert_eq!(stats.new_entities_added, 1);
        assert_eq!(stats.new_relations_added, 1);
        assert_eq!(stats.features_updated, 1);
        assert_eq!(stats.skipped_low_confidence, 0);

        let store = updater.store();
        assert!(store.entity_exists("pine sawyer beetle").await.unwrap());
        assert!(store
            .triple_exists("pine sawyer beetle", relations::IS_A, "insect")
            .await
            .unwrap());
        assert!(store
            .triple_exists("pine sawyer beetle", relations::HAS_COLOR, "dark brown")
            .await
            .unwrap());
        // 5600 px falls in the medium band
        assert!(store
            .triple_exists("pine sawyer beetle", relations::HAS_SIZE, "medium")
            .await
            .unwrap());
        assert!(store
            .triple_exists("pine sawyer beetle", relations::HAS_TEXTURE, "rough")
            .await
            .unwrap());
        assert!(store
            .triple_exists("pine sawyer beetle", relations::HOSTED_BY, "masson pine")
            .await
            .unwrap());

        let features = store.features_for("masson pine").await.unwrap();
        assert!(features.iter().any(|f| f.feature == "dominantColor" && f.value == "green"));
        assert!(features.iter().any(|f| f.feature == "area"));
    }

    #[tokio::test]
    async fn test_process_second_run_adds_nothing() {
        let updater = fresh_updater().await;
        let result = example_analysis_result();

        updater.process(&result).await.unwrap();
        let second = updater.process(&result).await.unwrap();

        assert_eq!(second.new_entities_added, 0);
        assert_eq!(second.new_relations_added, 0);
        // Feature refresh of the matched tree still runs
        assert_eq!(second.features_updated, 1);
    }

    #[tokio::test]
    async fn test_low_confidence_is_counted_and_skipped() {
        let updater = fresh_updater().await;
        let result = result_with(vec![entity(
            "blurry speck",
            EntityKind::Insect,
            0.3,
            0.1,
            None,
        )]);

        let stats = updater.process(&result).await.unwrap();
        assert_eq!(stats.skipped_low_confidence, 1);
        assert_eq!(stats.new_entities_added, 0);
        assert!(stats.is_unchanged());
    }

    #[tokio::test]
    async fn test_similar_detection_not_added() {
        let updater = fresh_updater().await;
        let result = result_with(vec![entity(
            "masson pine",
            EntityKind::Tree,
            0.95,
            0.92,
            Some("masson pine"),
        )]);

        let stats = updater.process(&result).await.unwrap();
        assert_eq!(stats.new_entities_added, 0);
        assert!(!updater.store().entity_exists("masson pine").await.unwrap());
    }

    #[tokio::test]
    async fn test_existing_candidate_not_readded() {
        let updater = fresh_updater().await;
        updater
            .store()
            .insert_triple("oak borer", relations::IS_A, "insect")
            .await
            .unwrap();

        let result = result_with(vec![entity(
            "unknown entity: oak borer",
            EntityKind::Insect,
            0.9,
            0.2,
            None,
        )]);

        let stats = updater.process(&result).await.unwrap();
        assert_eq!(stats.new_entities_added, 0);
        assert_eq!(updater.store().triple_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_candidate_name_ignored() {
        // "unknown entity:" with nothing after the prefix strips to ""
        let updater = fresh_updater().await;
        let result = result_with(vec![
            entity("unknown entity:", EntityKind::Insect, 0.9, 0.1, None),
            entity("masson pine", EntityKind::Tree, 0.9, 0.9, Some("masson pine")),
        ]);

        let stats = updater.process(&result).await.unwrap();
        assert_eq!(stats.new_entities_added, 0);
        assert_eq!(stats.new_relations_added, 0);
        assert!(!updater.store().entity_exists("").await.unwrap());
    }

    #[tokio::test]
    async fn test_moderate_confidence_unmatched_not_added() {
        // Above the skip threshold but below the new-entity bar
        let updater = fresh_updater().await;
        let result = result_with(vec![entity(
            "faint larva",
            EntityKind::Insect,
            0.65,
            0.2,
            None,
        )]);

        let stats = updater.process(&result).await.unwrap();
        assert_eq!(stats.skipped_low_confidence, 0);
        assert_eq!(stats.new_entities_added, 0);
    }

    #[tokio::test]
    async fn test_rule_relations_follow_direction() {
        let updater = fresh_updater().await;
        let result = result_with(vec![
            entity("masson pine", EntityKind::Tree, 0.9, 0.9, Some("masson pine")),
            entity("needle blight", EntityKind::DiseaseSymptom, 0.85, 0.9, Some("needle blight")),
        ]);

        updater.process(&result).await.unwrap();

        let store = updater.store();
        assert!(store
            .triple_exists("masson pine", relations::SUSCEPTIBLE_TO, "needle blight")
            .await
            .unwrap());
        assert!(!store
            .triple_exists("needle blight", relations::SUSCEPTIBLE_TO, "masson pine")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_rule_relations_use_matched_names() {
        let updater = fresh_updater().await;
        let result = result_with(vec![
            entity("some beetle", EntityKind::Insect, 0.9, 0.8, Some("pine sawyer beetle")),
            entity("pine-like tree", EntityKind::Tree, 0.9, 0.8, Some("masson pine")),
        ]);

        updater.process(&result).await.unwrap();

        assert!(updater
            .store()
            .triple_exists("pine sawyer beetle", relations::HOSTED_BY, "masson pine")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_process_value_rejects_invalid_json() {
        let updater = fresh_updater().await;
        let bad = serde_json::json!({ "analysisMode": "full" });

        let err = updater.process_value(&bad).await.unwrap_err();
        assert!(err.to_string().contains("detectedEntities"));
    }

    #[tokio::test]
    async fn test_process_value_accepts_valid_json() {
        let updater = fresh_updater().await;
        let value = serde_json::to_value(example_analysis_result()).unwrap();

        let stats = updater.process_value(&value).await.unwrap();
        assert_eq!(stats.new_entities_added, 1);
    }

    #[tokio::test]
    async fn test_update_entity_features_counts_writes() {
        let updater = fresh_updater().await;

        let mut features = EntityFeatures::default();
        features.dominant_color = Some("green".to_string());
        features.area = Some(1200.0);
        features.extra.insert(
            "leafShape".to_string(),
            Value::String("needle".to_string()),
        );

        let count = updater
            .update_entity_features("masson pine", &features)
            .await
            .unwrap();
        assert_eq!(count, 3);

        let stored = updater.store().features_for("masson pine").await.unwrap();
        assert_eq!(stored.len(), 3);
        assert!(stored.iter().any(|f| f.feature == "leafShape" && f.value == "needle"));
    }

    #[tokio::test]
    async fn test_suggestions_for_example_result() {
        let updater = fresh_updater().await;
        let suggestions = updater.suggestions(&example_analysis_result());

        assert_eq!(suggestions.len(), 3);
        assert!(matches!(
            &suggestions[0],
            Suggestion::AddEntity { priority: Priority::High, entity_name, .. }
                if entity_name == "pine sawyer beetle"
        ));
        assert!(matches!(
            &suggestions[1],
            Suggestion::UpdateFeatures { entity_name, .. } if entity_name == "masson pine"
        ));
        assert!(matches!(
            &suggestions[2],
            Suggestion::DiscoverRelations { entities, .. } if entities.len() == 2
        ));
    }

    #[tokio::test]
    async fn test_suggestions_empty_result() {
        let updater = fresh_updater().await;
        let suggestions = updater.suggestions(&AnalysisResult::new());
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let mut stats = UpdateStats::default();
        stats.new_entities_added = 1;
        stats.updates.push(UpdateRecord::NewRelation {
            head: "a".into(),
            relation: "transmits".into(),
            tail: "b".into(),
        });

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"newEntitiesAdded\":1"));
        assert!(json.contains("\"skippedLowConfidence\":0"));
        assert!(json.contains("\"type\":\"new_relation\""));
    }

    #[test]
    fn test_suggestion_serialize_tagged() {
        let suggestion = Suggestion::AddEntity {
            priority: Priority::High,
            entity_name: "oak borer".into(),
            kind: EntityKind::Insect,
            confidence: 0.9,
            similarity: 0.2,
            reason: "r".into(),
            action: "a".into(),
        };

        let json = serde_json::to_string(&suggestion).unwrap();
        assert!(json.contains("\"type\":\"add_entity\""));
        assert!(json.contains("\"priority\":\"high\""));
        assert!(json.contains("\"entityName\":\"oak borer\""));
        assert!(json.contains("\"kind\":\"insect\""));
    }
}
