//! Knowledge graph store backed by SQLite.
//!
//! Triples live in the `knowledge_triples` table, with `valid_relations`
//! naming the relations the inference layer may propose and
//! `entity_features` holding per-entity feature values.
//!
//! All queries go through a [`sqlx::SqlitePool`]; the store is cheap to
//! clone and safe to share across handlers.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::StoreResult;
use crate::models::relations::DEFAULT_VALID_RELATIONS;

/// Default database location (relative to current dir)
pub const DEFAULT_DB_PATH: &str = ".sylvascan/knowledge.db";

/// Schema bootstrap, one statement per entry.
const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS knowledge_triples (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        head TEXT NOT NULL,
        relation TEXT NOT NULL,
        tail TEXT NOT NULL,
        confidence REAL NOT NULL DEFAULT 1.0,
        created_at TEXT NOT NULL,
        UNIQUE(head, relation, tail)
    )",
    "CREATE INDEX IF NOT EXISTS idx_triples_head ON knowledge_triples(head)",
    "CREATE INDEX IF NOT EXISTS idx_triples_tail ON knowledge_triples(tail)",
    "CREATE TABLE IF NOT EXISTS valid_relations (
        name TEXT PRIMARY KEY
    )",
    "CREATE TABLE IF NOT EXISTS entity_features (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        entity TEXT NOT NULL,
        feature TEXT NOT NULL,
        value TEXT,
        confidence REAL NOT NULL DEFAULT 1.0,
        updated_at TEXT NOT NULL,
        UNIQUE(entity, feature)
    )",
    "CREATE INDEX IF NOT EXISTS idx_features_entity ON entity_features(entity)",
];

/// A stored knowledge triple.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Triple {
    /// Head entity.
    pub head: String,
    /// Relation label.
    pub relation: String,
    /// Tail entity.
    pub tail: String,
    /// Confidence in the triple (0.0 - 1.0).
    pub confidence: f64,
}

/// A stored entity feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRow {
    /// Feature key (dominantColor, area, ...).
    pub feature: String,
    /// Feature value, stringified.
    pub value: String,
    /// Confidence in the value (0.0 - 1.0).
    pub confidence: f64,
    /// RFC 3339 timestamp of the last update.
    pub updated_at: String,
}

/// SQLite-backed knowledge graph store.
#[derive(Clone)]
pub struct KnowledgeStore {
    pool: SqlitePool,
}

impl KnowledgeStore {
    /// Open (creating if needed) the store at the default location.
    pub async fn open_default() -> StoreResult<Self> {
        Self::open(DEFAULT_DB_PATH).await
    }

    /// Open (creating if needed) the store at the given path.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // SQLite needs the file to exist before connecting.
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }

        let pool = SqlitePool::connect(&format!("sqlite:{}", path.display())).await?;
        sqlx::query("PRAGMA journal_mode=WAL;").execute(&pool).await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Open a fresh in-memory store.
    pub async fn open_in_memory() -> StoreResult<Self> {
        // One connection only: each pooled :memory: connection would get
        // its own blank database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> StoreResult<()> {
        for statement in MIGRATIONS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Whether an entity appears as head or tail of any triple.
    pub async fn entity_exists(&self, name: &str) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM knowledge_triples WHERE head = ? OR tail = ?",
        )
        .bind(name)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Whether the exact triple exists.
    pub async fn triple_exists(&self, head: &str, relation: &str, tail: &str) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM knowledge_triples WHERE head = ? AND relation = ? AND tail = ?",
        )
        .bind(head)
        .bind(relation)
        .bind(tail)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Whether any triple links the two entities, in either direction.
    pub async fn any_relation_between(&self, a: &str, b: &str) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM knowledge_triples
             WHERE (head = ? AND tail = ?) OR (head = ? AND tail = ?)",
        )
        .bind(a)
        .bind(b)
        .bind(b)
        .bind(a)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Insert a triple, ignoring duplicates. Returns whether a row was added.
    pub async fn insert_triple(&self, head: &str, relation: &str, tail: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO knowledge_triples (head, relation, tail, confidence, created_at)
             VALUES (?, ?, ?, 1.0, ?)",
        )
        .bind(head)
        .bind(relation)
        .bind(tail)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All triples an entity participates in, head or tail.
    pub async fn triples_for(&self, entity: &str) -> StoreResult<Vec<Triple>> {
        let rows = sqlx::query(
            "SELECT head, relation, tail, confidence FROM knowledge_triples
             WHERE head = ? OR tail = ? ORDER BY id",
        )
        .bind(entity)
        .bind(entity)
        .fetch_all(&self.pool)
        .await?;

        let mut triples = Vec::with_capacity(rows.len());
        for row in rows {
            triples.push(Triple {
                head: row.try_get("head")?,
                relation: row.try_get("relation")?,
                tail: row.try_get("tail")?,
                confidence: row.try_get("confidence")?,
            });
        }
        Ok(triples)
    }

    /// Total number of stored triples.
    pub async fn triple_count(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM knowledge_triples")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Relations the inference layer may propose.
    pub async fn valid_relations(&self) -> StoreResult<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM valid_relations ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        let mut names = Vec::with_capacity(rows.len());
        for row in rows {
            names.push(row.try_get("name")?);
        }
        Ok(names)
    }

    /// Seed the default relation set. Returns how many were newly added.
    pub async fn seed_default_relations(&self) -> StoreResult<usize> {
        let mut added = 0;
        for relation in DEFAULT_VALID_RELATIONS {
            let result = sqlx::query("INSERT OR IGNORE INTO valid_relations (name) VALUES (?)")
                .bind(relation)
                .execute(&self.pool)
                .await?;
            added += result.rows_affected() as usize;
        }
        Ok(added)
    }

    /// Insert or update a feature value for an entity.
    pub async fn upsert_feature(&self, entity: &str, feature: &str, value: &str) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO entity_features (entity, feature, value, confidence, updated_at)
             VALUES (?, ?, ?, 1.0, ?)
             ON CONFLICT(entity, feature)
             DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(entity)
        .bind(feature)
        .bind(value)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Stored features for an entity.
    pub async fn features_for(&self, entity: &str) -> StoreResult<Vec<FeatureRow>> {
        let rows = sqlx::query(
            "SELECT feature, value, confidence, updated_at FROM entity_features
             WHERE entity = ? ORDER BY feature",
        )
        .bind(entity)
        .fetch_all(&self.pool)
        .await?;

        let mut features = Vec::with_capacity(rows.len());
        for row in rows {
            features.push(FeatureRow {
                feature: row.try_get("feature")?,
                value: row.try_get("value")?,
                confidence: row.try_get("confidence")?,
                updated_at: row.try_get("updated_at")?,
            });
        }
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::relations;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_insert_triple_is_idempotent() {
        let store = KnowledgeStore::open_in_memory().await.unwrap();

        let added = store
            .insert_triple("pine sawyer beetle", relations::IS_A, "insect")
            .await
            .unwrap();
        assert!(added);

        let added_again = store
            .insert_triple("pine sawyer beetle", relations::IS_A, "insect")
            .await
            .unwrap();
        assert!(!added_again);

        assert_eq!(store.triple_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_entity_exists_checks_both_ends() {
        let store = KnowledgeStore::open_in_memory().await.unwrap();
        store
            .insert_triple("masson pine", relations::SUSCEPTIBLE_TO, "needle blight")
            .await
            .unwrap();

        assert!(store.entity_exists("masson pine").await.unwrap());
        assert!(store.entity_exists("needle blight").await.unwrap());
        assert!(!store.entity_exists("oak borer").await.unwrap());
    }

    #[tokio::test]
    async fn test_any_relation_between_is_direction_agnostic() {
        let store = KnowledgeStore::open_in_memory().await.unwrap();
        store
            .insert_triple("pine sawyer beetle", relations::HOSTED_BY, "masson pine")
            .await
            .unwrap();

        assert!(store
            .any_relation_between("pine sawyer beetle", "masson pine")
            .await
            .unwrap());
        assert!(store
            .any_relation_between("masson pine", "pine sawyer beetle")
            .await
            .unwrap());
        assert!(!store
            .any_relation_between("masson pine", "oak borer")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_triples_for_returns_both_directions() {
        let store = KnowledgeStore::open_in_memory().await.unwrap();
        store
            .insert_triple("pine sawyer beetle", relations::IS_A, "insect")
            .await
            .unwrap();
        store
            .insert_triple("pine sawyer beetle", relations::HOSTED_BY, "masson pine")
            .await
            .unwrap();
        store
            .insert_triple("masson pine", relations::IS_A, "plant")
            .await
            .unwrap();

        let triples = store.triples_for("masson pine").await.unwrap();
        assert_eq!(triples.len(), 2);
        assert!(triples.iter().any(|t| t.relation == relations::HOSTED_BY));
        assert!(triples.iter().any(|t| t.relation == relations::IS_A));
    }

    #[tokio::test]
    async fn test_seed_default_relations() {
        let store = KnowledgeStore::open_in_memory().await.unwrap();

        let added = store.seed_default_relations().await.unwrap();
        assert_eq!(added, DEFAULT_VALID_RELATIONS.len());

        // Seeding again adds nothing
        let added_again = store.seed_default_relations().await.unwrap();
        assert_eq!(added_again, 0);

        let relations = store.valid_relations().await.unwrap();
        assert_eq!(relations.len(), DEFAULT_VALID_RELATIONS.len());
        assert!(relations.contains(&"transmits".to_string()));
    }

    #[tokio::test]
    async fn test_upsert_feature_overwrites() {
        let store = KnowledgeStore::open_in_memory().await.unwrap();

        store
            .upsert_feature("masson pine", "dominantColor", "green")
            .await
            .unwrap();
        store
            .upsert_feature("masson pine", "dominantColor", "yellow-green")
            .await
            .unwrap();

        let features = store.features_for("masson pine").await.unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].value, "yellow-green");
    }

    #[tokio::test]
    async fn test_open_creates_nested_path_and_reopens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("knowledge.db");

        let store = KnowledgeStore::open(&path).await.unwrap();
        store
            .insert_triple("oak borer", relations::IS_A, "insect")
            .await
            .unwrap();
        drop(store);

        let reopened = KnowledgeStore::open(&path).await.unwrap();
        assert!(reopened.entity_exists("oak borer").await.unwrap());
    }
}
