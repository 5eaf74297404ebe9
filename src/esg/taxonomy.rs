//! Custom reporting taxonomies.
//!
//! Nodes live in a flat table and reference their parent by id, so the tree
//! is navigated by lookup rather than containment. Writes reject unknown
//! parents and any parent chain that loops back onto the node.

use std::collections::BTreeMap;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use sqlx::types::Json;

use crate::error::{Result, ServerError};

const SELECT_COLUMNS: &str = r#"SELECT
        id,
        name,
        category,
        parent_id,
        metrics,
        mapped_frameworks,
        validation_rules,
        created_by,
        created_at,
        updated_at
    FROM custom_taxonomies"#;

/// One metric tracked by a taxonomy node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricDef {
    pub key: String,
    pub label: String,
    pub unit: Option<String>,
}

/// Taxonomy node as saved on database.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CustomTaxonomy {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub parent_id: Option<i64>,
    pub metrics: Json<Vec<MetricDef>>,
    pub mapped_frameworks: Json<Vec<String>>,
    pub validation_rules: Json<BTreeMap<String, serde_json::Value>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Taxonomy node before persistence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTaxonomy {
    pub name: String,
    pub category: String,
    pub parent_id: Option<i64>,
    pub metrics: Vec<MetricDef>,
    pub mapped_frameworks: Vec<String>,
    pub validation_rules: BTreeMap<String, serde_json::Value>,
    pub created_by: String,
}

#[derive(Clone)]
pub struct TaxonomyRepository {
    pool: SqlitePool,
}

impl TaxonomyRepository {
    /// Create a new [`TaxonomyRepository`].
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new node, verifying its parent exists.
    pub async fn create(&self, node: &NewTaxonomy) -> Result<CustomTaxonomy> {
        if let Some(parent) = node.parent_id {
            if self.find(parent).await?.is_none() {
                return Err(ServerError::UnknownParent { parent });
            }
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"INSERT INTO custom_taxonomies
                (name, category, parent_id, metrics, mapped_frameworks, validation_rules,
                 created_by, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&node.name)
        .bind(&node.category)
        .bind(node.parent_id)
        .bind(Json(&node.metrics))
        .bind(Json(&node.mapped_frameworks))
        .bind(Json(&node.validation_rules))
        .bind(&node.created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.fetch(id).await
    }

    /// Move a node under a new parent.
    ///
    /// Rejects unknown parents and any parent whose ancestor chain contains
    /// the node itself.
    pub async fn set_parent(
        &self,
        id: i64,
        parent_id: Option<i64>,
    ) -> Result<CustomTaxonomy> {
        if let Some(parent) = parent_id {
            if parent == id {
                return Err(ServerError::TaxonomyCycle { node: id });
            }
            if self.find(parent).await?.is_none() {
                return Err(ServerError::UnknownParent { parent });
            }
            self.ensure_not_ancestor(id, parent).await?;
        }

        sqlx::query(
            r#"UPDATE custom_taxonomies SET parent_id = ?, updated_at = ? WHERE id = ?"#,
        )
        .bind(parent_id)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.fetch(id).await
    }

    /// Find a node by id.
    pub async fn find(&self, id: i64) -> Result<Option<CustomTaxonomy>> {
        let query = format!("{SELECT_COLUMNS} WHERE id = ?");
        let node = sqlx::query_as::<_, CustomTaxonomy>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(node)
    }

    /// Direct children of a node.
    pub async fn children(&self, id: i64) -> Result<Vec<CustomTaxonomy>> {
        let query = format!("{SELECT_COLUMNS} WHERE parent_id = ? ORDER BY id");
        let nodes = sqlx::query_as::<_, CustomTaxonomy>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(nodes)
    }

    /// Walk the ancestor chain of `start`, failing if `node` appears.
    async fn ensure_not_ancestor(&self, node: i64, start: i64) -> Result<()> {
        let mut seen = HashSet::new();
        let mut current = Some(start);

        while let Some(id) = current {
            if id == node {
                return Err(ServerError::TaxonomyCycle { node });
            }
            // A repeated id means the stored chain already loops; stop.
            if !seen.insert(id) {
                return Err(ServerError::TaxonomyCycle { node: id });
            }

            current = sqlx::query_scalar::<_, Option<i64>>(
                r#"SELECT parent_id FROM custom_taxonomies WHERE id = ?"#,
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .flatten();
        }

        Ok(())
    }

    async fn fetch(&self, id: i64) -> Result<CustomTaxonomy> {
        let query = format!("{SELECT_COLUMNS} WHERE id = ?");
        let node = sqlx::query_as::<_, CustomTaxonomy>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;

    use super::*;

    async fn seed_author(pool: &SqlitePool) {
        sqlx::query(
            r#"INSERT INTO users (email, password_hash, full_name, status, role, created_at, updated_at)
                VALUES ('author@esgrid.io', 'x', 'Author', 'approved', 'admin', ?, ?)"#,
        )
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(pool)
        .await
        .unwrap();
    }

    fn node(name: &str, parent_id: Option<i64>) -> NewTaxonomy {
        NewTaxonomy {
            name: name.into(),
            category: "environmental".into(),
            parent_id,
            metrics: vec![MetricDef {
                key: "co2_tonnes".into(),
                label: "CO2 emissions".into(),
                unit: Some("t".into()),
            }],
            mapped_frameworks: vec!["GRI".into()],
            validation_rules: BTreeMap::from([(
                "co2_tonnes".to_string(),
                serde_json::json!({"min": 0}),
            )]),
            created_by: "author@esgrid.io".into(),
        }
    }

    #[sqlx::test]
    async fn test_create_and_children(pool: SqlitePool) {
        seed_author(&pool).await;
        let repo = TaxonomyRepository::new(pool);

        let root = repo.create(&node("emissions", None)).await.unwrap();
        let child = repo
            .create(&node("scope 1", Some(root.id)))
            .await
            .unwrap();

        assert_eq!(child.parent_id, Some(root.id));
        assert_eq!(child.metrics.0[0].key, "co2_tonnes");

        let children = repo.children(root.id).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "scope 1");
    }

    #[sqlx::test]
    async fn test_unknown_parent_rejected(pool: SqlitePool) {
        seed_author(&pool).await;
        let repo = TaxonomyRepository::new(pool);

        let err = repo.create(&node("orphan", Some(404))).await.unwrap_err();
        assert!(matches!(err, ServerError::UnknownParent { parent: 404 }));
    }

    #[sqlx::test]
    async fn test_cycle_rejected(pool: SqlitePool) {
        seed_author(&pool).await;
        let repo = TaxonomyRepository::new(pool);

        let root = repo.create(&node("emissions", None)).await.unwrap();
        let mid = repo.create(&node("scope 1", Some(root.id))).await.unwrap();
        let leaf = repo.create(&node("fleet", Some(mid.id))).await.unwrap();

        // Reparenting the root under its grandchild loops the chain.
        let err = repo.set_parent(root.id, Some(leaf.id)).await.unwrap_err();
        assert!(matches!(err, ServerError::TaxonomyCycle { .. }));

        // Self-parenting is the trivial cycle.
        let err = repo.set_parent(mid.id, Some(mid.id)).await.unwrap_err();
        assert!(matches!(err, ServerError::TaxonomyCycle { .. }));

        // A legal move still works.
        let moved = repo.set_parent(leaf.id, Some(root.id)).await.unwrap();
        assert_eq!(moved.parent_id, Some(root.id));
    }
}
