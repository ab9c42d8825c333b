use crate::error::CoreError;
use crate::models::{Label, LabelKind};
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

#[async_trait]
impl super::LabelRepository for SqliteRepository {
    async fn count_labels(&self) -> Result<i64, CoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM labels")
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    async fn insert_labels(&self, labels: &[Label]) -> Result<(), CoreError> {
        if labels.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool().begin().await?;
        for label in labels {
            sqlx::query(
                r#"INSERT INTO labels (id, key, name, meaning, note, color, kind, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(label.id)
            .bind(&label.key)
            .bind(&label.name)
            .bind(&label.meaning)
            .bind(&label.note)
            .bind(&label.color)
            .bind(label.kind)
            .bind(label.created_at)
            .bind(label.updated_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find_labels(&self) -> Result<Vec<Label>, CoreError> {
        let labels = sqlx::query_as("SELECT * FROM labels ORDER BY kind, name")
            .fetch_all(self.pool())
            .await?;
        Ok(labels)
    }

    async fn find_labels_by_kind(&self, kind: LabelKind) -> Result<Vec<Label>, CoreError> {
        let labels = sqlx::query_as("SELECT * FROM labels WHERE kind = $1 ORDER BY name")
            .bind(kind)
            .fetch_all(self.pool())
            .await?;
        Ok(labels)
    }

    async fn find_label_by_key(&self, key: &str) -> Result<Option<Label>, CoreError> {
        let label = sqlx::query_as("SELECT * FROM labels WHERE key = $1")
            .bind(key)
            .fetch_optional(self.pool())
            .await?;
        Ok(label)
    }

    async fn find_label_by_id(&self, id: Uuid) -> Result<Option<Label>, CoreError> {
        let label = sqlx::query_as("SELECT * FROM labels WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(label)
    }

    async fn find_labels_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Label>, CoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM labels WHERE id IN (");
        {
            let mut separated = qb.separated(", ");
            for id in ids {
                separated.push_bind(*id);
            }
        }
        qb.push(")");

        let labels = qb.build_query_as().fetch_all(self.pool()).await?;
        Ok(labels)
    }

    async fn label_exists(&self, id: Uuid) -> Result<bool, CoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM labels WHERE id = $1")
            .bind(id)
            .fetch_one(self.pool())
            .await?;
        Ok(count > 0)
    }
}
