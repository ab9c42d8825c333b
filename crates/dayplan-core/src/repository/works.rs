use crate::calendar;
use crate::error::CoreError;
use crate::models::{LabelSlot, SubTask, Work, WorkQuery};
use crate::repository::{SqliteRepository, SubTaskSpec};
use crate::works::normalize_name;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};
use std::collections::HashSet;
use uuid::Uuid;

/// Append the WHERE conditions of a listing query. Shared between the row
/// query and its count twin so the total always matches the filter.
fn push_list_filters<'a>(qb: &mut QueryBuilder<'a, Sqlite>, query: &'a WorkQuery) {
    qb.push(" WHERE owner_id = ").push_bind(&query.owner_id);

    if let Some(from) = query.from {
        if let Ok(from) = calendar::from_millis(from) {
            qb.push(" AND start_date >= ").push_bind(from);
        }
    }
    if let Some(to) = query.to {
        if let Ok(to) = calendar::from_millis(to) {
            qb.push(" AND start_date <= ").push_bind(to);
        }
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND name_normalized LIKE ")
            .push_bind(format!("%{}%", normalize_name(search)));
    }

    // Unparsable label filters are ignored rather than failing the listing.
    let label_filters = [
        ("status_id", &query.status_id),
        ("difficulty_id", &query.difficulty_id),
        ("priority_id", &query.priority_id),
        ("type_id", &query.type_id),
        ("category_id", &query.category_id),
    ];
    for (column, value) in label_filters {
        if let Some(id) = value.as_deref().and_then(|v| Uuid::parse_str(v).ok()) {
            qb.push(format!(" AND {column} = ")).push_bind(id);
        }
    }
}

#[async_trait]
impl super::WorkRepository for SqliteRepository {
    async fn create_work(&self, work: &Work) -> Result<(), CoreError> {
        sqlx::query(
            r#"INSERT INTO works (
                id, owner_id, name, name_normalized, short_description,
                detailed_description, start_date, end_date, status_id,
                difficulty_id, priority_id, type_id, category_id, goal_id,
                draft_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(work.id)
        .bind(&work.owner_id)
        .bind(&work.name)
        .bind(&work.name_normalized)
        .bind(&work.short_description)
        .bind(&work.detailed_description)
        .bind(work.start_date)
        .bind(work.end_date)
        .bind(work.status_id)
        .bind(work.difficulty_id)
        .bind(work.priority_id)
        .bind(work.type_id)
        .bind(work.category_id)
        .bind(work.goal_id)
        .bind(work.draft_id)
        .bind(work.created_at)
        .bind(work.updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn update_work(&self, work: &Work) -> Result<(), CoreError> {
        let result = sqlx::query(
            r#"UPDATE works SET
                name = $1, name_normalized = $2, short_description = $3,
                detailed_description = $4, start_date = $5, end_date = $6,
                status_id = $7, difficulty_id = $8, priority_id = $9,
                type_id = $10, category_id = $11, goal_id = $12,
                draft_id = $13, updated_at = $14
            WHERE id = $15
            "#,
        )
        .bind(&work.name)
        .bind(&work.name_normalized)
        .bind(&work.short_description)
        .bind(&work.detailed_description)
        .bind(work.start_date)
        .bind(work.end_date)
        .bind(work.status_id)
        .bind(work.difficulty_id)
        .bind(work.priority_id)
        .bind(work.type_id)
        .bind(work.category_id)
        .bind(work.goal_id)
        .bind(work.draft_id)
        .bind(Utc::now())
        .bind(work.id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(work.id.to_string()));
        }
        Ok(())
    }

    async fn find_work_by_id(&self, id: Uuid) -> Result<Option<Work>, CoreError> {
        let work = sqlx::query_as("SELECT * FROM works WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(work)
    }

    async fn find_works(&self, query: &WorkQuery) -> Result<(Vec<Work>, i64), CoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM works");
        push_list_filters(&mut qb, query);
        qb.push(" ORDER BY end_date");
        let works: Vec<Work> = qb.build_query_as().fetch_all(self.pool()).await?;

        let mut count_qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM works");
        push_list_filters(&mut count_qb, query);
        let (total,): (i64,) = count_qb.build_query_as().fetch_one(self.pool()).await?;

        Ok((works, total))
    }

    async fn delete_work(&self, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM works WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn update_work_label(
        &self,
        id: Uuid,
        slot: LabelSlot,
        label_id: Uuid,
    ) -> Result<(), CoreError> {
        // slot.column() is a fixed enum mapping, never user input
        let sql = format!(
            "UPDATE works SET {} = $1, updated_at = $2 WHERE id = $3",
            slot.column()
        );
        let result = sqlx::query(&sql)
            .bind(label_id)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn count_overlapping_works(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<i64, CoreError> {
        // Half-open intersection: existing.start < end AND existing.end > start.
        // Works without a start date never enter the candidate set.
        let (count,): (i64,) = match exclude {
            Some(exclude_id) => {
                sqlx::query_as(
                    r#"SELECT COUNT(*) FROM works
                    WHERE owner_id = $1 AND start_date IS NOT NULL
                      AND start_date < $2 AND end_date > $3
                      AND id != $4
                    "#,
                )
                .bind(owner_id)
                .bind(end)
                .bind(start)
                .bind(exclude_id)
                .fetch_one(self.pool())
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"SELECT COUNT(*) FROM works
                    WHERE owner_id = $1 AND start_date IS NOT NULL
                      AND start_date < $2 AND end_date > $3
                    "#,
                )
                .bind(owner_id)
                .bind(end)
                .bind(start)
                .fetch_one(self.pool())
                .await?
            }
        };
        Ok(count)
    }

    async fn find_scheduled_works_in_range(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Work>, CoreError> {
        let works = match exclude {
            Some(exclude_id) => {
                sqlx::query_as(
                    r#"SELECT * FROM works
                    WHERE owner_id = $1 AND start_date IS NOT NULL
                      AND start_date < $2 AND end_date > $3
                      AND id != $4
                    ORDER BY start_date
                    "#,
                )
                .bind(owner_id)
                .bind(end)
                .bind(start)
                .bind(exclude_id)
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"SELECT * FROM works
                    WHERE owner_id = $1 AND start_date IS NOT NULL
                      AND start_date < $2 AND end_date > $3
                    ORDER BY start_date
                    "#,
                )
                .bind(owner_id)
                .bind(end)
                .bind(start)
                .fetch_all(self.pool())
                .await?
            }
        };
        Ok(works)
    }

    async fn find_works_touching_range(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Work>, CoreError> {
        // Unscheduled works are attributed to the day their end falls in.
        let works = sqlx::query_as(
            r#"SELECT * FROM works
            WHERE owner_id = $1
              AND (start_date IS NULL OR start_date <= $2)
              AND end_date >= $3
            ORDER BY start_date
            "#,
        )
        .bind(owner_id)
        .bind(end)
        .bind(start)
        .fetch_all(self.pool())
        .await?;
        Ok(works)
    }

    async fn delete_drafts_in_range(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64, CoreError> {
        let result = sqlx::query(
            r#"DELETE FROM works
            WHERE owner_id = $1 AND draft_id IS NOT NULL
              AND (start_date IS NULL OR start_date <= $2)
              AND end_date >= $3
            "#,
        )
        .bind(owner_id)
        .bind(end)
        .bind(start)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }

    async fn bulk_insert_works(&self, works: &[Work]) -> Result<(), CoreError> {
        if works.is_empty() {
            return Ok(());
        }
        // One transaction: the clone set lands whole or not at all.
        let mut tx = self.pool().begin().await?;
        for work in works {
            sqlx::query(
                r#"INSERT INTO works (
                    id, owner_id, name, name_normalized, short_description,
                    detailed_description, start_date, end_date, status_id,
                    difficulty_id, priority_id, type_id, category_id, goal_id,
                    draft_id, created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
                "#,
            )
            .bind(work.id)
            .bind(&work.owner_id)
            .bind(&work.name)
            .bind(&work.name_normalized)
            .bind(&work.short_description)
            .bind(&work.detailed_description)
            .bind(work.start_date)
            .bind(work.end_date)
            .bind(work.status_id)
            .bind(work.difficulty_id)
            .bind(work.priority_id)
            .bind(work.type_id)
            .bind(work.category_id)
            .bind(work.goal_id)
            .bind(work.draft_id)
            .bind(work.created_at)
            .bind(work.updated_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn commit_drafts(
        &self,
        owner_id: &str,
        ids: &[Uuid],
        draft_id: Uuid,
    ) -> Result<u64, CoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("UPDATE works SET draft_id = NULL, updated_at = ");
        qb.push_bind(Utc::now());
        qb.push(" WHERE owner_id = ").push_bind(owner_id);
        qb.push(" AND draft_id = ").push_bind(draft_id);
        qb.push(" AND id IN (");
        {
            let mut separated = qb.separated(", ");
            for id in ids {
                separated.push_bind(*id);
            }
        }
        qb.push(")");

        let result = qb.build().execute(self.pool()).await?;
        Ok(result.rows_affected())
    }

    async fn delete_drafts_by_ids(
        &self,
        owner_id: &str,
        ids: &[Uuid],
        draft_id: Uuid,
    ) -> Result<u64, CoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("DELETE FROM works WHERE owner_id = ");
        qb.push_bind(owner_id);
        qb.push(" AND draft_id = ").push_bind(draft_id);
        qb.push(" AND id IN (");
        {
            let mut separated = qb.separated(", ");
            for id in ids {
                separated.push_bind(*id);
            }
        }
        qb.push(")");

        let result = qb.build().execute(self.pool()).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl super::SubTaskRepository for SqliteRepository {
    async fn find_sub_tasks_by_work(&self, work_id: Uuid) -> Result<Vec<SubTask>, CoreError> {
        let sub_tasks = sqlx::query_as("SELECT * FROM sub_tasks WHERE work_id = $1 ORDER BY created_at")
            .bind(work_id)
            .fetch_all(self.pool())
            .await?;
        Ok(sub_tasks)
    }

    async fn find_sub_tasks_by_works(&self, work_ids: &[Uuid]) -> Result<Vec<SubTask>, CoreError> {
        if work_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM sub_tasks WHERE work_id IN (");
        {
            let mut separated = qb.separated(", ");
            for id in work_ids {
                separated.push_bind(*id);
            }
        }
        qb.push(") ORDER BY created_at");

        let sub_tasks = qb.build_query_as().fetch_all(self.pool()).await?;
        Ok(sub_tasks)
    }

    async fn sync_sub_tasks(
        &self,
        work_id: Uuid,
        desired: &[SubTaskSpec],
    ) -> Result<(), CoreError> {
        let mut tx = self.pool().begin().await?;

        let existing: Vec<SubTask> = sqlx::query_as("SELECT * FROM sub_tasks WHERE work_id = $1")
            .bind(work_id)
            .fetch_all(&mut *tx)
            .await?;
        let mut stale: HashSet<Uuid> = existing.iter().map(|t| t.id).collect();

        let now = Utc::now();
        for spec in desired {
            match spec.id {
                Some(id) => {
                    stale.remove(&id);
                    sqlx::query(
                        r#"UPDATE sub_tasks
                        SET name = $1, is_completed = $2, updated_at = $3
                        WHERE id = $4 AND work_id = $5
                        "#,
                    )
                    .bind(&spec.name)
                    .bind(spec.is_completed)
                    .bind(now)
                    .bind(id)
                    .bind(work_id)
                    .execute(&mut *tx)
                    .await?;
                }
                None => {
                    sqlx::query(
                        r#"INSERT INTO sub_tasks (id, work_id, name, is_completed, created_at, updated_at)
                        VALUES ($1, $2, $3, $4, $5, $6)
                        "#,
                    )
                    .bind(Uuid::now_v7())
                    .bind(work_id)
                    .bind(&spec.name)
                    .bind(spec.is_completed)
                    .bind(now)
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        for id in stale {
            sqlx::query("DELETE FROM sub_tasks WHERE id = $1 AND work_id = $2")
                .bind(id)
                .bind(work_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_sub_tasks_by_work(&self, work_id: Uuid) -> Result<(), CoreError> {
        sqlx::query("DELETE FROM sub_tasks WHERE work_id = $1")
            .bind(work_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn bulk_insert_sub_tasks(&self, sub_tasks: &[SubTask]) -> Result<(), CoreError> {
        if sub_tasks.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool().begin().await?;
        for sub_task in sub_tasks {
            sqlx::query(
                r#"INSERT INTO sub_tasks (id, work_id, name, is_completed, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(sub_task.id)
            .bind(sub_task.work_id)
            .bind(&sub_task.name)
            .bind(sub_task.is_completed)
            .bind(sub_task.created_at)
            .bind(sub_task.updated_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
