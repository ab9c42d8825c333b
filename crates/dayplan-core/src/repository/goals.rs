use crate::error::CoreError;
use crate::models::Goal;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

#[async_trait]
impl super::GoalRepository for SqliteRepository {
    async fn create_goal(&self, goal: &Goal) -> Result<(), CoreError> {
        sqlx::query(
            r#"INSERT INTO goals (
                id, owner_id, name, short_description, detailed_description,
                start_date, end_date, status_id, difficulty_id, priority_id,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(goal.id)
        .bind(&goal.owner_id)
        .bind(&goal.name)
        .bind(&goal.short_description)
        .bind(&goal.detailed_description)
        .bind(goal.start_date)
        .bind(goal.end_date)
        .bind(goal.status_id)
        .bind(goal.difficulty_id)
        .bind(goal.priority_id)
        .bind(goal.created_at)
        .bind(goal.updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn update_goal(&self, goal: &Goal) -> Result<(), CoreError> {
        let result = sqlx::query(
            r#"UPDATE goals SET
                name = $1, short_description = $2, detailed_description = $3,
                start_date = $4, end_date = $5, status_id = $6,
                difficulty_id = $7, priority_id = $8, updated_at = $9
            WHERE id = $10
            "#,
        )
        .bind(&goal.name)
        .bind(&goal.short_description)
        .bind(&goal.detailed_description)
        .bind(goal.start_date)
        .bind(goal.end_date)
        .bind(goal.status_id)
        .bind(goal.difficulty_id)
        .bind(goal.priority_id)
        .bind(Utc::now())
        .bind(goal.id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(goal.id.to_string()));
        }
        Ok(())
    }

    async fn find_goal_by_id(&self, id: Uuid) -> Result<Option<Goal>, CoreError> {
        let goal = sqlx::query_as("SELECT * FROM goals WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(goal)
    }

    async fn find_goals_by_owner(&self, owner_id: &str) -> Result<Vec<Goal>, CoreError> {
        let goals = sqlx::query_as("SELECT * FROM goals WHERE owner_id = $1 ORDER BY updated_at DESC")
            .bind(owner_id)
            .fetch_all(self.pool())
            .await?;
        Ok(goals)
    }

    async fn delete_goal(&self, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM goals WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn count_goals_with_status(
        &self,
        owner_id: &str,
        status_ids: &[Uuid],
    ) -> Result<i64, CoreError> {
        if status_ids.is_empty() {
            return Ok(0);
        }
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM goals WHERE owner_id = ");
        qb.push_bind(owner_id);
        qb.push(" AND status_id IN (");
        {
            let mut separated = qb.separated(", ");
            for id in status_ids {
                separated.push_bind(*id);
            }
        }
        qb.push(")");

        let (count,): (i64,) = qb.build_query_as().fetch_one(self.pool()).await?;
        Ok(count)
    }

    async fn detach_goal_from_works(&self, goal_id: Uuid) -> Result<(), CoreError> {
        sqlx::query("UPDATE works SET goal_id = NULL, updated_at = $1 WHERE goal_id = $2")
            .bind(Utc::now())
            .bind(goal_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
