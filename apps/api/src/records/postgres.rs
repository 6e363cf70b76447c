use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::{Identity, NewResumeRow, ResumeRow};
use crate::records::RecordStore;

#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn latest_for_owner(&self, owner: &Identity) -> Result<Option<ResumeRow>, StoreError> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            r#"
            SELECT id, user_id, file_name, file_path, file_type, file_size, file_url, uploaded_at
            FROM resumes
            WHERE user_id = $1
            ORDER BY uploaded_at DESC
            LIMIT 1
            "#,
        )
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert(&self, row: NewResumeRow) -> Result<ResumeRow, StoreError> {
        let inserted = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes (user_id, file_name, file_path, file_type, file_size, file_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, file_name, file_path, file_type, file_size, file_url, uploaded_at
            "#,
        )
        .bind(&row.user_id)
        .bind(&row.file_name)
        .bind(&row.file_path)
        .bind(row.file_type.as_str())
        .bind(row.file_size)
        .bind(&row.file_url)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted resume {} for user {}", inserted.id, inserted.user_id);
        Ok(inserted)
    }

    async fn delete(&self, id: Uuid, owner: &Identity) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner.as_str())
            .execute(&self.pool)
            .await?;

        info!(
            "Deleted resume {id} for user {owner} ({} row(s))",
            result.rows_affected()
        );
        Ok(())
    }
}
