use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::catalog::JobCatalog;
use crate::errors::AppError;
use crate::models::job::{Job, JobRow, SeekerProfile};

/// Reads jobs and seeker profiles straight from the portal's Postgres database.
#[derive(Clone)]
pub struct PgJobCatalog {
    pool: PgPool,
}

impl PgJobCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobCatalog for PgJobCatalog {
    async fn active_jobs(&self) -> Result<Vec<Job>, AppError> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, title, COALESCE(tags, '{}') AS tags, category, tier,
                   published_at, posted_at, status
            FROM jobs
            WHERE lower(status) = 'active'
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!("Loaded {} active jobs from Postgres", rows.len());
        Ok(rows.into_iter().map(Job::from).collect())
    }

    async fn seeker_profile(&self, user_id: &str) -> Result<Option<SeekerProfile>, AppError> {
        let skills: Option<Vec<String>> = sqlx::query_scalar(
            "SELECT COALESCE(skills, '{}') FROM job_seeker_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(skills) = skills else {
            return Ok(None);
        };

        let saved_job_ids: Vec<String> = sqlx::query_scalar(
            "SELECT job_id FROM saved_jobs WHERE user_id = $1 ORDER BY saved_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(SeekerProfile {
            user_id: user_id.to_string(),
            skills,
            saved_job_ids,
        }))
    }
}
