//! Job catalog — where candidate jobs and seeker profiles come from.
//!
//! Backends are swapped at startup via `JOB_CATALOG`; handlers only see
//! `Arc<dyn JobCatalog>`.

pub mod portal;
pub mod postgres;

#[cfg(test)]
use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::job::{Job, SeekerProfile};

pub use portal::PortalApiCatalog;
pub use postgres::PgJobCatalog;

#[async_trait]
pub trait JobCatalog: Send + Sync {
    /// Jobs currently open for applications.
    async fn active_jobs(&self) -> Result<Vec<Job>, AppError>;

    /// Skills and bookmarks for a job seeker. `None` if the user is unknown.
    async fn seeker_profile(&self, user_id: &str) -> Result<Option<SeekerProfile>, AppError>;
}

/// Fixed catalog backing the handler tests.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct InMemoryJobCatalog {
    jobs: Vec<Job>,
    profiles: HashMap<String, SeekerProfile>,
}

#[cfg(test)]
impl InMemoryJobCatalog {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self {
            jobs,
            profiles: HashMap::new(),
        }
    }

    pub fn with_profile(mut self, profile: SeekerProfile) -> Self {
        self.profiles.insert(profile.user_id.clone(), profile);
        self
    }
}

#[cfg(test)]
#[async_trait]
impl JobCatalog for InMemoryJobCatalog {
    async fn active_jobs(&self) -> Result<Vec<Job>, AppError> {
        Ok(self.jobs.iter().filter(|j| j.is_active()).cloned().collect())
    }

    async fn seeker_profile(&self, user_id: &str) -> Result<Option<SeekerProfile>, AppError> {
        Ok(self.profiles.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_catalog_filters_inactive_jobs() {
        let catalog = InMemoryJobCatalog::new(vec![
            Job {
                id: "open".to_string(),
                status: Some("active".to_string()),
                ..Default::default()
            },
            Job {
                id: "closed".to_string(),
                status: Some("expired".to_string()),
                ..Default::default()
            },
        ]);
        let jobs = catalog.active_jobs().await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "open");
    }

    #[tokio::test]
    async fn test_in_memory_catalog_profile_lookup() {
        let catalog = InMemoryJobCatalog::default().with_profile(SeekerProfile {
            user_id: "u1".to_string(),
            skills: vec!["rust".to_string()],
            saved_job_ids: vec![],
        });
        assert!(catalog.seeker_profile("u1").await.unwrap().is_some());
        assert!(catalog.seeker_profile("u2").await.unwrap().is_none());
    }
}
