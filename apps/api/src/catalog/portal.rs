//! Portal API catalog — reads jobs and profiles from the job portal's REST API.
//!
//! Retries on 429 and 5xx with exponential backoff. Any other non-success
//! status is returned immediately, except 404 on a profile lookup, which means
//! the user is unknown.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::JobCatalog;
use crate::errors::AppError;
use crate::models::job::{collect_jobs, Job, SeekerProfile};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid portal URL: {0}")]
    Url(String),

    #[error("Portal API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Portal API still failing after {retries} attempts")]
    Exhausted { retries: u32 },
}

impl From<PortalError> for AppError {
    fn from(e: PortalError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

/// The jobs endpoint returns either a bare array or `{ "jobs": [...] }`.
/// Elements stay raw so one bad record does not sink the whole page.
#[derive(Deserialize)]
#[serde(untagged)]
enum JobsPayload {
    List(Vec<Value>),
    Wrapped {
        #[serde(alias = "data")]
        jobs: Vec<Value>,
    },
}

impl JobsPayload {
    fn into_jobs(self) -> Vec<Job> {
        match self {
            JobsPayload::List(values) | JobsPayload::Wrapped { jobs: values } => {
                collect_jobs(values)
            }
        }
    }
}

#[derive(Clone)]
pub struct PortalApiCatalog {
    client: Client,
    base_url: Url,
    token: Option<String>,
    retry_delay: Duration,
}

impl PortalApiCatalog {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, PortalError> {
        let base_url = Url::parse(base_url).map_err(|e| PortalError::Url(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(PortalError::Url(base_url.to_string()));
        }
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url,
            token,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    /// Overrides the first backoff step; later attempts double it.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, PortalError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PortalError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET with retry. Returns `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, PortalError> {
        let mut last_error: Option<PortalError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.retry_delay * (1 << (attempt - 1));
                warn!(
                    "Portal API attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let request = self.authorize(self.client.get(url.clone()).query(query));
            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(PortalError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Portal API returned {}: {}", status, body);
                last_error = Some(PortalError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }

            return decode(response).await.map(Some);
        }

        Err(last_error.unwrap_or(PortalError::Exhausted {
            retries: MAX_RETRIES,
        }))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, PortalError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(PortalError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}

#[async_trait]
impl JobCatalog for PortalApiCatalog {
    async fn active_jobs(&self) -> Result<Vec<Job>, AppError> {
        let url = self.endpoint(&["jobs"])?;
        let payload: Option<JobsPayload> = self.get_json(url, &[("status", "active")]).await?;
        let jobs = payload.map(JobsPayload::into_jobs).unwrap_or_default();
        debug!("Fetched {} jobs from portal API", jobs.len());
        Ok(jobs)
    }

    async fn seeker_profile(&self, user_id: &str) -> Result<Option<SeekerProfile>, AppError> {
        let url = self.endpoint(&["users", user_id, "profile"])?;
        let profile: Option<SeekerProfile> = self.get_json(url, &[]).await?;
        Ok(profile.map(|mut p| {
            if p.user_id.is_empty() {
                p.user_id = user_id.to_string();
            }
            p
        }))
    }
}
