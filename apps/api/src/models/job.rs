use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use tracing::warn;

/// A job posting as consumed by the recommender.
///
/// Mirrors the portal's wire format (camelCase). Everything except the id is
/// optional, and `null` is treated like a missing field, so partially
/// populated records still score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "JobRecord")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Ids arrive as strings, numbers, or Mongo `{"$oid": ...}` objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordId {
    Text(String),
    Number(serde_json::Number),
    Oid {
        #[serde(rename = "$oid")]
        oid: String,
    },
}

impl RecordId {
    fn into_string(self) -> String {
        match self {
            RecordId::Text(s) => s.trim().to_string(),
            RecordId::Number(n) => n.to_string(),
            RecordId::Oid { oid } => oid.trim().to_string(),
        }
    }
}

/// Loose wire shape; `id` wins over `_id` when both are present.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobRecord {
    id: Option<RecordId>,
    #[serde(rename = "_id")]
    mongo_id: Option<RecordId>,
    title: Option<String>,
    tags: Option<Vec<Option<String>>>,
    category: Option<String>,
    tier: Option<String>,
    published_date: Option<String>,
    posted_date: Option<String>,
    status: Option<String>,
}

impl TryFrom<JobRecord> for Job {
    type Error = String;

    fn try_from(record: JobRecord) -> Result<Self, Self::Error> {
        let id = [record.id, record.mongo_id]
            .into_iter()
            .flatten()
            .map(RecordId::into_string)
            .find(|id| !id.is_empty())
            .ok_or_else(|| "job record has no id".to_string())?;

        Ok(Job {
            id,
            title: record.title.unwrap_or_default(),
            tags: record.tags.unwrap_or_default().into_iter().flatten().collect(),
            category: record.category,
            tier: record.tier,
            published_date: record.published_date,
            posted_date: record.posted_date,
            status: record.status,
        })
    }
}

/// Decodes each element on its own, dropping records that cannot be read.
pub fn collect_jobs(values: Vec<Value>) -> Vec<Job> {
    let total = values.len();
    let jobs: Vec<Job> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<Job>(value) {
            Ok(job) => Some(job),
            Err(e) => {
                warn!("Skipping unreadable job record at index {index}: {e}");
                None
            }
        })
        .collect();
    if jobs.len() < total {
        warn!("Dropped {} of {} job records", total - jobs.len(), total);
    }
    jobs
}

/// `deserialize_with` helper for job lists; a `null` list is empty.
pub fn deserialize_job_list<'de, D>(deserializer: D) -> Result<Vec<Job>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(collect_jobs(values.unwrap_or_default()))
}

impl Job {
    /// Jobs without a status are treated as active.
    pub fn is_active(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| s.trim().eq_ignore_ascii_case("active"))
            .unwrap_or(true)
    }
}

/// Row shape of the portal's `jobs` table.
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub tier: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub posted_at: Option<DateTime<Utc>>,
    pub status: String,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Job {
            id: row.id,
            title: row.title,
            tags: row.tags,
            category: row.category,
            tier: row.tier,
            published_date: row.published_at.map(|d| d.to_rfc3339()),
            posted_date: row.posted_at.map(|d| d.to_rfc3339()),
            status: Some(row.status),
        }
    }
}

/// Per-user recommendation inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeekerProfile {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub saved_job_ids: Vec<String>,
}
