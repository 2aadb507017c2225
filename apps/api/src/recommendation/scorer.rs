//! Recommendation scorer — ranks active jobs for a job seeker.
//!
//! Pure and synchronous. Settings and the reference time are passed in by the
//! caller; nothing here touches storage or the clock.
//!
//! Score = Σ signals:
//! - skill–tag match: `skillTag` per job tag found in the user's skills
//! - title-token match: `titleToken` per title token found in the user's skills
//! - saved-category affinity: flat `savedCategory` if a saved job shares the category
//! - tier bonus: `tier[<tier>]`
//! - recency: `recencyMaxBonus - min(ageDays, recencyMaxBonus)`, floored at zero

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::job::Job;
use crate::recommendation::settings::RecommendationSettings;
use crate::recommendation::tier::Tier;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Contribution of each signal to a job's score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub skill_tag: f64,
    pub title_token: f64,
    pub saved_category: f64,
    pub tier: f64,
    pub recency: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.skill_tag + self.title_token + self.saved_category + self.tier + self.recency
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredJob {
    pub job: Job,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Per-user lookup sets, built once per ranking.
#[derive(Debug, Clone, Default)]
pub struct ScoringContext {
    skills: HashSet<String>,
    saved_categories: HashSet<String>,
}

impl ScoringContext {
    /// `jobs` is the pool used to resolve `saved_job_ids` into categories.
    pub fn new(jobs: &[Job], skills: &[String], saved_job_ids: &[String]) -> Self {
        let skills = skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let saved_ids: HashSet<&str> = saved_job_ids.iter().map(String::as_str).collect();
        let saved_categories = jobs
            .iter()
            .filter(|job| saved_ids.contains(job.id.as_str()))
            .filter_map(|job| normalize_category(job.category.as_deref()))
            .collect();

        Self {
            skills,
            saved_categories,
        }
    }
}

/// Scores a single job. Never fails: missing fields contribute nothing.
pub fn score_job(
    job: &Job,
    ctx: &ScoringContext,
    settings: &RecommendationSettings,
    now: DateTime<Utc>,
) -> ScoreBreakdown {
    let weights = &settings.weights;

    let tag_hits = job
        .tags
        .iter()
        .filter(|tag| ctx.skills.contains(&tag.trim().to_lowercase()))
        .count();

    let token_hits = title_tokens(&job.title)
        .filter(|token| ctx.skills.contains(token))
        .count();

    let saved_category = match normalize_category(job.category.as_deref()) {
        Some(category) if ctx.saved_categories.contains(&category) => weights.saved_category,
        _ => 0.0,
    };

    let tier = weights.tier.weight(Tier::classify(job.tier.as_deref()));

    let recency = match job_age_days(job, now) {
        Some(age) => recency_bonus(age, weights.recency_max_bonus),
        None => 0.0,
    };

    ScoreBreakdown {
        skill_tag: tag_hits as f64 * weights.skill_tag,
        title_token: token_hits as f64 * weights.title_token,
        saved_category,
        tier,
        recency,
    }
}

/// Ranks every job best-first without truncating.
///
/// Ties on score go to the more recently dated job, then to the lower id.
pub fn rank_all(
    jobs: &[Job],
    skills: &[String],
    saved_job_ids: &[String],
    settings: &RecommendationSettings,
    now: DateTime<Utc>,
) -> Vec<ScoredJob> {
    let ctx = ScoringContext::new(jobs, skills, saved_job_ids);

    let mut ranked: Vec<(ScoredJob, Option<DateTime<Utc>>)> = jobs
        .iter()
        .map(|job| {
            let breakdown = score_job(job, &ctx, settings, now);
            let dated = match effective_date(job) {
                DateSignal::Parsed(d) => Some(d),
                DateSignal::Missing | DateSignal::Invalid => None,
            };
            let scored = ScoredJob {
                job: job.clone(),
                score: breakdown.total(),
                breakdown,
            };
            (scored, dated)
        })
        .collect();

    ranked.sort_by(|(a, a_date), (b, b_date)| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| cmp_newest_first(a_date, b_date))
            .then_with(|| a.job.id.cmp(&b.job.id))
    });

    ranked.into_iter().map(|(scored, _)| scored).collect()
}

/// Top `settings.count` jobs, best-first.
pub fn recommend(
    jobs: &[Job],
    skills: &[String],
    saved_job_ids: &[String],
    settings: &RecommendationSettings,
    now: DateTime<Utc>,
) -> Vec<ScoredJob> {
    let mut ranked = rank_all(jobs, skills, saved_job_ids, settings, now);
    ranked.truncate(settings.count);
    ranked
}

/// Linear decay from `max_bonus` at age 0 to zero at `max_bonus` days.
pub fn recency_bonus(age_days: f64, max_bonus: f64) -> f64 {
    if !age_days.is_finite() {
        return 0.0;
    }
    let age = age_days.max(0.0);
    (max_bonus - age.min(max_bonus)).max(0.0)
}

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%d %H:%M:%S%.f%#z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses the date formats the portal emits. All naive values are taken as UTC.
pub fn parse_job_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }
    // SQL-style dumps often drop the offset or write a trailing `Z` after a space.
    let naive = raw.strip_suffix('Z').unwrap_or(raw);
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
    {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

enum DateSignal {
    Parsed(DateTime<Utc>),
    Missing,
    Invalid,
}

/// `publishedDate` wins over `postedDate`; blank strings count as absent.
fn effective_date(job: &Job) -> DateSignal {
    let raw = [job.published_date.as_deref(), job.posted_date.as_deref()]
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty());

    match raw {
        None => DateSignal::Missing,
        Some(raw) => parse_job_date(raw).map_or(DateSignal::Invalid, DateSignal::Parsed),
    }
}

/// Age in fractional days. Undated jobs are as old as `now`; unparsable dates have no age.
fn job_age_days(job: &Job, now: DateTime<Utc>) -> Option<f64> {
    match effective_date(job) {
        DateSignal::Parsed(date) => {
            let age = (now - date).num_milliseconds() as f64 / MILLIS_PER_DAY;
            age.is_finite().then_some(age)
        }
        DateSignal::Missing => Some(0.0),
        DateSignal::Invalid => None,
    }
}

fn title_tokens(title: &str) -> impl Iterator<Item = String> + '_ {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn normalize_category(category: Option<&str>) -> Option<String> {
    let category = category?.trim();
    (!category.is_empty()).then(|| category.to_lowercase())
}

fn cmp_newest_first(a: &Option<DateTime<Utc>>, b: &Option<DateTime<Utc>>) -> Ordering {
    // None < Some, so reversing puts undated jobs last.
    b.cmp(a)
}
