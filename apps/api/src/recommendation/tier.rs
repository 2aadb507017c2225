//! Tier classification for job postings.
//!
//! Tier names are matched against an explicit list of known spellings. Anything
//! unrecognised lands in `Latest`, the bucket with no editorial boost.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Editorial tier of a job posting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Mega,
    Premium,
    Prime,
    Newspaper,
    #[default]
    Latest,
}

const JOB_SUFFIXES: &[&str] = &["_job", "-job", " job"];

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Mega,
        Tier::Premium,
        Tier::Prime,
        Tier::Newspaper,
        Tier::Latest,
    ];

    /// Classifies a raw tier string. Missing or unknown tiers map to `Latest`.
    pub fn classify(raw: Option<&str>) -> Tier {
        let Some(raw) = raw else {
            return Tier::Latest;
        };
        let normalized = raw.trim().to_lowercase();
        let base = JOB_SUFFIXES
            .iter()
            .find_map(|suffix| normalized.strip_suffix(suffix))
            .unwrap_or(&normalized);

        match base {
            "mega" => Tier::Mega,
            "premium" => Tier::Premium,
            "prime" => Tier::Prime,
            "newspaper" | "news" => Tier::Newspaper,
            "latest" | "" => Tier::Latest,
            _ => {
                debug!("Unknown job tier '{raw}', treating as latest");
                Tier::Latest
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Mega => "mega",
            Tier::Premium => "premium",
            Tier::Prime => "prime",
            Tier::Newspaper => "newspaper",
            Tier::Latest => "latest",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portal_tier_names() {
        assert_eq!(Tier::classify(Some("mega_job")), Tier::Mega);
        assert_eq!(Tier::classify(Some("premium")), Tier::Premium);
        assert_eq!(Tier::classify(Some("prime_job")), Tier::Prime);
        assert_eq!(Tier::classify(Some("newspaper_job")), Tier::Newspaper);
        assert_eq!(Tier::classify(Some("latest_job")), Tier::Latest);
    }

    #[test]
    fn test_case_and_whitespace_are_ignored() {
        assert_eq!(Tier::classify(Some("  MEGA_JOB ")), Tier::Mega);
        assert_eq!(Tier::classify(Some("Premium Job")), Tier::Premium);
        assert_eq!(Tier::classify(Some("prime-job")), Tier::Prime);
        assert_eq!(Tier::classify(Some("news")), Tier::Newspaper);
    }

    #[test]
    fn test_substring_lookalikes_are_not_promoted() {
        assert_eq!(Tier::classify(Some("notmega")), Tier::Latest);
        assert_eq!(Tier::classify(Some("megaphone_job")), Tier::Latest);
        assert_eq!(Tier::classify(Some("newsletter")), Tier::Latest);
    }

    #[test]
    fn test_missing_tier_is_latest() {
        assert_eq!(Tier::classify(None), Tier::Latest);
        assert_eq!(Tier::classify(Some("")), Tier::Latest);
    }

    #[test]
    fn test_as_str_round_trips_through_classify() {
        for tier in Tier::ALL {
            assert_eq!(Tier::classify(Some(tier.as_str())), tier);
        }
    }
}
