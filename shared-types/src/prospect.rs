use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::null_to_default;

/// A candidate lead returned by the discovery collaborator.
///
/// Prospects carry no server-side identity; `natural_key` (author + company)
/// is what the dashboard uses to tell two discovery runs apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Prospect {
    #[serde(default, deserialize_with = "null_to_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub industry: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub pain_points: Vec<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub solution_fit: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub insights: String,
    /// Lead-fit quality in [0, 1]
    #[serde(default, deserialize_with = "null_to_default")]
    pub alignment_score: f64,
    #[serde(rename = "isProspect", default, deserialize_with = "null_to_default")]
    pub is_prospect: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentTier {
    High,
    Medium,
    Low,
}

impl Prospect {
    pub fn natural_key(&self) -> String {
        format!(
            "{}|{}",
            self.author.trim().to_lowercase(),
            self.company.trim().to_lowercase()
        )
    }

    /// Alignment score as a whole percentage, clamped to 0..=100.
    pub fn alignment_percent(&self) -> u32 {
        (self.alignment_score.clamp(0.0, 1.0) * 100.0).round() as u32
    }

    pub fn alignment_tier(&self) -> AlignmentTier {
        let percent = self.alignment_percent();
        if percent >= 80 {
            AlignmentTier::High
        } else if percent >= 50 {
            AlignmentTier::Medium
        } else {
            AlignmentTier::Low
        }
    }

    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        [&self.author, &self.role, &self.company, &self.industry]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

/// What the user tells discovery about their own company.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscoveryPreferences {
    pub company_description: String,
    pub goal: String,
    #[serde(default)]
    pub job_titles: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscoverProspectsResponse {
    #[serde(default, deserialize_with = "null_to_default")]
    pub prospects: Vec<Prospect>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ProspectSort {
    #[default]
    Alignment,
    Discovery,
}

/// Query parameters for the prospect list
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export)]
pub struct ListProspectsRequest {
    pub query: Option<String>,
    pub min_score: Option<f64>,
    pub sort: Option<ProspectSort>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct ProspectsResponse {
    pub prospects: Vec<Prospect>,
    pub total_count: usize,
    pub tiers: TierCounts,
}

/// How the listed prospects spread over the alignment tiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct TierCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TierCounts {
    pub fn tally(prospects: &[Prospect]) -> Self {
        prospects
            .iter()
            .fold(TierCounts::default(), |mut counts, p| {
                match p.alignment_tier() {
                    AlignmentTier::High => counts.high += 1,
                    AlignmentTier::Medium => counts.medium += 1,
                    AlignmentTier::Low => counts.low += 1,
                }
                counts
            })
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DiscoveryResponse {
    Replaced { count: usize },
    /// Discovery came back empty; the previous list is kept
    NoResults { message: String },
    /// A newer discovery request replaced this one
    Superseded { count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prospect(author: &str, company: &str, score: f64) -> Prospect {
        Prospect {
            author: author.to_string(),
            role: "CTO".to_string(),
            company: company.to_string(),
            industry: "Technology".to_string(),
            pain_points: vec!["Data management".to_string()],
            solution_fit: "High".to_string(),
            insights: "Interested in AI-driven solutions".to_string(),
            alignment_score: score,
            is_prospect: true,
        }
    }

    #[test]
    fn test_natural_key_ignores_case_and_padding() {
        let a = prospect("John Doe", "Tech Corp", 0.8);
        let b = prospect(" john doe", "TECH CORP ", 0.2);
        assert_eq!(a.natural_key(), b.natural_key());
    }

    #[test]
    fn test_alignment_tier() {
        assert_eq!(prospect("a", "b", 0.85).alignment_tier(), AlignmentTier::High);
        assert_eq!(prospect("a", "b", 0.8).alignment_tier(), AlignmentTier::High);
        assert_eq!(prospect("a", "b", 0.5).alignment_tier(), AlignmentTier::Medium);
        assert_eq!(prospect("a", "b", 0.49).alignment_tier(), AlignmentTier::Low);
        assert_eq!(prospect("a", "b", 3.0).alignment_percent(), 100);
    }

    #[test]
    fn test_tier_counts() {
        let prospects = [
            prospect("a", "b", 0.9),
            prospect("c", "d", 0.82),
            prospect("e", "f", 0.3),
        ];
        assert_eq!(
            TierCounts::tally(&prospects),
            TierCounts {
                high: 2,
                medium: 0,
                low: 1
            }
        );
    }

    #[test]
    fn test_deserialize_tolerates_nulls() {
        let json = r#"{"author": null, "role": "VP of Sales", "company": "Acme",
            "alignment_score": 0.7, "isProspect": true}"#;
        let p: Prospect = serde_json::from_str(json).unwrap();
        assert_eq!(p.author, "");
        assert_eq!(p.role, "VP of Sales");
        assert!(p.pain_points.is_empty());
        assert!(p.is_prospect);
    }
}
