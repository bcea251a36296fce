use shared_types::{DiscoveryPreferences, Prospect, ProspectSort};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::cache::EngagementCache;
use crate::error::{EngagementError, Result};
use crate::fence::RequestFence;
use crate::gateway::ServiceGateway;

#[derive(Debug, Clone, Default)]
pub struct ProspectFilter {
    /// Case-insensitive substring over author, role, company and industry
    pub query: Option<String>,
    /// Minimum alignment score in [0, 1]
    pub min_score: Option<f64>,
    pub sort: ProspectSort,
}

/// Reconciliation of two discovery runs by natural key (author + company).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProspectDiff {
    pub added: usize,
    pub dropped: usize,
    pub retained: usize,
}

impl ProspectDiff {
    pub fn between(previous: &[Prospect], next: &[Prospect]) -> Self {
        let before: HashSet<String> = previous.iter().map(Prospect::natural_key).collect();
        let after: HashSet<String> = next.iter().map(Prospect::natural_key).collect();

        let retained = after.intersection(&before).count();
        Self {
            added: after.len() - retained,
            dropped: before.len() - retained,
            retained,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    /// The collection now holds exactly the new run
    Replaced(ProspectDiff),
    /// Discovery came back empty; the previous collection is untouched
    NoResults,
    /// A newer discovery was issued while this one was in flight
    Superseded,
}

/// Owns the session's prospect collection. Every discovery replaces the
/// collection wholesale; nothing is merged across runs.
pub struct ProspectStore {
    gateway: Arc<dyn ServiceGateway>,
    prospects: RwLock<Vec<Prospect>>,
    fence: RequestFence,
}

impl ProspectStore {
    pub fn new(gateway: Arc<dyn ServiceGateway>) -> Self {
        Self {
            gateway,
            prospects: RwLock::new(Vec::new()),
            fence: RequestFence::new(),
        }
    }

    /// Seed from the precomputed snapshot. An empty snapshot leaves the
    /// collection as it is.
    pub async fn load_cached(&self, cache: &EngagementCache) -> usize {
        let cached = cache.cached_prospects().await;
        if cached.is_empty() {
            return 0;
        }
        let count = cached.len();
        *self.prospects.write().await = cached;
        tracing::info!("Loaded {} cached prospects", count);
        count
    }

    pub async fn snapshot(&self) -> Vec<Prospect> {
        self.prospects.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.prospects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.prospects.read().await.is_empty()
    }

    pub async fn filtered(&self, filter: &ProspectFilter) -> Vec<Prospect> {
        let prospects = self.prospects.read().await;
        let query = filter.query.as_deref().unwrap_or("");

        let mut matching: Vec<Prospect> = prospects
            .iter()
            .filter(|p| p.matches_query(query))
            .filter(|p| filter.min_score.map_or(true, |min| p.alignment_score >= min))
            .cloned()
            .collect();

        if filter.sort == ProspectSort::Alignment {
            matching.sort_by(|a, b| {
                b.alignment_score
                    .partial_cmp(&a.alignment_score)
                    .unwrap_or(Ordering::Equal)
            });
        }
        matching
    }

    pub async fn discover(&self, preferences: DiscoveryPreferences) -> Result<DiscoveryOutcome> {
        let preferences = normalize_preferences(preferences)?;
        let ticket = self.fence.issue();

        let found = self.gateway.discover_prospects(&preferences).await?;

        let mut prospects = self.prospects.write().await;
        if !self.fence.is_current(ticket) {
            tracing::debug!("Discarding superseded discovery result ({} prospects)", found.len());
            return Ok(DiscoveryOutcome::Superseded);
        }
        if found.is_empty() {
            tracing::info!("Discovery returned no prospects, keeping current list");
            return Ok(DiscoveryOutcome::NoResults);
        }

        let diff = ProspectDiff::between(&prospects, &found);
        *prospects = found;
        tracing::info!(
            "Replaced prospects: {} added, {} dropped, {} retained",
            diff.added,
            diff.dropped,
            diff.retained
        );
        Ok(DiscoveryOutcome::Replaced(diff))
    }
}

/// Company description and goal are mandatory; job titles are trimmed with
/// blanks and duplicates removed.
pub fn normalize_preferences(preferences: DiscoveryPreferences) -> Result<DiscoveryPreferences> {
    let company_description = preferences.company_description.trim().to_string();
    let goal = preferences.goal.trim().to_string();

    if company_description.is_empty() {
        return Err(EngagementError::validation("Company description is required"));
    }
    if goal.is_empty() {
        return Err(EngagementError::validation("Goal is required"));
    }

    let mut seen = HashSet::new();
    let job_titles = preferences
        .job_titles
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_string()))
        .map(str::to_string)
        .collect();

    Ok(DiscoveryPreferences {
        company_description,
        goal,
        job_titles,
    })
}
