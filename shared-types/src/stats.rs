use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{EmailAnalysis, EmailMessage, Meeting};

/// Derived dashboard statistics. Recomputed on every request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub total_prospects: usize,
    pub emails_sent: usize,
    /// Whole percent, 0..=100
    pub response_rate: u32,
    /// Whole hours
    #[ts(type = "number")]
    pub avg_response_time: i64,
    pub completed_meetings: usize,
}

#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export)]
pub struct RecentActivity {
    pub meetings: Vec<Meeting>,
    pub emails: Vec<EmailMessage>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct DashboardSnapshot {
    pub stats: AggregateStats,
    pub recent_activity: RecentActivity,
    pub cached_replies: Vec<EmailAnalysis>,
}
