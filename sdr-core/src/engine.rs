use chrono_tz::Tz;
use shared_types::DashboardSnapshot;
use std::sync::Arc;

use crate::account::AccountLink;
use crate::aggregation;
use crate::cache::EngagementCache;
use crate::calendar::{CalendarGateway, DEFAULT_MAX_RESULTS};
use crate::emails::EmailLifecycleManager;
use crate::gateway::ServiceGateway;
use crate::meetings::MeetingBotOrchestrator;
use crate::prospects::ProspectStore;
use crate::storage::KeyValueStore;

#[derive(Debug, Clone)]
pub struct CoreOptions {
    pub timezone: Option<Tz>,
    pub calendar_max_results: u32,
}

impl Default for CoreOptions {
    fn default() -> Self {
        Self {
            timezone: None,
            calendar_max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// All engagement components wired to one gateway and one snapshot store.
pub struct EngagementCore {
    pub account: AccountLink,
    pub cache: EngagementCache,
    pub prospects: ProspectStore,
    pub emails: EmailLifecycleManager,
    pub meetings: MeetingBotOrchestrator,
    pub calendar: CalendarGateway,
}

impl EngagementCore {
    pub fn new(
        gateway: Arc<dyn ServiceGateway>,
        store: Arc<dyn KeyValueStore>,
        options: CoreOptions,
    ) -> Self {
        let account = AccountLink::new(gateway.clone());
        Self {
            cache: EngagementCache::new(store),
            prospects: ProspectStore::new(gateway.clone()),
            emails: EmailLifecycleManager::new(gateway.clone(), account.clone()),
            meetings: MeetingBotOrchestrator::new(gateway.clone()),
            calendar: CalendarGateway::new(gateway, account.clone())
                .with_timezone(options.timezone)
                .with_default_max_results(options.calendar_max_results),
            account,
        }
    }

    /// Seed prospects and pending replies from the snapshot store.
    pub async fn warm_from_cache(&self) {
        let prospects = self.prospects.load_cached(&self.cache).await;
        let replies = self.emails.load_cached_replies(&self.cache).await;
        tracing::info!(
            "Warmed from cache: {} prospects, {} analyzed replies",
            prospects,
            replies
        );
    }

    pub async fn dashboard(&self) -> DashboardSnapshot {
        let emails = self.emails.emails().await;
        let meetings = self.meetings.all().await;
        let prospects = self.prospects.snapshot().await;

        DashboardSnapshot {
            stats: aggregation::compute(&emails, &meetings, &prospects),
            recent_activity: aggregation::recent_activity(&emails, &meetings),
            cached_replies: self.cache.cached_analyzed_emails().await,
        }
    }
}
