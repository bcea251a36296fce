use shared_types::{
    AddBotRequest, ItemList, KnowledgeBaseAnswer, KnowledgeBaseQuery, KnowledgeBaseSource,
    Meeting, MeetingDetail, MeetingStatus, ResolvedSource,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{EngagementError, Result};
use crate::fence::RequestFence;
use crate::gateway::{require_session, ServiceGateway, Session};

pub const DEFAULT_KNOWLEDGE_BASE_RESULTS: u32 = 5;

const NO_ACTION_ITEMS: &str = "No action items recorded for this meeting";
const NO_INSIGHTS: &str = "No insights recorded for this meeting";
const NO_TRANSCRIPT: &str = "No transcript available for this meeting.";
const NO_SUMMARY: &str = "No summary available for this meeting.";

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Full meeting set after the completed subset was replaced
    Refreshed(Vec<Meeting>),
    /// The provider answered without a meeting list; nothing changed
    NoMeetings,
    Superseded,
}

/// Owns the meeting-recording sessions. Active meetings are local until
/// removed; the completed subset mirrors the provider's last answer.
pub struct MeetingBotOrchestrator {
    gateway: Arc<dyn ServiceGateway>,
    meetings: RwLock<Vec<Meeting>>,
    refresh_fence: RequestFence,
}

impl MeetingBotOrchestrator {
    pub fn new(gateway: Arc<dyn ServiceGateway>) -> Self {
        Self {
            gateway,
            meetings: RwLock::new(Vec::new()),
            refresh_fence: RequestFence::new(),
        }
    }

    /// Initial load of every meeting the provider knows about.
    pub async fn bootstrap(&self) -> Result<usize> {
        let ticket = self.refresh_fence.issue();
        let fetched = self.gateway.list_meetings(None).await?;

        let mut meetings = self.meetings.write().await;
        let Some(fetched) = fetched.filter(|_| self.refresh_fence.is_current(ticket)) else {
            return Ok(meetings.len());
        };
        let count = fetched.len();
        *meetings = fetched;
        tracing::info!("Loaded {} meetings from provider", count);
        Ok(count)
    }

    pub async fn all(&self) -> Vec<Meeting> {
        self.meetings.read().await.clone()
    }

    pub async fn active(&self) -> Vec<Meeting> {
        self.by_status(MeetingStatus::Active).await
    }

    pub async fn completed(&self) -> Vec<Meeting> {
        self.by_status(MeetingStatus::Completed).await
    }

    async fn by_status(&self, status: MeetingStatus) -> Vec<Meeting> {
        self.meetings
            .read()
            .await
            .iter()
            .filter(|m| m.status == status)
            .cloned()
            .collect()
    }

    pub async fn add_bot(&self, meeting_url: &str, title: Option<&str>) -> Result<Meeting> {
        let meeting_url = validate_meeting_url(meeting_url)?;
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let request = AddBotRequest {
            title: title.clone().unwrap_or_default(),
            meeting_url: meeting_url.clone(),
        };
        let created = self.gateway.add_bot(&request).await?;

        let meeting = Meeting::active(created.id, created.bot_id, meeting_url, title);
        self.meetings.write().await.insert(0, meeting.clone());
        tracing::info!("Bot {} joining {}", meeting.bot_id, meeting.meeting_url);
        Ok(meeting)
    }

    /// Removed locally only once the provider confirms the delete.
    pub async fn remove_bot(&self, id: &str) -> Result<Meeting> {
        let meeting = self
            .find(id)
            .await
            .ok_or_else(|| EngagementError::validation(format!("Unknown meeting {}", id)))?;
        if !meeting.is_active() {
            tracing::warn!("Removing completed meeting {} (best effort)", id);
        }

        self.gateway.remove_bot(&meeting).await?;

        self.meetings.write().await.retain(|m| m.id != meeting.id);
        tracing::info!("Removed meeting {}", meeting.id);
        Ok(meeting)
    }

    /// Active meetings are kept verbatim; the completed subset becomes
    /// exactly what the provider returned.
    pub async fn refresh_completed(&self) -> Result<RefreshOutcome> {
        let ticket = self.refresh_fence.issue();
        let fetched = self
            .gateway
            .list_meetings(Some(MeetingStatus::Completed))
            .await?;

        let mut meetings = self.meetings.write().await;
        if !self.refresh_fence.is_current(ticket) {
            tracing::debug!("Discarding superseded meeting refresh");
            return Ok(RefreshOutcome::Superseded);
        }
        let Some(fetched) = fetched else {
            tracing::info!("No new meetings found");
            return Ok(RefreshOutcome::NoMeetings);
        };

        let (completed, other): (Vec<Meeting>, Vec<Meeting>) = fetched
            .into_iter()
            .partition(|m| m.status == MeetingStatus::Completed);
        if !other.is_empty() {
            tracing::warn!(
                "Ignoring {} non-completed meetings in completed refresh",
                other.len()
            );
        }

        let mut next: Vec<Meeting> = meetings.iter().filter(|m| m.is_active()).cloned().collect();
        let completed_count = completed.len();
        next.extend(completed);
        *meetings = next;

        tracing::info!("Refreshed meetings: {} completed", completed_count);
        Ok(RefreshOutcome::Refreshed(meetings.clone()))
    }

    pub async fn detail(&self, id: &str) -> Result<MeetingDetail> {
        let meeting = self
            .find(id)
            .await
            .ok_or_else(|| EngagementError::validation(format!("Unknown meeting {}", id)))?;
        Ok(meeting_detail(&meeting))
    }

    pub async fn search_knowledge_base(
        &self,
        session: Option<&Session>,
        query: &str,
        max_results: Option<u32>,
    ) -> Result<KnowledgeBaseAnswer> {
        let session = require_session(session)?;
        let query = query.trim();
        if query.is_empty() {
            return Err(EngagementError::validation("Please enter a question"));
        }

        let request = KnowledgeBaseQuery {
            query: query.to_string(),
            max_results: Some(max_results.unwrap_or(DEFAULT_KNOWLEDGE_BASE_RESULTS)),
        };
        let answer = self.gateway.search_knowledge_base(session, &request).await?;
        if answer.status == "error" {
            let message = if answer.response.trim().is_empty() {
                "Knowledge base search failed".to_string()
            } else {
                answer.response
            };
            return Err(EngagementError::external(message));
        }
        Ok(answer)
    }

    /// The local meeting a knowledge-base source points at, if still known.
    pub async fn resolve_source(&self, source: &KnowledgeBaseSource) -> Option<Meeting> {
        self.meetings
            .read()
            .await
            .iter()
            .find(|m| m.id == source.meeting_id || m.bot_id == source.meeting_id)
            .cloned()
    }

    pub async fn resolve_sources(&self, sources: Vec<KnowledgeBaseSource>) -> Vec<ResolvedSource> {
        let mut resolved = Vec::with_capacity(sources.len());
        for source in sources {
            let meeting = self.resolve_source(&source).await;
            resolved.push(ResolvedSource {
                relevance_percent: source.relevance_percent(),
                source,
                meeting,
            });
        }
        resolved
    }

    async fn find(&self, id: &str) -> Option<Meeting> {
        self.meetings.read().await.iter().find(|m| m.id == id).cloned()
    }
}

fn validate_meeting_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let invalid = || EngagementError::validation("Please enter a valid meeting URL");
    let parsed = url::Url::parse(raw).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(invalid());
    }
    Ok(raw.to_string())
}

/// Notes panel contents. Each field degrades to a fallback on its own, so a
/// malformed list never hides the rest of the meeting.
pub fn meeting_detail(meeting: &Meeting) -> MeetingDetail {
    MeetingDetail {
        title: meeting.display_title().to_string(),
        transcript: text_or(&meeting.transcript, NO_TRANSCRIPT),
        summary: text_or(&meeting.ai_summary, NO_SUMMARY),
        action_items: items_or(
            &meeting.id,
            "action_items",
            meeting.action_items.as_ref(),
            NO_ACTION_ITEMS,
        ),
        key_insights: items_or(&meeting.id, "insights", meeting.insights.as_ref(), NO_INSIGHTS),
        sentiment: "Neutral".to_string(),
    }
}

fn text_or(value: &Option<String>, fallback: &str) -> String {
    value
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}

fn items_or(meeting_id: &str, field: &str, items: Option<&ItemList>, fallback: &str) -> Vec<String> {
    let decoded = match items.map(ItemList::decode) {
        Some(Ok(items)) => items,
        Some(Err(e)) => {
            let err = EngagementError::Parse(e.to_string());
            tracing::warn!("Meeting {} has malformed {}: {}", meeting_id, field, err);
            Vec::new()
        }
        None => Vec::new(),
    };

    let decoded: Vec<String> = decoded
        .into_iter()
        .filter(|item| !item.trim().is_empty())
        .collect();
    if decoded.is_empty() {
        vec![fallback.to_string()]
    } else {
        decoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{meeting, session, Call, FakeGateway};
    use shared_types::KnowledgeBaseSource;
    use std::time::Duration;

    fn ids(meetings: &[Meeting]) -> Vec<&str> {
        meetings.iter().map(|m| m.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_add_bot_inserts_active_at_front() {
        let fake = Arc::new(FakeGateway::new());
        let orchestrator = MeetingBotOrchestrator::new(fake.clone());

        orchestrator
            .add_bot("https://meet.google.com/abc-defg-hij", Some("Discovery call"))
            .await
            .unwrap();
        let second = orchestrator
            .add_bot("https://zoom.us/j/123", Some("  "))
            .await
            .unwrap();

        assert_eq!(second.status, MeetingStatus::Active);
        assert_eq!(second.id, "meeting-2");
        assert_eq!(second.bot_id, "bot-2");
        assert_eq!(second.title, None);
        assert_eq!(ids(&orchestrator.active().await), vec!["meeting-2", "meeting-1"]);
    }

    #[tokio::test]
    async fn test_add_bot_rejects_invalid_url() {
        let fake = Arc::new(FakeGateway::new());
        let orchestrator = MeetingBotOrchestrator::new(fake.clone());

        for url in ["", "meet.google.com/abc", "ftp://example.com/x"] {
            let err = orchestrator.add_bot(url, None).await.unwrap_err();
            assert!(matches!(err, EngagementError::Validation(_)));
        }
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_remove_bot_failure_keeps_meeting() {
        let fake = Arc::new(FakeGateway::new());
        let orchestrator = MeetingBotOrchestrator::new(fake.clone());
        let added = orchestrator
            .add_bot("https://meet.google.com/abc", None)
            .await
            .unwrap();

        fake.fail_next("remove_bot", EngagementError::external("bot not found"));
        let err = orchestrator.remove_bot(&added.id).await.unwrap_err();
        assert!(matches!(err, EngagementError::ExternalService { .. }));
        assert_eq!(orchestrator.active().await.len(), 1);

        orchestrator.remove_bot(&added.id).await.unwrap();
        assert!(orchestrator.all().await.is_empty());
        assert!(fake.calls().contains(&Call::RemoveBot(added.id.clone())));
    }

    #[tokio::test]
    async fn test_refresh_replaces_completed_and_keeps_active() {
        let fake = Arc::new(FakeGateway::new());
        let orchestrator = MeetingBotOrchestrator::new(fake.clone());

        fake.push_meetings(
            Duration::ZERO,
            Some(vec![
                meeting("a1", MeetingStatus::Active),
                meeting("c1", MeetingStatus::Completed),
            ]),
        );
        orchestrator.bootstrap().await.unwrap();

        fake.push_meetings(
            Duration::ZERO,
            Some(vec![
                meeting("c2", MeetingStatus::Completed),
                meeting("a9", MeetingStatus::Active),
            ]),
        );
        let outcome = orchestrator.refresh_completed().await.unwrap();

        let RefreshOutcome::Refreshed(meetings) = outcome else {
            panic!("expected refresh to apply");
        };
        assert_eq!(ids(&meetings), vec!["a1", "c2"]);
        assert_eq!(orchestrator.active().await[0], meeting("a1", MeetingStatus::Active));
        assert!(fake
            .calls()
            .contains(&Call::ListMeetings(Some(MeetingStatus::Completed))));
    }

    #[tokio::test]
    async fn test_refresh_without_meetings_field_changes_nothing() {
        let fake = Arc::new(FakeGateway::new());
        let orchestrator = MeetingBotOrchestrator::new(fake.clone());
        fake.push_meetings(Duration::ZERO, Some(vec![meeting("c1", MeetingStatus::Completed)]));
        orchestrator.bootstrap().await.unwrap();

        fake.push_meetings(Duration::ZERO, None);
        assert_eq!(
            orchestrator.refresh_completed().await.unwrap(),
            RefreshOutcome::NoMeetings
        );
        assert_eq!(ids(&orchestrator.completed().await), vec!["c1"]);
    }

    #[tokio::test]
    async fn test_superseded_refresh_is_discarded() {
        let fake = Arc::new(FakeGateway::new());
        let orchestrator = MeetingBotOrchestrator::new(fake.clone());
        fake.push_meetings(
            Duration::from_millis(50),
            Some(vec![meeting("stale", MeetingStatus::Completed)]),
        );
        fake.push_meetings(Duration::ZERO, Some(vec![meeting("fresh", MeetingStatus::Completed)]));

        let (first, second) = tokio::join!(
            orchestrator.refresh_completed(),
            orchestrator.refresh_completed()
        );
        assert_eq!(first.unwrap(), RefreshOutcome::Superseded);
        assert!(matches!(second.unwrap(), RefreshOutcome::Refreshed(_)));
        assert_eq!(ids(&orchestrator.completed().await), vec!["fresh"]);
    }

    #[tokio::test]
    async fn test_superseded_empty_refresh_reports_superseded() {
        let fake = Arc::new(FakeGateway::new());
        let orchestrator = MeetingBotOrchestrator::new(fake.clone());
        fake.push_meetings(Duration::from_millis(50), None);
        fake.push_meetings(Duration::ZERO, Some(vec![meeting("fresh", MeetingStatus::Completed)]));

        let (first, second) = tokio::join!(
            orchestrator.refresh_completed(),
            orchestrator.refresh_completed()
        );
        assert_eq!(first.unwrap(), RefreshOutcome::Superseded);
        assert!(matches!(second.unwrap(), RefreshOutcome::Refreshed(_)));
        assert_eq!(ids(&orchestrator.completed().await), vec!["fresh"]);
    }

    #[test]
    fn test_detail_with_unexpected_item_shape() {
        let mut m = meeting("c1", MeetingStatus::Completed);
        m.action_items = Some(ItemList::Other(serde_json::json!({"items": ["x"]})));
        m.insights = Some(ItemList::Other(serde_json::json!(["Champion is the VP"])));

        let detail = meeting_detail(&m);
        assert_eq!(detail.action_items, vec![NO_ACTION_ITEMS.to_string()]);
        assert_eq!(detail.key_insights, vec!["Champion is the VP".to_string()]);
    }

    #[test]
    fn test_detail_with_malformed_action_items() {
        let mut m = meeting("c1", MeetingStatus::Completed);
        m.action_items = Some(ItemList::Encoded("not json".to_string()));
        m.insights = Some(ItemList::Encoded(r#"["Budget approved for Q3"]"#.to_string()));
        m.ai_summary = Some("Discussed rollout".to_string());

        let detail = meeting_detail(&m);
        assert_eq!(detail.action_items, vec![NO_ACTION_ITEMS.to_string()]);
        assert_eq!(detail.key_insights, vec!["Budget approved for Q3".to_string()]);
        assert_eq!(detail.summary, "Discussed rollout");
        assert_eq!(detail.transcript, NO_TRANSCRIPT);
        assert_eq!(detail.sentiment, "Neutral");
    }

    #[test]
    fn test_detail_with_missing_fields() {
        let mut m = meeting("c1", MeetingStatus::Completed);
        m.title = Some(" ".to_string());
        let detail = meeting_detail(&m);
        assert_eq!(detail.title, "Untitled Meeting");
        assert_eq!(detail.action_items, vec![NO_ACTION_ITEMS.to_string()]);
        assert_eq!(detail.key_insights, vec![NO_INSIGHTS.to_string()]);
        assert_eq!(detail.summary, NO_SUMMARY);
    }

    #[tokio::test]
    async fn test_knowledge_base_search() {
        let fake = Arc::new(FakeGateway::new());
        let orchestrator = MeetingBotOrchestrator::new(fake.clone());
        fake.push_meetings(Duration::ZERO, Some(vec![meeting("c1", MeetingStatus::Completed)]));
        orchestrator.bootstrap().await.unwrap();

        fake.set_knowledge_base(KnowledgeBaseAnswer {
            status: "success".to_string(),
            response: "Pricing came up twice.".to_string(),
            sources: vec![KnowledgeBaseSource {
                meeting_id: "c1".to_string(),
                title: "Meeting c1".to_string(),
                date: "2026-01-25".to_string(),
                score: 0.87,
            }],
        });

        let blank = orchestrator
            .search_knowledge_base(Some(&session()), "  ", None)
            .await;
        assert!(matches!(blank, Err(EngagementError::Validation(_))));

        let answer = orchestrator
            .search_knowledge_base(Some(&session()), "pricing", None)
            .await
            .unwrap();
        let mut sources = answer.sources;
        sources.push(KnowledgeBaseSource {
            meeting_id: "gone".to_string(),
            title: "Old call".to_string(),
            date: String::new(),
            score: 0.41,
        });
        let resolved = orchestrator.resolve_sources(sources).await;
        assert_eq!(resolved[0].relevance_percent, 87);
        assert_eq!(resolved[0].meeting.as_ref().unwrap().id, "c1");
        assert_eq!(resolved[1].meeting, None);
        assert!(fake.calls().contains(&Call::SearchKnowledgeBase {
            query: "pricing".to_string(),
            max_results: Some(DEFAULT_KNOWLEDGE_BASE_RESULTS),
        }));
    }
}
