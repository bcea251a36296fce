//! Typed boundary to the external collaborators: the AI backend, the
//! mail/calendar provider and the meeting-bot provider.
//!
//! Managers only ever talk to [`ServiceGateway`]; [`HttpServiceGateway`] is
//! the production implementation.

pub mod http;

pub use http::HttpServiceGateway;

use async_trait::async_trait;
use shared_types::{
    AddBotRequest, CalendarEvent, ConnectionStatus, CreatedBot, DiscoveryPreferences, EmailDraft,
    KnowledgeBaseAnswer, KnowledgeBaseQuery, Meeting, MeetingStatus, NewEvent, Prospect,
    RepliesResponse, SendEmailRequest,
};

use crate::error::{EngagementError, Result};

/// A signed-in user's bearer credential, issued by the external auth service.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access_token: String,
}

impl Session {
    /// Blank tokens are not sessions.
    pub fn new(access_token: impl Into<String>) -> Option<Self> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            None
        } else {
            Some(Self { access_token })
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Fails with `AuthRequired` before anything touches the network.
pub fn require_session(session: Option<&Session>) -> Result<&Session> {
    session.ok_or(EngagementError::AuthRequired)
}

#[async_trait]
pub trait ServiceGateway: Send + Sync {
    // Account linkage
    async fn connection_status(&self, session: &Session) -> Result<ConnectionStatus>;
    async fn auth_url(&self, session: &Session) -> Result<String>;
    async fn disconnect(&self, session: &Session) -> Result<()>;

    // Mail
    async fn send_email(&self, session: &Session, request: &SendEmailRequest) -> Result<()>;
    async fn fetch_replies(&self, session: &Session) -> Result<RepliesResponse>;

    // Calendar
    async fn list_events(&self, session: &Session, max_results: u32) -> Result<Vec<CalendarEvent>>;
    async fn create_event(&self, session: &Session, event: &NewEvent) -> Result<CalendarEvent>;

    // Meeting bots
    async fn add_bot(&self, request: &AddBotRequest) -> Result<CreatedBot>;
    async fn remove_bot(&self, meeting: &Meeting) -> Result<()>;
    /// `Ok(None)` when the provider answered without a meeting list at all.
    async fn list_meetings(&self, status: Option<MeetingStatus>) -> Result<Option<Vec<Meeting>>>;
    async fn search_knowledge_base(
        &self,
        session: &Session,
        query: &KnowledgeBaseQuery,
    ) -> Result<KnowledgeBaseAnswer>;

    // Prospecting
    async fn discover_prospects(&self, preferences: &DiscoveryPreferences) -> Result<Vec<Prospect>>;
    async fn draft_email(&self, prospect: &Prospect) -> Result<EmailDraft>;
}
