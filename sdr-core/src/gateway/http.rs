use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared_types::{
    AddBotRequest, AddBotResponse, AuthUrlResponse, CalendarEvent, CalendarEventsResponse,
    ConnectionStatus, CreatedBot, DiscoverProspectsResponse, DiscoveryPreferences,
    DraftEmailResponse, EmailDraft, KnowledgeBaseAnswer, KnowledgeBaseQuery, Meeting,
    MeetingStatus, NewEvent, Prospect, ProviderMeetingsResponse, RemoveBotResponse,
    RepliesResponse, SendEmailRequest,
};
use std::time::Duration;

use super::{ServiceGateway, Session};
use crate::error::{EngagementError, Result};

/// reqwest-backed gateway to the AI backend, which also fronts the
/// mail/calendar provider and the meeting-bot provider.
pub struct HttpServiceGateway {
    client: Client,
    base_url: String,
    /// Sent on calls that carry no user session (discovery, drafts, bots)
    service_token: Option<String>,
}

impl HttpServiceGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_token: None,
        })
    }

    pub fn with_service_token(mut self, token: Option<String>) -> Self {
        self.service_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_service_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.service_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(EngagementError::from_response(status.as_u16(), &body))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let response = Self::check(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            EngagementError::external(format!("Unexpected response from service: {}", e))
        })
    }
}

#[async_trait]
impl ServiceGateway for HttpServiceGateway {
    async fn connection_status(&self, session: &Session) -> Result<ConnectionStatus> {
        let response = self
            .client
            .get(self.url("/auth/google/status"))
            .bearer_auth(session.access_token())
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn auth_url(&self, session: &Session) -> Result<String> {
        let response = self
            .client
            .get(self.url("/auth/google"))
            .bearer_auth(session.access_token())
            .send()
            .await?;
        let body: AuthUrlResponse = Self::read_json(response).await?;
        Ok(body.auth_url)
    }

    async fn disconnect(&self, session: &Session) -> Result<()> {
        let response = self
            .client
            .post(self.url("/auth/google/disconnect"))
            .bearer_auth(session.access_token())
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn send_email(&self, session: &Session, request: &SendEmailRequest) -> Result<()> {
        let response = self
            .client
            .post(self.url("/emails/send"))
            .bearer_auth(session.access_token())
            .json(request)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn fetch_replies(&self, session: &Session) -> Result<RepliesResponse> {
        let response = self
            .client
            .get(self.url("/emails/replies"))
            .bearer_auth(session.access_token())
            .send()
            .await?;
        // The mail collaborator answers 400 when no account is linked
        if response.status() == StatusCode::BAD_REQUEST {
            return Err(EngagementError::NotConnected);
        }
        Self::read_json(response).await
    }

    async fn list_events(&self, session: &Session, max_results: u32) -> Result<Vec<CalendarEvent>> {
        let response = self
            .client
            .get(self.url("/calendar/events"))
            .query(&[("max_results", max_results)])
            .bearer_auth(session.access_token())
            .send()
            .await?;
        let body: CalendarEventsResponse = Self::read_json(response).await?;
        Ok(body.events)
    }

    async fn create_event(&self, session: &Session, event: &NewEvent) -> Result<CalendarEvent> {
        let response = self
            .client
            .post(self.url("/calendar/events"))
            .bearer_auth(session.access_token())
            .json(event)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn add_bot(&self, request: &AddBotRequest) -> Result<CreatedBot> {
        let response = self
            .client
            .post(self.url("/add-bot"))
            .json(request)
            .send()
            .await?;
        let body: AddBotResponse = Self::read_json(response).await?;
        Ok(body.meeting)
    }

    async fn remove_bot(&self, meeting: &Meeting) -> Result<()> {
        let request = self.client.post(self.url("/remove-bot")).json(&serde_json::json!({
            "id": meeting.id,
            "bot_id": meeting.bot_id,
        }));
        let response = self.with_service_auth(request).send().await?;
        let response = Self::check(response).await?;

        let text = response.text().await.unwrap_or_default();
        let body: RemoveBotResponse = serde_json::from_str(&text).unwrap_or_default();
        if body.is_error() {
            return Err(EngagementError::external(
                body.message
                    .unwrap_or_else(|| "Failed to remove meeting bot".to_string()),
            ));
        }
        Ok(())
    }

    async fn list_meetings(&self, status: Option<MeetingStatus>) -> Result<Option<Vec<Meeting>>> {
        let mut request = self.client.get(self.url("/meetings"));
        if let Some(status) = status {
            let value = match status {
                MeetingStatus::Active => "active",
                MeetingStatus::Completed => "completed",
            };
            request = request.query(&[("status", value)]);
        }
        let response = self.with_service_auth(request).send().await?;
        let body: ProviderMeetingsResponse = Self::read_json(response).await?;
        Ok(body.meetings)
    }

    async fn search_knowledge_base(
        &self,
        session: &Session,
        query: &KnowledgeBaseQuery,
    ) -> Result<KnowledgeBaseAnswer> {
        let response = self
            .client
            .post(self.url("/search-knowledge-base"))
            .bearer_auth(session.access_token())
            .json(query)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn discover_prospects(&self, preferences: &DiscoveryPreferences) -> Result<Vec<Prospect>> {
        let request = self
            .client
            .post(self.url("/prospects/discover"))
            .json(preferences);
        let response = self.with_service_auth(request).send().await?;
        let body: DiscoverProspectsResponse = Self::read_json(response).await?;
        Ok(body.prospects)
    }

    async fn draft_email(&self, prospect: &Prospect) -> Result<EmailDraft> {
        let request = self.client.post(self.url("/draft-emails")).json(prospect);
        let response = self.with_service_auth(request).send().await?;
        let body: DraftEmailResponse = Self::read_json(response).await?;
        Ok(body.email)
    }
}
