//! Scripted in-memory gateway for exercising the managers without a network.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{
    AddBotRequest, CalendarEvent, ConnectionStatus, CreatedBot, DiscoveryPreferences, EmailAnalysis,
    EmailDraft, EmailMessage, EmailStatus, EventAttendee, KnowledgeBaseAnswer, KnowledgeBaseQuery,
    Meeting, MeetingStatus, NewEvent, Prospect, RepliesResponse, ReplyAnalysis, ReplyEnvelope,
    SendEmailRequest, Sentiment, SuggestedFollowup,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{EngagementError, Result};
use crate::gateway::{ServiceGateway, Session};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ConnectionStatus,
    AuthUrl,
    Disconnect,
    SendEmail { to: String, subject: String, body: String },
    FetchReplies,
    ListEvents(u32),
    CreateEvent(NewEvent),
    AddBot { title: String, meeting_url: String },
    RemoveBot(String),
    ListMeetings(Option<MeetingStatus>),
    SearchKnowledgeBase { query: String, max_results: Option<u32> },
    DiscoverProspects {
        company_description: String,
        goal: String,
        job_titles: Vec<String>,
    },
    DraftEmail(String),
}

struct State {
    calls: Vec<Call>,
    connected: bool,
    failures: HashMap<&'static str, EngagementError>,
    replies: VecDeque<(Duration, Vec<EmailAnalysis>)>,
    meetings: VecDeque<(Duration, Option<Vec<Meeting>>)>,
    prospects: VecDeque<(Duration, Vec<Prospect>)>,
    events: Vec<CalendarEvent>,
    knowledge_base: KnowledgeBaseAnswer,
    bots_created: u32,
}

pub struct FakeGateway {
    state: Mutex<State>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                calls: Vec::new(),
                connected: true,
                failures: HashMap::new(),
                replies: VecDeque::new(),
                meetings: VecDeque::new(),
                prospects: VecDeque::new(),
                events: Vec::new(),
                knowledge_base: KnowledgeBaseAnswer {
                    status: "success".to_string(),
                    response: String::new(),
                    sources: Vec::new(),
                },
                bots_created: 0,
            }),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn set_connected(&self, connected: bool) {
        self.state.lock().unwrap().connected = connected;
    }

    /// The next call to `operation` fails with `error`.
    pub fn fail_next(&self, operation: &'static str, error: EngagementError) {
        self.state.lock().unwrap().failures.insert(operation, error);
    }

    pub fn push_replies(&self, delay: Duration, replies: Vec<EmailAnalysis>) {
        self.state.lock().unwrap().replies.push_back((delay, replies));
    }

    pub fn push_meetings(&self, delay: Duration, meetings: Option<Vec<Meeting>>) {
        self.state.lock().unwrap().meetings.push_back((delay, meetings));
    }

    pub fn push_prospects(&self, delay: Duration, prospects: Vec<Prospect>) {
        self.state.lock().unwrap().prospects.push_back((delay, prospects));
    }

    pub fn set_events(&self, events: Vec<CalendarEvent>) {
        self.state.lock().unwrap().events = events;
    }

    pub fn set_knowledge_base(&self, answer: KnowledgeBaseAnswer) {
        self.state.lock().unwrap().knowledge_base = answer;
    }

    fn record(&self, call: Call, operation: &'static str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.failures.remove(operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ServiceGateway for FakeGateway {
    async fn connection_status(&self, _session: &Session) -> Result<ConnectionStatus> {
        self.record(Call::ConnectionStatus, "connection_status")?;
        let connected = self.state.lock().unwrap().connected;
        Ok(ConnectionStatus {
            connected,
            email: connected.then(|| "rep@example.com".to_string()),
            scopes: None,
            last_refreshed: None,
        })
    }

    async fn auth_url(&self, _session: &Session) -> Result<String> {
        self.record(Call::AuthUrl, "auth_url")?;
        Ok("https://accounts.google.com/o/oauth2/auth?client_id=test".to_string())
    }

    async fn disconnect(&self, _session: &Session) -> Result<()> {
        self.record(Call::Disconnect, "disconnect")?;
        self.state.lock().unwrap().connected = false;
        Ok(())
    }

    async fn send_email(&self, _session: &Session, request: &SendEmailRequest) -> Result<()> {
        self.record(
            Call::SendEmail {
                to: request.to.clone(),
                subject: request.subject.clone(),
                body: request.body.clone(),
            },
            "send_email",
        )
    }

    async fn fetch_replies(&self, _session: &Session) -> Result<RepliesResponse> {
        self.record(Call::FetchReplies, "fetch_replies")?;
        let (delay, analyzed_emails) = self
            .state
            .lock()
            .unwrap()
            .replies
            .pop_front()
            .unwrap_or_default();
        tokio::time::sleep(delay).await;
        let message = format!("Analyzed {} replies", analyzed_emails.len());
        Ok(RepliesResponse {
            analyzed_emails,
            message,
        })
    }

    async fn list_events(&self, _session: &Session, max_results: u32) -> Result<Vec<CalendarEvent>> {
        self.record(Call::ListEvents(max_results), "list_events")?;
        Ok(self.state.lock().unwrap().events.clone())
    }

    async fn create_event(&self, _session: &Session, event: &NewEvent) -> Result<CalendarEvent> {
        self.record(Call::CreateEvent(event.clone()), "create_event")?;
        Ok(CalendarEvent {
            id: "evt-1".to_string(),
            summary: event.summary.clone(),
            description: event.description.clone(),
            start: event.start_time.clone(),
            end: event.end_time.clone(),
            location: event.location.clone(),
            html_link: "https://calendar.google.com/event?eid=evt-1".to_string(),
            attendees: event
                .attendees
                .iter()
                .map(|email| EventAttendee {
                    email: email.clone(),
                    status: "needsAction".to_string(),
                })
                .collect(),
            meet_link: None,
        })
    }

    async fn add_bot(&self, request: &AddBotRequest) -> Result<CreatedBot> {
        self.record(
            Call::AddBot {
                title: request.title.clone(),
                meeting_url: request.meeting_url.clone(),
            },
            "add_bot",
        )?;
        let mut state = self.state.lock().unwrap();
        state.bots_created += 1;
        Ok(CreatedBot {
            id: format!("meeting-{}", state.bots_created),
            bot_id: format!("bot-{}", state.bots_created),
        })
    }

    async fn remove_bot(&self, meeting: &Meeting) -> Result<()> {
        self.record(Call::RemoveBot(meeting.id.clone()), "remove_bot")
    }

    async fn list_meetings(&self, status: Option<MeetingStatus>) -> Result<Option<Vec<Meeting>>> {
        self.record(Call::ListMeetings(status), "list_meetings")?;
        let scripted = self.state.lock().unwrap().meetings.pop_front();
        let (delay, meetings) = scripted.unwrap_or((Duration::ZERO, Some(Vec::new())));
        tokio::time::sleep(delay).await;
        Ok(meetings)
    }

    async fn search_knowledge_base(
        &self,
        _session: &Session,
        query: &KnowledgeBaseQuery,
    ) -> Result<KnowledgeBaseAnswer> {
        self.record(
            Call::SearchKnowledgeBase {
                query: query.query.clone(),
                max_results: query.max_results,
            },
            "search_knowledge_base",
        )?;
        Ok(self.state.lock().unwrap().knowledge_base.clone())
    }

    async fn discover_prospects(&self, preferences: &DiscoveryPreferences) -> Result<Vec<Prospect>> {
        self.record(
            Call::DiscoverProspects {
                company_description: preferences.company_description.clone(),
                goal: preferences.goal.clone(),
                job_titles: preferences.job_titles.clone(),
            },
            "discover_prospects",
        )?;
        let (delay, prospects) = self
            .state
            .lock()
            .unwrap()
            .prospects
            .pop_front()
            .unwrap_or_default();
        tokio::time::sleep(delay).await;
        Ok(prospects)
    }

    async fn draft_email(&self, prospect: &Prospect) -> Result<EmailDraft> {
        self.record(Call::DraftEmail(prospect.author.clone()), "draft_email")?;
        Ok(EmailDraft {
            subject: format!("Quick question for {}", prospect.company),
            content: format!("Hi {},\n\nI noticed {}.", prospect.author, prospect.insights),
        })
    }
}

pub fn session() -> Session {
    Session::new("test-token").unwrap()
}

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn prospect(author: &str, company: &str, score: f64) -> Prospect {
    Prospect {
        author: author.to_string(),
        role: "VP of Sales".to_string(),
        company: company.to_string(),
        industry: "Technology".to_string(),
        pain_points: vec!["Data management".to_string()],
        solution_fit: "High".to_string(),
        insights: "Interested in AI-driven solutions".to_string(),
        alignment_score: score,
        is_prospect: true,
    }
}

pub fn email(id: &str, recipient: &str, status: EmailStatus) -> EmailMessage {
    EmailMessage {
        id: id.to_string(),
        recipient: recipient.to_string(),
        subject: "Hello".to_string(),
        body: "Hi there".to_string(),
        status,
        created_at: Some(at("2026-01-25T10:00:00Z")),
        replied_at: None,
    }
}

pub fn analysis(from: &str, subject: &str, with_followup: bool) -> EmailAnalysis {
    EmailAnalysis {
        email: ReplyEnvelope {
            from: from.to_string(),
            subject: subject.to_string(),
            body: "Thanks, let's talk next week.".to_string(),
        },
        analysis: ReplyAnalysis {
            sentiment: Sentiment::Positive,
            intent: "Meeting Request".to_string(),
        },
        suggested_followup: with_followup.then(|| SuggestedFollowup {
            recipient: from.to_string(),
            subject: format!("Re: {}", subject),
            body: "Great, how about Tuesday?".to_string(),
            status: "pending".to_string(),
        }),
    }
}

pub fn meeting(id: &str, status: MeetingStatus) -> Meeting {
    let mut meeting = Meeting::active(
        id.to_string(),
        format!("bot-{}", id),
        format!("https://meet.google.com/{}", id),
        Some(format!("Meeting {}", id)),
    );
    meeting.status = status;
    meeting
}
