use serde::{Deserialize, Deserializer, Serialize};

pub mod account;
pub mod calendar;
pub mod email;
pub mod meeting;
pub mod prospect;
pub mod stats;

pub use account::{AuthUrlResponse, ConnectionStatus};
pub use calendar::{
    CalendarEvent, CalendarEventsResponse, CalendarView, EventAttendee, ListEventsRequest,
    NewEvent, NewEventForm,
};
pub use email::{
    DraftCreatedResponse, DraftEmailResponse, EmailAnalysis, EmailDraft, EmailMessage,
    EmailStatus, EmailsResponse, MarkRepliedRequest, RepliesResponse, ReplyAnalysis,
    ReplyEnvelope, SendEmailRequest, SendFollowupRequest, Sentiment, SuggestedFollowup,
};
pub use meeting::{
    AddBotRequest, AddBotResponse, CreatedBot, ItemList, KnowledgeBaseAnswer, KnowledgeBaseQuery,
    KnowledgeBaseSearchResponse, KnowledgeBaseSource, Meeting, MeetingDetail, MeetingStatus,
    MeetingsResponse, ProviderMeetingsResponse, RemoveBotResponse, ResolvedSource,
};
pub use prospect::{
    AlignmentTier, DiscoverProspectsResponse, DiscoveryPreferences, DiscoveryResponse,
    ListProspectsRequest, Prospect, ProspectSort, ProspectsResponse, TierCounts,
};
pub use stats::{AggregateStats, DashboardSnapshot, RecentActivity};

/// Error response for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Collaborators send `null` where they mean "nothing"; treat it like a
/// missing field.
pub(crate) fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
