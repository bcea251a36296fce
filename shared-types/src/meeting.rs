use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::null_to_default;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    Active,
    /// The provider omits the status for finished recordings
    #[default]
    Completed,
}

/// Action items and insights arrive either already structured or as a
/// JSON-encoded string, depending on how the provider stored them. Any
/// other shape is kept as-is so one bad field cannot fail the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum ItemList {
    Items(Vec<String>),
    Encoded(String),
    Other(serde_json::Value),
}

impl ItemList {
    pub fn decode(&self) -> Result<Vec<String>, serde_json::Error> {
        match self {
            ItemList::Items(items) => Ok(items.clone()),
            ItemList::Encoded(raw) => serde_json::from_str(raw),
            ItemList::Other(value) => serde_json::from_value(value.clone()),
        }
    }
}

/// A meeting-recording session ("bot") and, once completed, its analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Meeting {
    #[serde(default, deserialize_with = "null_to_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub bot_id: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub meeting_url: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub status: MeetingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_items: Option<ItemList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<ItemList>,
}

impl Meeting {
    /// A freshly requested recording session.
    pub fn active(id: String, bot_id: String, meeting_url: String, title: Option<String>) -> Self {
        Self {
            id,
            bot_id,
            meeting_url,
            status: MeetingStatus::Active,
            title,
            date: None,
            duration: None,
            participants: None,
            transcript: None,
            ai_summary: None,
            action_items: None,
            insights: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == MeetingStatus::Active
    }

    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Untitled Meeting")
    }
}

/// Everything the meeting notes panel shows for one completed meeting
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct MeetingDetail {
    pub title: String,
    pub transcript: String,
    pub summary: String,
    pub action_items: Vec<String>,
    pub key_insights: Vec<String>,
    pub sentiment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddBotRequest {
    pub title: String,
    pub meeting_url: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatedBot {
    pub id: String,
    #[serde(rename = "botId")]
    pub bot_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AddBotResponse {
    pub meeting: CreatedBot,
}

/// The bot provider answers 200 even when the delete failed upstream, so the
/// body has to be checked as well.
#[derive(Debug, Default, Deserialize)]
pub struct RemoveBotResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RemoveBotResponse {
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProviderMeetingsResponse {
    #[serde(default)]
    pub meetings: Option<Vec<Meeting>>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct MeetingsResponse {
    pub active: Vec<Meeting>,
    pub completed: Vec<Meeting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KnowledgeBaseQuery {
    pub query: String,
    #[serde(default)]
    pub max_results: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KnowledgeBaseSource {
    pub meeting_id: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub score: f64,
}

impl KnowledgeBaseSource {
    pub fn relevance_percent(&self) -> u32 {
        (self.score.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KnowledgeBaseAnswer {
    #[serde(default, deserialize_with = "null_to_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub response: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub sources: Vec<KnowledgeBaseSource>,
}

/// A knowledge-base source joined with the local meeting it cites
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ResolvedSource {
    pub source: KnowledgeBaseSource,
    pub relevance_percent: u32,
    /// `None` once the meeting is no longer known locally
    pub meeting: Option<Meeting>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct KnowledgeBaseSearchResponse {
    pub response: String,
    pub sources: Vec<ResolvedSource>,
}
