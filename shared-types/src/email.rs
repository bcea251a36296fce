use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::null_to_default;

/// Lifecycle of an outbound email. Transitions only move forward:
/// `Draft -> Sent -> Replied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    Draft,
    Sent,
    Replied,
}

impl EmailStatus {
    /// Anything past `Draft` has left the outbox.
    pub fn has_been_sent(&self) -> bool {
        matches!(self, EmailStatus::Sent | EmailStatus::Replied)
    }

    pub fn can_advance_to(&self, next: EmailStatus) -> bool {
        matches!(
            (self, next),
            (EmailStatus::Draft, EmailStatus::Sent) | (EmailStatus::Sent, EmailStatus::Replied)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStatus::Draft => "draft",
            EmailStatus::Sent => "sent",
            EmailStatus::Replied => "replied",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(EmailStatus::Draft),
            "sent" => Some(EmailStatus::Sent),
            "replied" => Some(EmailStatus::Replied),
            _ => None,
        }
    }
}

/// An outbound email record tracked for analytics.
///
/// `replied_at` is only ever set when `status` is `Replied`, and never
/// precedes `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EmailMessage {
    pub id: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub status: EmailStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub replied_at: Option<DateTime<Utc>>,
}

impl EmailMessage {
    /// Time between sending and the reply, when both ends are known.
    pub fn response_time(&self) -> Option<chrono::Duration> {
        if self.status != EmailStatus::Replied {
            return None;
        }
        match (self.created_at, self.replied_at) {
            (Some(created), Some(replied)) => Some(replied - created),
            _ => None,
        }
    }
}

/// AI-generated subject/body pair awaiting human review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EmailDraft {
    pub subject: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct DraftEmailResponse {
    pub email: EmailDraft,
}

/// A generated draft together with the outbound record tracking it
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct DraftCreatedResponse {
    pub email: EmailDraft,
    pub record: EmailMessage,
}

/// Body of a send request, both towards the mail collaborator and from the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SendEmailRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Coarse reading of the free-text sentiment produced by reply analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(from = "String")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub fn classify(text: &str) -> Self {
        if text.contains("Positive") {
            Sentiment::Positive
        } else if text.contains("Negative") {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

impl From<String> for Sentiment {
    fn from(value: String) -> Self {
        Sentiment::classify(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReplyEnvelope {
    #[serde(default, deserialize_with = "null_to_default")]
    pub from: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReplyAnalysis {
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default, deserialize_with = "null_to_default")]
    pub intent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SuggestedFollowup {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub status: String,
}

/// An inbound reply annotated by the AI collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EmailAnalysis {
    pub email: ReplyEnvelope,
    pub analysis: ReplyAnalysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_followup: Option<SuggestedFollowup>,
}

impl EmailAnalysis {
    /// Replies have no identity of their own; sender + subject is close enough
    /// to pick one out of the pending-review set.
    pub fn matches(&self, from: &str, subject: &str) -> bool {
        self.email.from.eq_ignore_ascii_case(from) && self.email.subject == subject
    }
}

#[derive(Debug, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RepliesResponse {
    #[serde(default, deserialize_with = "null_to_default")]
    pub analyzed_emails: Vec<EmailAnalysis>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub message: String,
}

/// Request to send the suggested follow-up of one analyzed reply
#[derive(Debug, Deserialize, TS)]
#[ts(export)]
pub struct SendFollowupRequest {
    pub from: String,
    pub subject: String,
    pub edited_body: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct EmailsResponse {
    pub emails: Vec<EmailMessage>,
}

/// Manual reply marking; `replied_at` defaults to now.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export)]
pub struct MarkRepliedRequest {
    #[serde(default)]
    pub replied_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions_only_move_forward() {
        assert!(EmailStatus::Draft.can_advance_to(EmailStatus::Sent));
        assert!(EmailStatus::Sent.can_advance_to(EmailStatus::Replied));
        assert!(!EmailStatus::Draft.can_advance_to(EmailStatus::Replied));
        assert!(!EmailStatus::Replied.can_advance_to(EmailStatus::Draft));
        assert!(!EmailStatus::Sent.can_advance_to(EmailStatus::Draft));
    }

    #[test]
    fn test_sentiment_from_free_text() {
        let analysis: ReplyAnalysis =
            serde_json::from_str(r#"{"sentiment": "Very Positive", "intent": "Follow-Up Required"}"#)
                .unwrap();
        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(Sentiment::classify("Negative"), Sentiment::Negative);
        assert_eq!(Sentiment::classify("Mixed / cautious"), Sentiment::Neutral);
        assert_eq!(
            serde_json::to_string(&Sentiment::Negative).unwrap(),
            r#""Negative""#
        );
    }

    #[test]
    fn test_response_time_requires_both_timestamps() {
        let created = DateTime::parse_from_rfc3339("2026-01-25T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut email = EmailMessage {
            id: "e1".to_string(),
            recipient: "jane@acme.com".to_string(),
            subject: "Hello".to_string(),
            body: "Hi".to_string(),
            status: EmailStatus::Replied,
            created_at: Some(created),
            replied_at: Some(created + chrono::Duration::hours(3)),
        };
        assert_eq!(email.response_time(), Some(chrono::Duration::hours(3)));

        email.replied_at = None;
        assert_eq!(email.response_time(), None);
    }

    #[test]
    fn test_analysis_without_followup() {
        let json = r#"{"email": {"from": "a@b.com", "subject": "Re: Demo", "body": "Thanks"},
            "analysis": {"sentiment": "Neutral", "intent": "Information"}}"#;
        let analysis: EmailAnalysis = serde_json::from_str(json).unwrap();
        assert!(analysis.suggested_followup.is_none());
        assert!(analysis.matches("A@B.com", "Re: Demo"));
    }
}
