use chrono::{DateTime, Utc};
use shared_types::{
    EmailAnalysis, EmailDraft, EmailMessage, EmailStatus, Prospect, SendEmailRequest,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::account::AccountLink;
use crate::cache::EngagementCache;
use crate::error::{EngagementError, Result};
use crate::fence::RequestFence;
use crate::gateway::{require_session, ServiceGateway, Session};

/// Result of a reply fetch.
#[derive(Debug, Clone)]
pub struct ReplySync {
    /// Pending-review set after the fetch
    pub analyzed_emails: Vec<EmailAnalysis>,
    pub message: String,
    /// Outbound records that moved to `Replied`
    pub updated: Vec<EmailMessage>,
    /// False when a newer fetch superseded this one
    pub applied: bool,
}

#[derive(Default)]
struct EmailState {
    emails: Vec<EmailMessage>,
    analyzed: Vec<EmailAnalysis>,
    /// Replies already attributed to an outbound email; the provider
    /// re-delivers the whole inbox on every fetch.
    reconciled: HashSet<String>,
}

/// Owns outbound email records (newest first) and the set of analyzed
/// replies awaiting review.
///
/// State is only touched after the collaborator call it depends on has
/// succeeded, so a failed send or fetch leaves everything as it was.
pub struct EmailLifecycleManager {
    gateway: Arc<dyn ServiceGateway>,
    account: AccountLink,
    state: RwLock<EmailState>,
    replies_fence: RequestFence,
}

impl EmailLifecycleManager {
    pub fn new(gateway: Arc<dyn ServiceGateway>, account: AccountLink) -> Self {
        Self {
            gateway,
            account,
            state: RwLock::new(EmailState::default()),
            replies_fence: RequestFence::new(),
        }
    }

    /// Seed outbound history from persisted records, newest first.
    pub async fn load_history(&self, records: Vec<EmailMessage>) {
        let count = records.len();
        self.state.write().await.emails = records;
        tracing::info!("Loaded {} email records", count);
    }

    pub async fn load_cached_replies(&self, cache: &EngagementCache) -> usize {
        let cached = cache.cached_analyzed_emails().await;
        if cached.is_empty() {
            return 0;
        }
        let count = cached.len();
        self.state.write().await.analyzed = cached;
        tracing::info!("Loaded {} cached analyzed replies", count);
        count
    }

    pub async fn emails(&self) -> Vec<EmailMessage> {
        self.state.read().await.emails.clone()
    }

    pub async fn analyzed_emails(&self) -> Vec<EmailAnalysis> {
        self.state.read().await.analyzed.clone()
    }

    /// Every call regenerates; drafts are never cached.
    pub async fn request_draft(&self, prospect: &Prospect) -> Result<EmailDraft> {
        let draft = self.gateway.draft_email(prospect).await?;
        tracing::info!("Drafted email for {} at {}", prospect.author, prospect.company);
        Ok(draft)
    }

    pub async fn record_draft(&self, prospect: &Prospect, draft: &EmailDraft) -> EmailMessage {
        let record = EmailMessage {
            id: uuid::Uuid::new_v4().to_string(),
            recipient: prospect.author.clone(),
            subject: draft.subject.clone(),
            body: draft.content.clone(),
            status: EmailStatus::Draft,
            created_at: Some(Utc::now()),
            replied_at: None,
        };
        self.state.write().await.emails.insert(0, record.clone());
        record
    }

    /// Sends through the linked account. A matching draft (same recipient
    /// and subject) moves to `Sent`; otherwise a new `Sent` record is added.
    pub async fn send_email(
        &self,
        session: Option<&Session>,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<EmailMessage> {
        let session = require_session(session)?;
        let request = SendEmailRequest {
            to: recipient.trim().to_string(),
            subject: subject.trim().to_string(),
            body: body.to_string(),
        };
        if request.to.is_empty() {
            return Err(EngagementError::validation("Recipient is required"));
        }
        if request.subject.is_empty() {
            return Err(EngagementError::validation("Subject is required"));
        }

        self.account.require_connected(session).await?;
        self.gateway.send_email(session, &request).await?;

        let now = Utc::now();
        let mut state = self.state.write().await;
        let draft = state.emails.iter_mut().find(|e| {
            e.status == EmailStatus::Draft
                && e.recipient.eq_ignore_ascii_case(&request.to)
                && e.subject == request.subject
        });

        let record = match draft {
            Some(draft) => {
                draft.status = EmailStatus::Sent;
                draft.body = request.body;
                draft.created_at = Some(now);
                draft.clone()
            }
            None => {
                let record = EmailMessage {
                    id: uuid::Uuid::new_v4().to_string(),
                    recipient: request.to,
                    subject: request.subject,
                    body: request.body,
                    status: EmailStatus::Sent,
                    created_at: Some(now),
                    replied_at: None,
                };
                state.emails.insert(0, record.clone());
                record
            }
        };

        tracing::info!("Email sent to {}", record.recipient);
        Ok(record)
    }

    /// Replaces the pending-review set with the provider's answer and marks
    /// outbound emails whose recipient replied.
    pub async fn fetch_replies(&self, session: Option<&Session>) -> Result<ReplySync> {
        let session = require_session(session)?;
        self.account.require_connected(session).await?;

        let ticket = self.replies_fence.issue();
        let response = self.gateway.fetch_replies(session).await?;

        let mut state = self.state.write().await;
        if !self.replies_fence.is_current(ticket) {
            tracing::debug!(
                "Discarding superseded reply fetch ({} replies)",
                response.analyzed_emails.len()
            );
            return Ok(ReplySync {
                analyzed_emails: state.analyzed.clone(),
                message: response.message,
                updated: Vec::new(),
                applied: false,
            });
        }

        let now = Utc::now();
        let mut updated = Vec::new();
        for analysis in &response.analyzed_emails {
            if !state.reconciled.insert(reply_key(analysis)) {
                continue;
            }
            if let Some(email) = reply_target(&mut state.emails, analysis) {
                email.status = EmailStatus::Replied;
                email.replied_at = Some(email.created_at.map_or(now, |created| created.max(now)));
                updated.push(email.clone());
            }
        }

        state.analyzed = response.analyzed_emails;
        tracing::info!(
            "Fetched {} analyzed replies, {} emails marked replied",
            state.analyzed.len(),
            updated.len()
        );

        Ok(ReplySync {
            analyzed_emails: state.analyzed.clone(),
            message: response.message,
            updated,
            applied: true,
        })
    }

    pub async fn find_analysis(&self, from: &str, subject: &str) -> Option<EmailAnalysis> {
        self.state
            .read()
            .await
            .analyzed
            .iter()
            .find(|a| a.matches(from, subject))
            .cloned()
    }

    /// Sends the suggested follow-up of one analyzed reply, with the user's
    /// edits if any, then dismisses that reply from the pending set.
    pub async fn send_followup(
        &self,
        session: Option<&Session>,
        from: &str,
        subject: &str,
        edited_body: Option<&str>,
    ) -> Result<EmailMessage> {
        let analysis = self
            .find_analysis(from, subject)
            .await
            .ok_or_else(|| EngagementError::validation("Reply not found"))?;
        let followup = analysis
            .suggested_followup
            .ok_or_else(|| EngagementError::validation("This reply has no suggested follow-up"))?;

        let body = edited_body
            .filter(|b| !b.trim().is_empty())
            .unwrap_or(followup.body.as_str());

        let record = self
            .send_email(session, &followup.recipient, &followup.subject, body)
            .await?;

        self.state
            .write()
            .await
            .analyzed
            .retain(|a| !a.matches(from, subject));
        Ok(record)
    }

    /// Forward-only; `at` may not precede the send time.
    pub async fn mark_replied(&self, id: &str, at: DateTime<Utc>) -> Result<EmailMessage> {
        let mut state = self.state.write().await;
        let email = state
            .emails
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| EngagementError::validation(format!("Unknown email {}", id)))?;

        if !email.status.can_advance_to(EmailStatus::Replied) {
            return Err(EngagementError::validation(format!(
                "Email in status '{}' cannot be marked replied",
                email.status.as_str()
            )));
        }
        if email.created_at.map_or(false, |created| at < created) {
            return Err(EngagementError::validation(
                "Reply time cannot precede send time",
            ));
        }

        email.status = EmailStatus::Replied;
        email.replied_at = Some(at);
        Ok(email.clone())
    }
}

/// `"Jane Doe <jane@acme.com>"` -> `"jane@acme.com"`
fn sender_address(from: &str) -> &str {
    match (from.rfind('<'), from.rfind('>')) {
        (Some(start), Some(end)) if start < end => from[start + 1..end].trim(),
        _ => from.trim(),
    }
}

fn reply_key(reply: &EmailAnalysis) -> String {
    format!(
        "{}\n{}\n{}",
        sender_address(&reply.email.from).to_ascii_lowercase(),
        reply.email.subject.trim(),
        reply.email.body.trim()
    )
}

/// The outbound email a reply answers: the newest one to the sender whose
/// subject the reply quotes, else the newest one to the sender. `None` when
/// that email is not awaiting a reply.
fn reply_target<'a>(
    emails: &'a mut [EmailMessage],
    reply: &EmailAnalysis,
) -> Option<&'a mut EmailMessage> {
    let sender = sender_address(&reply.email.from);
    let quoted = strip_reply_prefixes(&reply.email.subject);
    let to_sender =
        |e: &EmailMessage| e.status.has_been_sent() && e.recipient.eq_ignore_ascii_case(sender);

    let index = newest_index(emails, |e| {
        to_sender(e) && e.subject.trim().eq_ignore_ascii_case(quoted)
    })
    .or_else(|| newest_index(emails, to_sender))?;

    let email = &mut emails[index];
    (email.status == EmailStatus::Sent).then_some(email)
}

fn newest_index(emails: &[EmailMessage], matches: impl Fn(&EmailMessage) -> bool) -> Option<usize> {
    emails
        .iter()
        .enumerate()
        .filter(|(_, e)| matches(*e))
        .max_by_key(|(i, e)| (e.created_at, std::cmp::Reverse(*i)))
        .map(|(i, _)| i)
}

/// `"Re: RE: Hello"` -> `"Hello"`
fn strip_reply_prefixes(subject: &str) -> &str {
    let mut subject = subject.trim();
    while subject
        .get(..3)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case("re:"))
    {
        subject = subject[3..].trim_start();
    }
    subject
}
