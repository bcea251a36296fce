//! Dashboard statistics. Pure functions over borrowed views; nothing here
//! holds state or can fail.

use shared_types::{
    AggregateStats, EmailMessage, EmailStatus, Meeting, MeetingStatus, Prospect, RecentActivity,
};

/// Reported when no replied email carries both timestamps.
pub const DEFAULT_RESPONSE_HOURS: i64 = 24;

const RECENT_ITEMS: usize = 3;

pub fn compute(
    emails: &[EmailMessage],
    meetings: &[Meeting],
    prospects: &[Prospect],
) -> AggregateStats {
    let sent = emails.iter().filter(|e| e.status.has_been_sent()).count();
    let replied: Vec<&EmailMessage> = emails
        .iter()
        .filter(|e| e.status == EmailStatus::Replied)
        .collect();

    AggregateStats {
        total_prospects: prospects.len(),
        emails_sent: sent,
        response_rate: response_rate(replied.len(), sent),
        avg_response_time: average_response_hours(&replied),
        completed_meetings: meetings
            .iter()
            .filter(|m| m.status == MeetingStatus::Completed)
            .count(),
    }
}

/// Whole percent, rounded half-up; 0 when nothing was sent.
fn response_rate(replied: usize, sent: usize) -> u32 {
    if sent == 0 {
        return 0;
    }
    let replied = replied.min(sent) as u64;
    let sent = sent as u64;
    ((replied * 200 + sent) / (sent * 2)) as u32
}

fn average_response_hours(replied: &[&EmailMessage]) -> i64 {
    let hours: Vec<i64> = replied
        .iter()
        .filter_map(|e| e.response_time())
        .map(|delta| round_half_up(delta.num_milliseconds() as f64 / 3_600_000.0))
        .collect();

    if hours.is_empty() {
        return DEFAULT_RESPONSE_HOURS;
    }
    round_half_up(hours.iter().sum::<i64>() as f64 / hours.len() as f64)
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// First few meetings and emails in their current order.
pub fn recent_activity(emails: &[EmailMessage], meetings: &[Meeting]) -> RecentActivity {
    RecentActivity {
        meetings: meetings.iter().take(RECENT_ITEMS).cloned().collect(),
        emails: emails.iter().take(RECENT_ITEMS).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, email, meeting, prospect};
    use chrono::Duration;

    fn replied(id: &str, hours: i64) -> EmailMessage {
        let mut e = email(id, "jane@acme.com", EmailStatus::Replied);
        e.replied_at = e.created_at.map(|c| c + Duration::hours(hours));
        e
    }

    #[test]
    fn test_empty_inputs() {
        let stats = compute(&[], &[], &[]);
        assert_eq!(stats.response_rate, 0);
        assert_eq!(stats.emails_sent, 0);
        assert_eq!(stats.avg_response_time, DEFAULT_RESPONSE_HOURS);
        assert_eq!(stats.completed_meetings, 0);
    }

    #[test]
    fn test_ten_sent_three_replied() {
        let mut emails: Vec<EmailMessage> = (0..7)
            .map(|i| email(&format!("s{}", i), "x@y.com", EmailStatus::Sent))
            .collect();
        emails.push(replied("r1", 2));
        emails.push(replied("r2", 4));
        emails.push(replied("r3", 6));

        let stats = compute(&emails, &[], &[]);
        assert_eq!(stats.emails_sent, 10);
        assert_eq!(stats.response_rate, 30);
        assert_eq!(stats.avg_response_time, 4);
    }

    #[test]
    fn test_drafts_are_not_sent_and_missing_timestamps_are_skipped() {
        let mut no_reply_time = email("r2", "b@y.com", EmailStatus::Replied);
        no_reply_time.replied_at = None;
        let emails = vec![
            email("d1", "a@y.com", EmailStatus::Draft),
            no_reply_time,
            email("s1", "c@y.com", EmailStatus::Sent),
        ];

        let stats = compute(&emails, &[], &[]);
        assert_eq!(stats.emails_sent, 2);
        assert_eq!(stats.response_rate, 50);
        assert_eq!(stats.avg_response_time, DEFAULT_RESPONSE_HOURS);
    }

    #[test]
    fn test_rounding_is_half_up() {
        // 1 of 8 = 12.5%
        let mut emails: Vec<EmailMessage> = (0..7)
            .map(|i| email(&format!("s{}", i), "x@y.com", EmailStatus::Sent))
            .collect();
        let mut r = email("r1", "x@y.com", EmailStatus::Replied);
        r.replied_at = Some(at("2026-01-25T11:30:00Z"));
        emails.push(r);

        let stats = compute(&emails, &[], &[]);
        assert_eq!(stats.response_rate, 13);
        assert_eq!(stats.avg_response_time, 2);
        assert!(stats.response_rate <= 100);
    }

    #[test]
    fn test_counts_meetings_and_prospects() {
        let meetings = vec![
            meeting("a1", MeetingStatus::Active),
            meeting("c1", MeetingStatus::Completed),
            meeting("c2", MeetingStatus::Completed),
        ];
        let prospects = vec![prospect("Jane", "Acme", 0.9), prospect("Jane", "Acme", 0.9)];

        let stats = compute(&[], &meetings, &prospects);
        assert_eq!(stats.completed_meetings, 2);
        assert_eq!(stats.total_prospects, 2);
    }

    #[test]
    fn test_recent_activity_takes_first_three() {
        let meetings: Vec<Meeting> = (0..5)
            .map(|i| meeting(&format!("m{}", i), MeetingStatus::Completed))
            .collect();
        let emails = vec![email("e1", "a@y.com", EmailStatus::Sent)];

        let recent = recent_activity(&emails, &meetings);
        assert_eq!(recent.meetings.len(), 3);
        assert_eq!(recent.meetings[0].id, "m0");
        assert_eq!(recent.emails.len(), 1);
    }
}
