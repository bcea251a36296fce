use anyhow::Result;
use chrono::{DateTime, Utc};
use shared_types::{EmailMessage, EmailStatus};

use crate::database::AsyncDbConnection;

/// Insert or update an outbound email record
pub async fn upsert_email(conn: AsyncDbConnection, email: &EmailMessage) -> Result<()> {
    let conn = conn.lock().await?;
    let now = Utc::now().timestamp_millis();

    conn.execute(
        "INSERT INTO email_records
         (id, recipient, subject, body, status, created_at, replied_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            recipient = excluded.recipient,
            subject = excluded.subject,
            body = excluded.body,
            status = excluded.status,
            created_at = excluded.created_at,
            replied_at = excluded.replied_at,
            updated_at = excluded.updated_at",
        rusqlite::params![
            email.id,
            email.recipient,
            email.subject,
            email.body,
            email.status.as_str(),
            email.created_at.map(|t| t.timestamp_millis()),
            email.replied_at.map(|t| t.timestamp_millis()),
            now,
        ],
    )?;

    Ok(())
}

pub async fn upsert_emails(conn: AsyncDbConnection, emails: &[EmailMessage]) -> Result<()> {
    for email in emails {
        upsert_email(conn.clone(), email).await?;
    }
    Ok(())
}

/// All records, newest first
pub async fn list_emails(conn: AsyncDbConnection) -> Result<Vec<EmailMessage>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(
        "SELECT id, recipient, subject, body, status, created_at, replied_at
         FROM email_records
         ORDER BY created_at DESC, updated_at DESC",
    )?;

    let rows = stmt.query_map([], |row| {
        let status: String = row.get(4)?;
        let created_at: Option<i64> = row.get(5)?;
        let replied_at: Option<i64> = row.get(6)?;

        Ok(EmailMessage {
            id: row.get(0)?,
            recipient: row.get(1)?,
            subject: row.get(2)?,
            body: row.get(3)?,
            status: EmailStatus::parse(&status).unwrap_or(EmailStatus::Sent),
            created_at: created_at.and_then(DateTime::<Utc>::from_timestamp_millis),
            replied_at: replied_at.and_then(DateTime::<Utc>::from_timestamp_millis),
        })
    })?;

    let emails = rows.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(emails)
}
