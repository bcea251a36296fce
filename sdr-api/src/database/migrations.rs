use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS email_records (
            id VARCHAR PRIMARY KEY,
            recipient VARCHAR NOT NULL,
            subject VARCHAR NOT NULL,
            body VARCHAR NOT NULL,
            status VARCHAR NOT NULL CHECK (status IN ('draft', 'sent', 'replied')),
            created_at BIGINT,
            replied_at BIGINT,
            updated_at BIGINT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_email_records_created
            ON email_records(created_at)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_email_records_recipient
            ON email_records(recipient, status)",
        [],
    )?;

    Ok(())
}
