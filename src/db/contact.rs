use crate::prelude::*;

/// A contact form submission. Immutable once created except for the
/// moderation flags.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub priority: String,
    pub is_read: bool,
    pub is_responded: bool,
    pub response_date: Option<NaiveDateTime>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub created_at: NaiveDateTime,
}

pub struct CreateContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

impl ContactMessage {
    /// Create a new contact message.
    pub async fn create(db: &Db, form: &CreateContactMessage) -> AppResult<i64> {
        let row = sqlx::query(
            "INSERT INTO contact_messages \
                (name, email, phone, subject, message, budget, timeline, \
                 ip_address, user_agent, referrer) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&form.name)
        .bind(&form.email)
        .bind(&form.phone)
        .bind(&form.subject)
        .bind(&form.message)
        .bind(&form.budget)
        .bind(&form.timeline)
        .bind(&form.ip_address)
        .bind(&form.user_agent)
        .bind(&form.referrer)
        .execute(db)
        .await?;
        Ok(row.last_insert_rowid())
    }

    pub async fn lookup_by_id(db: &Db, id: i64) -> AppResult<Option<ContactMessage>> {
        let message =
            sqlx::query_as::<_, ContactMessage>("SELECT * FROM contact_messages WHERE id = ?")
                .bind(id)
                .fetch_optional(db)
                .await?;
        Ok(message)
    }

    /// All messages, newest first.
    pub async fn list(db: &Db) -> AppResult<Vec<ContactMessage>> {
        let messages = sqlx::query_as::<_, ContactMessage>(
            "SELECT * FROM contact_messages ORDER BY created_at DESC",
        )
        .fetch_all(db)
        .await?;
        Ok(messages)
    }

    pub async fn count_recent_from_ip(db: &Db, ip: &str, cutoff: NaiveDateTime) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM contact_messages WHERE ip_address = ? AND created_at >= ?",
        )
        .bind(ip)
        .bind(cutoff)
        .fetch_one(db)
        .await?;
        Ok(count)
    }

    pub async fn mark_read(db: &Db, id: i64) -> AppResult<()> {
        sqlx::query("UPDATE contact_messages SET is_read = 1 WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Mark responded, stamping the response date on the first transition
    /// only.
    pub async fn mark_responded(db: &Db, id: i64) -> AppResult<()> {
        let now = Utc::now().naive_utc();
        sqlx::query(
            "UPDATE contact_messages \
             SET is_responded = 1, response_date = COALESCE(response_date, ?) \
             WHERE id = ?",
        )
        .bind(now)
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }
}
