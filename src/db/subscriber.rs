use rand::rngs::OsRng;
use rand::Rng;

use crate::prelude::*;

/// A newsletter subscriber. At most one row per email address; states
/// cycle pending -> verified+active -> inactive and back, and the verified
/// flag is never cleared by unsubscribing.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Subscriber {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub verification_token: Option<String>,
    pub subscribed_at: NaiveDateTime,
    pub unsubscribed_at: Option<NaiveDateTime>,
    pub ip_address: Option<String>,
    pub source: String,
}

#[derive(Debug)]
pub enum SubscribeOutcome {
    /// New or reactivated subscription, pending verification (or active
    /// immediately if the email was verified before).
    Subscribed(Subscriber),
    /// An active subscription already exists for this email.
    AlreadySubscribed,
}

impl Subscriber {
    /// Subscribe an email address. Reuses an inactive row rather than
    /// creating a duplicate, and always assigns a fresh single-use
    /// verification token.
    pub async fn subscribe(
        db: &Db,
        email: &str,
        name: Option<&str>,
        source: &str,
        ip: Option<&str>,
    ) -> AppResult<SubscribeOutcome> {
        let email = email.trim().to_lowercase();
        let token = fresh_token();

        if let Some(existing) = Self::lookup_by_email(db, &email).await? {
            if existing.is_active {
                return Ok(SubscribeOutcome::AlreadySubscribed);
            }
            // A previously verified email skips straight back to active;
            // anyone else returns to pending until the token is redeemed.
            let subscriber = sqlx::query_as::<_, Subscriber>(
                "UPDATE subscribers \
                 SET name = COALESCE(?, name), \
                     is_active = is_verified, \
                     verification_token = ?, \
                     unsubscribed_at = NULL \
                 WHERE id = ? \
                 RETURNING *",
            )
            .bind(name)
            .bind(&token)
            .bind(existing.id)
            .fetch_one(db)
            .await?;
            return Ok(SubscribeOutcome::Subscribed(subscriber));
        }

        let subscriber = sqlx::query_as::<_, Subscriber>(
            "INSERT INTO subscribers (email, name, verification_token, ip_address, source) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING *",
        )
        .bind(&email)
        .bind(name)
        .bind(&token)
        .bind(ip)
        .bind(source)
        .fetch_one(db)
        .await?;
        Ok(SubscribeOutcome::Subscribed(subscriber))
    }

    /// Redeem a verification token. The token is single-use: it is cleared
    /// here and a second redemption finds nothing.
    pub async fn verify(db: &Db, token: &str) -> AppResult<Option<Subscriber>> {
        if token.is_empty() {
            return Ok(None);
        }
        let subscriber = sqlx::query_as::<_, Subscriber>(
            "UPDATE subscribers \
             SET is_verified = 1, is_active = 1, verification_token = NULL \
             WHERE verification_token = ? \
             RETURNING *",
        )
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(subscriber)
    }

    /// Deactivate a subscription. Idempotent; the verified flag survives.
    pub async fn unsubscribe(db: &Db, email: &str) -> AppResult<Option<Subscriber>> {
        let email = email.trim().to_lowercase();
        let Some(existing) = Self::lookup_by_email(db, &email).await? else {
            return Ok(None);
        };
        if !existing.is_active {
            return Ok(Some(existing));
        }
        let now = Utc::now().naive_utc();
        let subscriber = sqlx::query_as::<_, Subscriber>(
            "UPDATE subscribers \
             SET is_active = 0, unsubscribed_at = ? \
             WHERE id = ? \
             RETURNING *",
        )
        .bind(now)
        .bind(existing.id)
        .fetch_one(db)
        .await?;
        Ok(Some(subscriber))
    }

    pub async fn lookup_by_email(db: &Db, email: &str) -> AppResult<Option<Subscriber>> {
        let subscriber = sqlx::query_as::<_, Subscriber>("SELECT * FROM subscribers WHERE email = ?")
            .bind(email)
            .fetch_optional(db)
            .await?;
        Ok(subscriber)
    }

    /// Emails that should receive new-post broadcasts.
    pub async fn active_verified_emails(db: &Db) -> AppResult<Vec<String>> {
        let emails = sqlx::query_scalar::<_, String>(
            "SELECT email FROM subscribers \
             WHERE is_active = 1 AND is_verified = 1 \
             ORDER BY subscribed_at ASC",
        )
        .fetch_all(db)
        .await?;
        Ok(emails)
    }
}

/// A fresh 128-bit hex verification token from the OS rng.
fn fresh_token() -> String {
    format!("{:016x}{:016x}", OsRng.gen::<u64>(), OsRng.gen::<u64>())
}
