use crate::prelude::*;

/// The singleton site settings row.
///
/// Explicitly get-or-created once at startup, so no request ever races the
/// first materialization; reads afterwards go through the read cache.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
pub struct SiteSettings {
    pub id: i64,
    pub site_name: String,
    pub tagline: String,
    pub description: String,
    pub email: String,
    pub location: String,
    pub enable_blog: bool,
    pub enable_newsletter: bool,
    pub enable_testimonials: bool,
    pub maintenance_mode: bool,
    pub available_for_work: bool,
    pub footer_text: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, serde::Deserialize)]
pub struct UpdateSettings {
    pub site_name: String,
    pub tagline: String,
    pub description: String,
    pub email: String,
    pub location: String,
    pub enable_blog: bool,
    pub enable_newsletter: bool,
    pub enable_testimonials: bool,
    pub maintenance_mode: bool,
    pub available_for_work: bool,
    pub footer_text: String,
}

impl SiteSettings {
    /// Ensure the singleton row exists and return it.
    pub async fn init(db: &Db) -> AppResult<SiteSettings> {
        sqlx::query("INSERT OR IGNORE INTO site_settings (id) VALUES (1)")
            .execute(db)
            .await?;
        Self::load(db).await
    }

    pub async fn load(db: &Db) -> AppResult<SiteSettings> {
        let settings =
            sqlx::query_as::<_, SiteSettings>("SELECT * FROM site_settings WHERE id = 1")
                .fetch_one(db)
                .await?;
        Ok(settings)
    }

    pub async fn update(db: &Db, s: &UpdateSettings) -> AppResult<SiteSettings> {
        let now = Utc::now().naive_utc();
        let settings = sqlx::query_as::<_, SiteSettings>(
            "UPDATE site_settings \
             SET site_name = ?, tagline = ?, description = ?, email = ?, location = ?, \
                 enable_blog = ?, enable_newsletter = ?, enable_testimonials = ?, \
                 maintenance_mode = ?, available_for_work = ?, footer_text = ?, updated_at = ? \
             WHERE id = 1 \
             RETURNING *",
        )
        .bind(&s.site_name)
        .bind(&s.tagline)
        .bind(&s.description)
        .bind(&s.email)
        .bind(&s.location)
        .bind(s.enable_blog)
        .bind(s.enable_newsletter)
        .bind(s.enable_testimonials)
        .bind(s.maintenance_mode)
        .bind(s.available_for_work)
        .bind(&s.footer_text)
        .bind(now)
        .fetch_one(db)
        .await?;
        Ok(settings)
    }
}
