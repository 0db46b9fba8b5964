use crate::prelude::*;

/// A client testimonial. Only approved testimonials are shown publicly.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Testimonial {
    pub id: i64,
    pub name: String,
    pub position: String,
    pub company: Option<String>,
    pub content: String,
    pub rating: i64,
    pub is_featured: bool,
    pub is_approved: bool,
    pub sort_order: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, serde::Deserialize)]
pub struct UpdateTestimonial {
    pub name: String,
    pub position: String,
    pub company: Option<String>,
    pub content: String,
    #[serde(default = "default_rating")]
    pub rating: i64,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub sort_order: i64,
}

fn default_rating() -> i64 {
    5
}

impl Testimonial {
    pub async fn create(db: &Db, t: &UpdateTestimonial) -> AppResult<i64> {
        let row = sqlx::query(
            "INSERT INTO testimonials (name, position, company, content, rating, is_featured, sort_order) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&t.name)
        .bind(&t.position)
        .bind(&t.company)
        .bind(&t.content)
        .bind(t.rating)
        .bind(t.is_featured)
        .bind(t.sort_order)
        .execute(db)
        .await?;
        Ok(row.last_insert_rowid())
    }

    pub async fn lookup_by_name(db: &Db, name: &str) -> AppResult<Option<Testimonial>> {
        let testimonial = sqlx::query_as::<_, Testimonial>("SELECT * FROM testimonials WHERE name = ?")
            .bind(name)
            .fetch_optional(db)
            .await?;
        Ok(testimonial)
    }

    /// Approved, featured testimonials for the home page.
    pub async fn list_featured(db: &Db, limit: i64) -> AppResult<Vec<Testimonial>> {
        let testimonials = sqlx::query_as::<_, Testimonial>(
            "SELECT * FROM testimonials \
             WHERE is_approved = 1 AND is_featured = 1 \
             ORDER BY sort_order ASC, created_at DESC \
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(testimonials)
    }
}
