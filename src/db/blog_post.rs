use sqlx::QueryBuilder;

use super::project::{collect_tags, split_csv};
use crate::prelude::*;

/// A blog post. Only `published` posts are publicly visible.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct BlogPost {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author_email: Option<String>,
    /// Comma-separated list.
    pub tags: String,
    pub status: String,
    pub published_at: Option<NaiveDateTime>,
    pub featured: bool,
    pub views: i64,
    pub likes: i64,
    /// Minutes, derived from the content length on write.
    pub reading_time: i64,
    pub allow_comments: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, serde::Deserialize)]
pub struct UpdatePost {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    pub content: String,
    pub author_email: Option<String>,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_allow_comments")]
    pub allow_comments: bool,
}

fn default_allow_comments() -> bool {
    true
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct PostFilter {
    pub tag: Option<String>,
    pub sort: Option<String>,
}

impl BlogPost {
    pub const DRAFT: &'static str = "draft";
    pub const PUBLISHED: &'static str = "published";

    /// Estimated reading time at ~200 words per minute, never below one.
    pub fn reading_time_for(content: &str) -> i64 {
        let words = content.split_whitespace().count() as f64;
        ((words / 200.0).round() as i64).max(1)
    }

    /// Create a post as a draft.
    pub async fn create(db: &Db, post: &UpdatePost) -> AppResult<i64> {
        let reading_time = Self::reading_time_for(&post.content);
        let row = sqlx::query(
            "INSERT INTO blog_posts \
                (slug, title, excerpt, content, author_email, tags, featured, allow_comments, reading_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.excerpt)
        .bind(&post.content)
        .bind(&post.author_email)
        .bind(&post.tags)
        .bind(post.featured)
        .bind(post.allow_comments)
        .bind(reading_time)
        .execute(db)
        .await?;
        Ok(row.last_insert_rowid())
    }

    /// Publish a post. The publication timestamp is stamped on the first
    /// publish only; re-publishing is a no-op on the date.
    pub async fn publish(db: &Db, id: i64) -> AppResult<BlogPost> {
        let now = Utc::now().naive_utc();
        let post = sqlx::query_as::<_, BlogPost>(
            "UPDATE blog_posts \
             SET status = ?, published_at = COALESCE(published_at, ?), updated_at = ? \
             WHERE id = ? \
             RETURNING *",
        )
        .bind(Self::PUBLISHED)
        .bind(now)
        .bind(now)
        .bind(id)
        .fetch_optional(db)
        .await?;
        post.ok_or(AppError::NotFound)
    }

    pub async fn lookup_by_slug(db: &Db, slug: &str) -> AppResult<Option<BlogPost>> {
        let post = sqlx::query_as::<_, BlogPost>("SELECT * FROM blog_posts WHERE slug = ?")
            .bind(slug)
            .fetch_optional(db)
            .await?;
        Ok(post)
    }

    pub async fn lookup_by_id(db: &Db, id: i64) -> AppResult<Option<BlogPost>> {
        let post = sqlx::query_as::<_, BlogPost>("SELECT * FROM blog_posts WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(post)
    }

    /// List published posts, filtered and sorted.
    pub async fn list_published(db: &Db, filter: &PostFilter) -> AppResult<Vec<BlogPost>> {
        let order = match filter.sort.as_deref() {
            Some("views") => "views DESC",
            Some("likes") => "likes DESC",
            Some("title") => "title ASC",
            _ => "published_at DESC",
        };

        let mut qb = QueryBuilder::new("SELECT * FROM blog_posts WHERE status = ");
        qb.push_bind(Self::PUBLISHED);
        if let Some(tag) = &filter.tag {
            qb.push(" AND tags LIKE ").push_bind(format!("%{tag}%"));
        }
        qb.push(" ORDER BY ").push(order);

        let mut posts = qb.build_query_as::<BlogPost>().fetch_all(db).await?;
        if let Some(tag) = &filter.tag {
            posts.retain(|p| p.tag_list().iter().any(|t| t.eq_ignore_ascii_case(tag)));
        }
        Ok(posts)
    }

    pub async fn list_featured(db: &Db, limit: i64) -> AppResult<Vec<BlogPost>> {
        let posts = sqlx::query_as::<_, BlogPost>(
            "SELECT * FROM blog_posts \
             WHERE status = ? AND featured = 1 \
             ORDER BY published_at DESC \
             LIMIT ?",
        )
        .bind(Self::PUBLISHED)
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(posts)
    }

    pub async fn list_popular(db: &Db, limit: i64) -> AppResult<Vec<BlogPost>> {
        let posts = sqlx::query_as::<_, BlogPost>(
            "SELECT * FROM blog_posts WHERE status = ? ORDER BY views DESC LIMIT ?",
        )
        .bind(Self::PUBLISHED)
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(posts)
    }

    pub async fn list_recent(db: &Db, limit: i64) -> AppResult<Vec<BlogPost>> {
        let posts = sqlx::query_as::<_, BlogPost>(
            "SELECT * FROM blog_posts WHERE status = ? ORDER BY published_at DESC LIMIT ?",
        )
        .bind(Self::PUBLISHED)
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(posts)
    }

    /// Atomically bump the view counter, returning the new count.
    pub async fn record_view(db: &Db, id: i64) -> AppResult<i64> {
        let views = sqlx::query_scalar::<_, i64>(
            "UPDATE blog_posts SET views = views + 1 WHERE id = ? RETURNING views",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        views.ok_or(AppError::NotFound)
    }

    /// Atomically bump the like counter, returning the new count.
    pub async fn record_like(db: &Db, id: i64) -> AppResult<i64> {
        let likes = sqlx::query_scalar::<_, i64>(
            "UPDATE blog_posts SET likes = likes + 1 WHERE id = ? RETURNING likes",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        likes.ok_or(AppError::NotFound)
    }

    pub async fn count_published(db: &Db) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM blog_posts WHERE status = ?")
            .bind(Self::PUBLISHED)
            .fetch_one(db)
            .await?;
        Ok(count)
    }

    /// Distinct tags across published posts, sorted.
    pub async fn all_tags(db: &Db) -> AppResult<Vec<String>> {
        let rows = sqlx::query_scalar::<_, String>("SELECT tags FROM blog_posts WHERE status = ?")
            .bind(Self::PUBLISHED)
            .fetch_all(db)
            .await?;
        Ok(collect_tags(&rows))
    }

    /// Up to `limit` related posts: shared-tag matches first, most recent
    /// otherwise.
    pub async fn related(&self, db: &Db, limit: usize) -> AppResult<Vec<BlogPost>> {
        let others = sqlx::query_as::<_, BlogPost>(
            "SELECT * FROM blog_posts \
             WHERE status = ? AND id != ? \
             ORDER BY published_at DESC",
        )
        .bind(Self::PUBLISHED)
        .bind(self.id)
        .fetch_all(db)
        .await?;

        let current_tags: Vec<String> = self.tag_list().iter().map(|t| t.to_lowercase()).collect();
        let overlap = |p: &BlogPost| {
            p.tag_list().iter().filter(|t| current_tags.contains(&t.to_lowercase())).count()
        };

        let mut related: Vec<BlogPost> =
            others.iter().filter(|p| overlap(p) > 0).take(limit).cloned().collect();
        for p in &others {
            if related.len() >= limit {
                break;
            }
            if !related.iter().any(|r| r.id == p.id) {
                related.push(p.clone());
            }
        }
        Ok(related)
    }

    pub fn tag_list(&self) -> Vec<&str> {
        split_csv(&self.tags)
    }
}
