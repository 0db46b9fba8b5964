use crate::prelude::*;

/// A comment on a blog post. Replies reference a parent comment on the
/// same post; the public thread view renders two levels.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct BlogComment {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub website: Option<String>,
    pub content: String,
    pub is_approved: bool,
    pub ip_address: Option<String>,
    pub created_at: NaiveDateTime,
}

pub struct CreateComment {
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub website: Option<String>,
    pub content: String,
    pub is_approved: bool,
    pub ip_address: Option<String>,
}

/// An approved top-level comment plus its approved direct replies.
#[derive(Debug, serde::Serialize)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: BlogComment,
    pub replies: Vec<BlogComment>,
}

impl BlogComment {
    /// Create a comment. A reply's parent must exist and belong to the
    /// same post; depth beyond two levels is stored as-is but flattened by
    /// the thread view.
    pub async fn create(db: &Db, c: &CreateComment) -> AppResult<BlogComment> {
        if let Some(parent_id) = c.parent_id {
            let parent = Self::lookup_by_id(db, parent_id).await?.ok_or(AppError::Validation {
                field: "parent_id",
                reason: "Parent comment does not exist.".into(),
            })?;
            if parent.post_id != c.post_id {
                return Err(AppError::Validation {
                    field: "parent_id",
                    reason: "Parent comment belongs to a different post.".into(),
                });
            }
        }

        let row = sqlx::query(
            "INSERT INTO blog_comments \
                (post_id, parent_id, name, email, website, content, is_approved, ip_address) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(c.post_id)
        .bind(c.parent_id)
        .bind(&c.name)
        .bind(&c.email)
        .bind(&c.website)
        .bind(&c.content)
        .bind(c.is_approved)
        .bind(&c.ip_address)
        .execute(db)
        .await?;

        let comment = Self::lookup_by_id(db, row.last_insert_rowid())
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(comment)
    }

    pub async fn lookup_by_id(db: &Db, id: i64) -> AppResult<Option<BlogComment>> {
        let comment = sqlx::query_as::<_, BlogComment>("SELECT * FROM blog_comments WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(comment)
    }

    /// Idempotent, reversible moderation transitions.
    pub async fn approve(db: &Db, id: i64) -> AppResult<()> {
        sqlx::query("UPDATE blog_comments SET is_approved = 1 WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn reject(db: &Db, id: i64) -> AppResult<()> {
        sqlx::query("UPDATE blog_comments SET is_approved = 0 WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// All approved comments on a post, oldest first.
    pub async fn approved_for_post(db: &Db, post_id: i64) -> AppResult<Vec<BlogComment>> {
        let comments = sqlx::query_as::<_, BlogComment>(
            "SELECT * FROM blog_comments \
             WHERE post_id = ? AND is_approved = 1 \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(post_id)
        .fetch_all(db)
        .await?;
        Ok(comments)
    }

    /// Comments awaiting moderation, oldest first.
    pub async fn list_pending(db: &Db) -> AppResult<Vec<BlogComment>> {
        let comments = sqlx::query_as::<_, BlogComment>(
            "SELECT * FROM blog_comments WHERE is_approved = 0 ORDER BY created_at ASC",
        )
        .fetch_all(db)
        .await?;
        Ok(comments)
    }

    pub async fn count_recent_from_ip(db: &Db, ip: &str, cutoff: NaiveDateTime) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM blog_comments WHERE ip_address = ? AND created_at >= ?",
        )
        .bind(ip)
        .bind(cutoff)
        .fetch_one(db)
        .await?;
        Ok(count)
    }
}

/// Group approved comments into two-level threads: top-level comments with
/// their direct replies. Replies whose parent is itself a reply are not
/// rendered, matching what the site presents.
pub fn thread(comments: Vec<BlogComment>) -> Vec<CommentThread> {
    let top_level: Vec<BlogComment> =
        comments.iter().filter(|c| c.parent_id.is_none()).cloned().collect();
    top_level
        .into_iter()
        .map(|comment| {
            let replies =
                comments.iter().filter(|c| c.parent_id == Some(comment.id)).cloned().collect();
            CommentThread { comment, replies }
        })
        .collect()
}
