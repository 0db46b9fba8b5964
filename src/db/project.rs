use sqlx::QueryBuilder;

use crate::prelude::*;

/// A portfolio project. Only `completed` projects are publicly visible.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Project {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub category: String,
    pub description: String,
    /// Comma-separated list.
    pub technologies: String,
    /// Comma-separated list.
    pub tags: String,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub status: String,
    pub featured: bool,
    pub sort_order: i64,
    pub views: i64,
    pub likes: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, serde::Deserialize)]
pub struct UpdateProject {
    pub slug: String,
    pub title: String,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub technologies: String,
    #[serde(default)]
    pub tags: String,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub sort_order: i64,
}

fn default_status() -> String {
    Project::COMPLETED.into()
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ProjectFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub sort: Option<String>,
}

impl Project {
    pub const COMPLETED: &'static str = "completed";

    /// Create a project.
    pub async fn create(db: &Db, p: &UpdateProject) -> AppResult<i64> {
        let row = sqlx::query(
            "INSERT INTO projects \
                (slug, title, category, description, technologies, tags, \
                 github_url, live_url, status, featured, sort_order) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&p.slug)
        .bind(&p.title)
        .bind(&p.category)
        .bind(&p.description)
        .bind(&p.technologies)
        .bind(&p.tags)
        .bind(&p.github_url)
        .bind(&p.live_url)
        .bind(&p.status)
        .bind(p.featured)
        .bind(p.sort_order)
        .execute(db)
        .await?;
        Ok(row.last_insert_rowid())
    }

    /// Lookup a project by slug, if one exists.
    pub async fn lookup_by_slug(db: &Db, slug: &str) -> AppResult<Option<Project>> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE slug = ?")
            .bind(slug)
            .fetch_optional(db)
            .await?;
        Ok(project)
    }

    pub async fn lookup_by_id(db: &Db, id: i64) -> AppResult<Option<Project>> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(project)
    }

    /// List publicly visible projects, filtered and sorted.
    pub async fn list_public(db: &Db, filter: &ProjectFilter) -> AppResult<Vec<Project>> {
        let order = match filter.sort.as_deref() {
            Some("views") => "views DESC",
            Some("likes") => "likes DESC",
            Some("title") => "title ASC",
            Some("newest") => "created_at DESC",
            _ => "featured DESC, sort_order ASC, created_at DESC",
        };

        let mut qb = QueryBuilder::new("SELECT * FROM projects WHERE status = ");
        qb.push_bind(Self::COMPLETED);
        if let Some(category) = &filter.category {
            qb.push(" AND category = ").push_bind(category);
        }
        if let Some(tag) = &filter.tag {
            qb.push(" AND tags LIKE ").push_bind(format!("%{tag}%"));
        }
        qb.push(" ORDER BY ").push(order);

        let mut projects = qb.build_query_as::<Project>().fetch_all(db).await?;
        // The LIKE above is a coarse prefilter over the CSV column; keep
        // only exact tag matches.
        if let Some(tag) = &filter.tag {
            projects.retain(|p| p.tag_list().iter().any(|t| t.eq_ignore_ascii_case(tag)));
        }
        Ok(projects)
    }

    pub async fn list_featured(db: &Db, limit: i64) -> AppResult<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects \
             WHERE status = ? AND featured = 1 \
             ORDER BY sort_order ASC, created_at DESC \
             LIMIT ?",
        )
        .bind(Self::COMPLETED)
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(projects)
    }

    /// Atomically bump the view counter, returning the new count.
    pub async fn record_view(db: &Db, id: i64) -> AppResult<i64> {
        let views = sqlx::query_scalar::<_, i64>(
            "UPDATE projects SET views = views + 1 WHERE id = ? RETURNING views",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        views.ok_or(AppError::NotFound)
    }

    /// Atomically bump the like counter, returning the new count. Session
    /// deduplication happens in the handler; this is just the increment.
    pub async fn record_like(db: &Db, id: i64) -> AppResult<i64> {
        let likes = sqlx::query_scalar::<_, i64>(
            "UPDATE projects SET likes = likes + 1 WHERE id = ? RETURNING likes",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        likes.ok_or(AppError::NotFound)
    }

    /// Admin-only counter reset; the one sanctioned non-monotonic write.
    pub async fn reset_counters(db: &Db, id: i64) -> AppResult<()> {
        sqlx::query("UPDATE projects SET views = 0, likes = 0 WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn count_public(db: &Db) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE status = ?")
            .bind(Self::COMPLETED)
            .fetch_one(db)
            .await?;
        Ok(count)
    }

    pub async fn total_views(db: &Db) -> AppResult<i64> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(views), 0) FROM projects WHERE status = ?")
                .bind(Self::COMPLETED)
                .fetch_one(db)
                .await?;
        Ok(total)
    }

    /// Distinct tags across public projects, sorted.
    pub async fn all_tags(db: &Db) -> AppResult<Vec<String>> {
        let rows = sqlx::query_scalar::<_, String>("SELECT tags FROM projects WHERE status = ?")
            .bind(Self::COMPLETED)
            .fetch_all(db)
            .await?;
        Ok(collect_tags(&rows))
    }

    /// Up to `limit` related projects: shared-tag overlap first, padded
    /// with same-category projects.
    pub async fn related(&self, db: &Db, limit: usize) -> AppResult<Vec<Project>> {
        let others = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE status = ? AND id != ?",
        )
        .bind(Self::COMPLETED)
        .bind(self.id)
        .fetch_all(db)
        .await?;
        Ok(rank_related(self, others, limit))
    }

    pub fn tag_list(&self) -> Vec<&str> {
        split_csv(&self.tags)
    }

    pub fn tech_list(&self) -> Vec<&str> {
        split_csv(&self.technologies)
    }
}

pub fn split_csv(csv: &str) -> Vec<&str> {
    csv.split(',').map(str::trim).filter(|t| !t.is_empty()).collect()
}

pub fn collect_tags(rows: &[String]) -> Vec<String> {
    let mut tags: Vec<String> =
        rows.iter().flat_map(|r| split_csv(r)).map(str::to_string).collect();
    tags.sort();
    tags.dedup();
    tags
}

fn rank_related(current: &Project, others: Vec<Project>, limit: usize) -> Vec<Project> {
    let current_tags: Vec<String> =
        current.tag_list().iter().map(|t| t.to_lowercase()).collect();
    let overlap = |p: &Project| {
        p.tag_list().iter().filter(|t| current_tags.contains(&t.to_lowercase())).count()
    };

    let mut scored: Vec<(usize, Project)> = others.into_iter().map(|p| (overlap(&p), p)).collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.views.cmp(&a.1.views)));

    let mut related: Vec<Project> =
        scored.iter().filter(|(n, _)| *n > 0).take(limit).map(|(_, p)| p.clone()).collect();

    if related.len() < limit {
        for (_, p) in &scored {
            if related.len() >= limit {
                break;
            }
            if p.category == current.category && !related.iter().any(|r| r.id == p.id) {
                related.push(p.clone());
            }
        }
    }
    related
}
