use crate::db::blog_post::BlogPost;
use crate::db::project::Project;
use crate::prelude::*;

/// Add all `search` routes to the router.
pub fn add_routes(router: AppRouter) -> AppRouter {
    router.public_routes(|r| r.route("/api/search", get(search)))
}

#[derive(Debug, serde::Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(serde::Serialize)]
struct SearchResults {
    query: String,
    projects: Vec<Project>,
    posts: Vec<BlogPost>,
    total_results: usize,
}

/// Substring search over public content.
async fn search(
    State(state): State<SharedAppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<SearchResults>> {
    let q = query.q.trim().to_string();
    if q.is_empty() {
        return Ok(Json(SearchResults { query: q, projects: vec![], posts: vec![], total_results: 0 }));
    }
    let like = format!("%{q}%");

    let projects = sqlx::query_as::<_, Project>(
        "SELECT * FROM projects \
         WHERE status = ? \
           AND (title LIKE ? OR description LIKE ? OR technologies LIKE ? OR tags LIKE ?) \
         ORDER BY views DESC \
         LIMIT 10",
    )
    .bind(Project::COMPLETED)
    .bind(&like)
    .bind(&like)
    .bind(&like)
    .bind(&like)
    .fetch_all(&state.db)
    .await?;

    let posts = sqlx::query_as::<_, BlogPost>(
        "SELECT * FROM blog_posts \
         WHERE status = ? \
           AND (title LIKE ? OR excerpt LIKE ? OR content LIKE ? OR tags LIKE ?) \
         ORDER BY published_at DESC \
         LIMIT 10",
    )
    .bind(BlogPost::PUBLISHED)
    .bind(&like)
    .bind(&like)
    .bind(&like)
    .bind(&like)
    .fetch_all(&state.db)
    .await?;

    let total_results = projects.len() + posts.len();
    Ok(Json(SearchResults { query: q, projects, posts, total_results }))
}
