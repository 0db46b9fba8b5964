use axum_extra::extract::CookieJar;

use crate::db::project::{Project, ProjectFilter};
use crate::prelude::*;
use crate::utils::session::{LikeLedger, LIKED_PROJECTS};

/// Add all `projects` routes to the router.
#[rustfmt::skip]
pub fn add_routes(router: AppRouter) -> AppRouter {
    router.public_routes(|r| {
        r.route("/api/projects", get(list_projects))
         .route("/api/projects/{slug}", get(project_detail))
         .route("/api/projects/{slug}/like", post(like_project))
    })
}

/// Project view counts that trigger an admin notification, exactly once
/// each, on the increment that lands on the milestone.
pub const VIEW_MILESTONES: [i64; 5] = [100, 500, 1000, 5000, 10000];

#[derive(serde::Serialize)]
struct ProjectList {
    projects: Vec<Project>,
    all_tags: Vec<String>,
}

async fn list_projects(
    State(state): State<SharedAppState>,
    Query(filter): Query<ProjectFilter>,
) -> AppResult<Json<ProjectList>> {
    let projects = Project::list_public(&state.db, &filter).await?;
    let all_tags = cached_project_tags(&state).await?;
    Ok(Json(ProjectList { projects, all_tags }))
}

#[derive(serde::Serialize)]
struct ProjectDetail {
    project: Project,
    related_projects: Vec<Project>,
}

/// Serve a project detail page: counts the view and fires the milestone
/// notification when the new count lands exactly on one.
async fn project_detail(
    State(state): State<SharedAppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ProjectDetail>> {
    let Some(mut project) = Project::lookup_by_slug(&state.db, &slug).await? else {
        return Err(AppError::NotFound);
    };
    if project.status != Project::COMPLETED {
        return Err(AppError::NotFound);
    }

    project.views = Project::record_view(&state.db, project.id).await?;
    if VIEW_MILESTONES.contains(&project.views) {
        state
            .notifier
            .dispatch(Event::ViewMilestone {
                title: project.title.clone(),
                slug: project.slug.clone(),
                milestone: project.views,
                likes: project.likes,
            })
            .await;
    }

    let related_projects = project.related(&state.db, 3).await?;
    Ok(Json(ProjectDetail { project, related_projects }))
}

#[derive(serde::Serialize)]
pub struct LikeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub likes: i64,
}

async fn like_project(
    State(state): State<SharedAppState>,
    Path(slug): Path<String>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<LikeResponse>)> {
    let Some(project) = Project::lookup_by_slug(&state.db, &slug).await? else {
        return Err(AppError::NotFound);
    };

    let ledger = LikeLedger::from_jar(&jar, LIKED_PROJECTS);
    if ledger.contains(project.id) {
        let response =
            LikeResponse { success: false, message: Some("Already liked"), likes: project.likes };
        return Ok((jar, Json(response)));
    }

    let likes = Project::record_like(&state.db, project.id).await?;
    let jar = jar.add(ledger.with(project.id).into_cookie(LIKED_PROJECTS));
    Ok((jar, Json(LikeResponse { success: true, message: None, likes })))
}

async fn cached_project_tags(state: &AppState) -> AppResult<Vec<String>> {
    const KEY: &str = "project_tags";
    if let Some(value) = state.cache.get(KEY).await {
        if let Ok(tags) = serde_json::from_value(value) {
            return Ok(tags);
        }
    }
    let tags = Project::all_tags(&state.db).await?;
    if let Ok(value) = serde_json::to_value(&tags) {
        state.cache.set(KEY, value).await;
    }
    Ok(tags)
}
