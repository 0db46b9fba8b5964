use crate::db::blog_post::BlogPost;
use crate::db::project::Project;
use crate::db::settings::SiteSettings;
use crate::db::skill::Skill;
use crate::db::testimonial::Testimonial;
use crate::prelude::*;

/// Add all `home` routes to the router.
pub fn add_routes(router: AppRouter) -> AppRouter {
    router.public_routes(|r| r.route("/api/home", get(home)))
}

#[derive(serde::Serialize)]
struct HomePayload {
    site_settings: Option<SiteSettings>,
    featured_projects: Vec<Project>,
    skills: Vec<Skill>,
    testimonials: Vec<Testimonial>,
    recent_posts: Vec<BlogPost>,
    stats: Stats,
}

#[derive(serde::Serialize)]
struct Stats {
    total_projects: i64,
    total_blog_posts: i64,
    total_views: i64,
}

/// The aggregate front-page read. Each section degrades independently to
/// empty on failure; the page never hard-fails as a whole.
async fn home(State(state): State<SharedAppState>) -> Json<HomePayload> {
    let site_settings = match cached_settings(&state).await {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::error!("home: failed to load site settings: {e}");
            None
        }
    };

    Json(HomePayload {
        site_settings,
        featured_projects: section(Project::list_featured(&state.db, 6).await, "featured projects"),
        skills: section(Skill::list_active(&state.db).await, "skills"),
        testimonials: section(Testimonial::list_featured(&state.db, 6).await, "testimonials"),
        recent_posts: section(BlogPost::list_recent(&state.db, 3).await, "recent posts"),
        stats: Stats {
            total_projects: stat(Project::count_public(&state.db).await, "project count"),
            total_blog_posts: stat(BlogPost::count_published(&state.db).await, "post count"),
            total_views: stat(Project::total_views(&state.db).await, "view total"),
        },
    })
}

fn section<T>(result: AppResult<Vec<T>>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::error!("home: failed to load {what}: {e}");
        vec![]
    })
}

fn stat(result: AppResult<i64>, what: &str) -> i64 {
    result.unwrap_or_else(|e| {
        tracing::error!("home: failed to load {what}: {e}");
        0
    })
}

/// Site settings via the read cache; the cache holds them for an hour and
/// an admin update invalidates the entry.
pub async fn cached_settings(state: &AppState) -> AppResult<SiteSettings> {
    if let Some(value) = state.cache.get(SETTINGS_CACHE_KEY).await {
        if let Ok(settings) = serde_json::from_value(value) {
            return Ok(settings);
        }
    }
    let settings = SiteSettings::load(&state.db).await?;
    if let Ok(value) = serde_json::to_value(&settings) {
        state.cache.set_with_ttl(SETTINGS_CACHE_KEY, value, Duration::from_secs(3600)).await;
    }
    Ok(settings)
}

pub const SETTINGS_CACHE_KEY: &str = "site_settings";
