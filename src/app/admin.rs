use crate::db::blog_post::BlogPost;
use crate::db::comment::BlogComment;
use crate::db::contact::ContactMessage;
use crate::db::project::Project;
use crate::db::settings::{SiteSettings, UpdateSettings};
use crate::db::subscriber::Subscriber;
use crate::prelude::*;

use super::home::SETTINGS_CACHE_KEY;

/// Add all `admin` routes to the router.
#[rustfmt::skip]
pub fn add_routes(router: AppRouter) -> AppRouter {
    router.admin_routes(|r| {
        r.route("/comments", get(list_pending_comments))
         .route("/comments/{id}/approve", post(approve_comment))
         .route("/comments/{id}/reject", post(reject_comment))
         .route("/contact", get(list_contact_messages))
         .route("/contact/{id}/read", post(mark_read))
         .route("/contact/{id}/responded", post(mark_responded))
         .route("/posts/{id}/publish", post(publish_post))
         .route("/projects/{id}/reset-counters", post(reset_counters))
         .route("/settings", get(get_settings).post(update_settings))
    })
}

async fn list_pending_comments(
    State(state): State<SharedAppState>,
) -> AppResult<Json<Vec<BlogComment>>> {
    Ok(Json(BlogComment::list_pending(&state.db).await?))
}

async fn approve_comment(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BlogComment>> {
    BlogComment::approve(&state.db, id).await?;
    let comment = BlogComment::lookup_by_id(&state.db, id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(comment))
}

async fn reject_comment(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BlogComment>> {
    BlogComment::reject(&state.db, id).await?;
    let comment = BlogComment::lookup_by_id(&state.db, id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(comment))
}

async fn list_contact_messages(
    State(state): State<SharedAppState>,
) -> AppResult<Json<Vec<ContactMessage>>> {
    Ok(Json(ContactMessage::list(&state.db).await?))
}

async fn mark_read(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ContactMessage>> {
    ContactMessage::mark_read(&state.db, id).await?;
    let message = ContactMessage::lookup_by_id(&state.db, id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(message))
}

async fn mark_responded(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ContactMessage>> {
    ContactMessage::mark_responded(&state.db, id).await?;
    let message = ContactMessage::lookup_by_id(&state.db, id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(message))
}

/// Publish a post and broadcast it to active, verified subscribers.
async fn publish_post(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BlogPost>> {
    let post = BlogPost::publish(&state.db, id).await?;

    let recipients = Subscriber::active_verified_emails(&state.db).await?;
    state
        .notifier
        .dispatch(Event::PostPublished {
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            reading_time: post.reading_time,
            recipients,
        })
        .await;

    Ok(Json(post))
}

async fn reset_counters(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Project>> {
    Project::reset_counters(&state.db, id).await?;
    let project = Project::lookup_by_id(&state.db, id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(project))
}

async fn get_settings(State(state): State<SharedAppState>) -> AppResult<Json<SiteSettings>> {
    Ok(Json(SiteSettings::load(&state.db).await?))
}

async fn update_settings(
    State(state): State<SharedAppState>,
    Form(form): Form<UpdateSettings>,
) -> AppResult<Json<SiteSettings>> {
    let settings = SiteSettings::update(&state.db, &form).await?;
    state.cache.invalidate(SETTINGS_CACHE_KEY).await;
    Ok(Json(settings))
}
