use axum_extra::extract::CookieJar;

use crate::db::blog_post::{BlogPost, PostFilter};
use crate::db::comment::{self, BlogComment, CommentThread, CreateComment};
use crate::prelude::*;
use crate::utils::guard::{CommentSubmission, Rejection, Verdict};
use crate::utils::moderation;
use crate::utils::session::{LikeLedger, LIKED_POSTS};

use super::projects::LikeResponse;

/// Add all `blog` routes to the router.
#[rustfmt::skip]
pub fn add_routes(router: AppRouter) -> AppRouter {
    router.public_routes(|r| {
        r.route("/api/blog", get(list_posts))
         .route("/api/blog/{slug}", get(post_detail))
         .route("/api/blog/{slug}/comments", post(submit_comment))
         .route("/api/blog/{slug}/like", post(like_post))
    })
}

#[derive(serde::Serialize)]
struct PostList {
    posts: Vec<BlogPost>,
    featured_posts: Vec<BlogPost>,
    popular_posts: Vec<BlogPost>,
    all_tags: Vec<String>,
}

async fn list_posts(
    State(state): State<SharedAppState>,
    Query(filter): Query<PostFilter>,
) -> AppResult<Json<PostList>> {
    let posts = BlogPost::list_published(&state.db, &filter).await?;
    let featured_posts = BlogPost::list_featured(&state.db, 3).await?;
    let popular_posts = BlogPost::list_popular(&state.db, 5).await?;
    let all_tags = cached_post_tags(&state).await?;
    Ok(Json(PostList { posts, featured_posts, popular_posts, all_tags }))
}

#[derive(serde::Serialize)]
struct PostDetail {
    post: BlogPost,
    related_posts: Vec<BlogPost>,
    comments: Vec<CommentThread>,
}

/// Serve a post detail page, counting the view. Comments are attached only
/// when the post allows them: approved top-level comments with their
/// approved replies.
async fn post_detail(
    State(state): State<SharedAppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<PostDetail>> {
    let Some(mut post) = BlogPost::lookup_by_slug(&state.db, &slug).await? else {
        return Err(AppError::NotFound);
    };
    if post.status != BlogPost::PUBLISHED {
        return Err(AppError::NotFound);
    }

    post.views = BlogPost::record_view(&state.db, post.id).await?;

    let related_posts = post.related(&state.db, 3).await?;
    let comments = match post.allow_comments {
        true => comment::thread(BlogComment::approved_for_post(&state.db, post.id).await?),
        false => vec![],
    };
    Ok(Json(PostDetail { post, related_posts, comments }))
}

#[derive(Debug, serde::Deserialize)]
struct CommentForm {
    name: String,
    email: String,
    website: Option<String>,
    content: String,
    parent_id: Option<i64>,
}

#[derive(serde::Serialize)]
struct CommentResponse {
    success: bool,
    approved: bool,
    message: &'static str,
}

async fn submit_comment(
    State(state): State<SharedAppState>,
    Path(slug): Path<String>,
    ClientIp(ip): ClientIp,
    Form(form): Form<CommentForm>,
) -> AppResult<Json<CommentResponse>> {
    let Some(post) = BlogPost::lookup_by_slug(&state.db, &slug).await? else {
        return Err(AppError::NotFound);
    };
    if post.status != BlogPost::PUBLISHED || !post.allow_comments {
        return Err(AppError::NotFound);
    }

    let submission =
        CommentSubmission { name: &form.name, email: &form.email, content: &form.content };
    match state.guard.admit_comment(&state.db, ip.as_deref(), &submission).await? {
        Verdict::Reject(Rejection::RateLimited) => return Err(AppError::RateLimited),
        Verdict::Reject(Rejection::Invalid { field, reason }) => {
            return Err(AppError::Validation { field, reason: reason.into() })
        }
        // Comments have no honeypot field and no spam patterns today.
        Verdict::Reject(_) | Verdict::Admit => {}
    }

    let email = form.email.trim().to_lowercase();
    let approved =
        moderation::decide_initial_approval(&email, post.author_email.as_deref(), &state.trust);

    let comment = BlogComment::create(
        &state.db,
        &CreateComment {
            post_id: post.id,
            parent_id: form.parent_id,
            name: form.name.trim().to_string(),
            email,
            website: form.website.filter(|w| !w.trim().is_empty()),
            content: form.content.trim().to_string(),
            is_approved: approved,
            ip_address: ip,
        },
    )
    .await?;

    state
        .notifier
        .dispatch(Event::CommentSubmitted {
            post_title: post.title.clone(),
            post_slug: post.slug.clone(),
            name: comment.name.clone(),
            email: comment.email.clone(),
            content: comment.content.clone(),
            approved,
        })
        .await;

    // Replies under an already approved comment also ping its author.
    if let Some(parent_id) = comment.parent_id {
        if let Some(parent) = BlogComment::lookup_by_id(&state.db, parent_id).await? {
            if parent.is_approved {
                state
                    .notifier
                    .dispatch(Event::CommentReply {
                        post_title: post.title.clone(),
                        post_slug: post.slug.clone(),
                        replier: comment.name.clone(),
                        content: comment.content.clone(),
                        recipient: parent.email,
                    })
                    .await;
            }
        }
    }

    let message = match approved {
        true => "Your comment has been posted!",
        false => "Your comment is awaiting moderation.",
    };
    Ok(Json(CommentResponse { success: true, approved, message }))
}

async fn like_post(
    State(state): State<SharedAppState>,
    Path(slug): Path<String>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<LikeResponse>)> {
    let Some(post) = BlogPost::lookup_by_slug(&state.db, &slug).await? else {
        return Err(AppError::NotFound);
    };
    if post.status != BlogPost::PUBLISHED {
        return Err(AppError::NotFound);
    }

    let ledger = LikeLedger::from_jar(&jar, LIKED_POSTS);
    if ledger.contains(post.id) {
        let response =
            LikeResponse { success: false, message: Some("Already liked"), likes: post.likes };
        return Ok((jar, Json(response)));
    }

    let likes = BlogPost::record_like(&state.db, post.id).await?;
    let jar = jar.add(ledger.with(post.id).into_cookie(LIKED_POSTS));
    Ok((jar, Json(LikeResponse { success: true, message: None, likes })))
}

async fn cached_post_tags(state: &AppState) -> AppResult<Vec<String>> {
    const KEY: &str = "post_tags";
    if let Some(value) = state.cache.get(KEY).await {
        if let Ok(tags) = serde_json::from_value(value) {
            return Ok(tags);
        }
    }
    let tags = BlogPost::all_tags(&state.db).await?;
    if let Ok(value) = serde_json::to_value(&tags) {
        state.cache.set(KEY, value).await;
    }
    Ok(tags)
}
