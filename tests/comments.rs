mod common;

use axum::http::StatusCode;
use folio::db::blog_post::{BlogPost, UpdatePost};
use folio::db::comment::BlogComment;
use folio::db::Db;

use common::{json_body, spawn_app, TestApp};

async fn seed_post(db: &Db, slug: &str, author_email: Option<&str>) -> i64 {
    let id = BlogPost::create(
        db,
        &UpdatePost {
            slug: slug.into(),
            title: format!("Post {slug}"),
            excerpt: "An excerpt".into(),
            content: "Some interesting content about web development.".into(),
            author_email: author_email.map(str::to_string),
            tags: "rust, web".into(),
            featured: false,
            allow_comments: true,
        },
    )
    .await
    .unwrap();
    BlogPost::publish(db, id).await.unwrap();
    id
}

async fn submit(app: &TestApp, slug: &str, ip: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let response = app.post_form_from(&format!("/api/blog/{slug}/comments"), ip, body).await;
    let status = response.status();
    let body = json_body(response).await;
    (status, body)
}

#[tokio::test]
async fn author_email_is_approved_immediately() {
    let app = spawn_app().await;
    seed_post(&app.state.db, "hello", Some("author@example.com")).await;

    let (status, body) = submit(
        &app,
        "hello",
        "1.1.1.1",
        "name=The+Author&email=author@example.com&content=Replying+to+my+own+post",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approved"], true);

    // Visible to the public immediately.
    let detail = json_body(app.get("/api/blog/hello").await).await;
    assert_eq!(detail["comments"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_senders_wait_for_moderation() {
    let app = spawn_app().await;
    seed_post(&app.state.db, "hello", Some("author@example.com")).await;

    let (status, body) = submit(
        &app,
        "hello",
        "1.1.1.1",
        "name=Stranger&email=stranger@example.com&content=A+thoughtful+comment",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approved"], false);

    // Held comments are not shown publicly.
    let detail = json_body(app.get("/api/blog/hello").await).await;
    assert!(detail["comments"].as_array().unwrap().is_empty());

    // An admin approve makes it visible; approve is idempotent.
    let pending = json_body(app.get("/admin/comments").await).await;
    let id = pending[0]["id"].as_i64().unwrap();
    assert_eq!(app.post(&format!("/admin/comments/{id}/approve")).await.status(), StatusCode::OK);
    assert_eq!(app.post(&format!("/admin/comments/{id}/approve")).await.status(), StatusCode::OK);

    let detail = json_body(app.get("/api/blog/hello").await).await;
    assert_eq!(detail["comments"].as_array().unwrap().len(), 1);

    // And reject takes it back down.
    assert_eq!(app.post(&format!("/admin/comments/{id}/reject")).await.status(), StatusCode::OK);
    let detail = json_body(app.get("/api/blog/hello").await).await;
    assert!(detail["comments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn trusted_domains_skip_moderation() {
    let app = spawn_app().await;
    seed_post(&app.state.db, "hello", Some("author@example.com")).await;

    let (_, body) = submit(
        &app,
        "hello",
        "1.1.1.1",
        "name=Colleague&email=colleague@trusted-domain.com&content=Nice+write-up",
    )
    .await;
    assert_eq!(body["approved"], true);
}

#[tokio::test]
async fn content_length_boundaries() {
    let app = spawn_app().await;
    seed_post(&app.state.db, "hello", None).await;

    for (length, expected) in
        [(4, StatusCode::UNPROCESSABLE_ENTITY), (5, StatusCode::OK), (1000, StatusCode::OK), (1001, StatusCode::UNPROCESSABLE_ENTITY)]
    {
        let body = format!("name=Someone&email=s@example.com&content={}", "x".repeat(length));
        let (status, _) = submit(&app, "hello", "2.2.2.2", &body).await;
        assert_eq!(status, expected, "content length {length}");
    }
}

#[tokio::test]
async fn replies_under_approved_comments_notify_the_parent_commenter() {
    let app = spawn_app().await;
    let post_id = seed_post(&app.state.db, "hello", Some("author@example.com")).await;

    // Author's comment is auto-approved.
    let (_, body) = submit(
        &app,
        "hello",
        "1.1.1.1",
        "name=The+Author&email=author@example.com&content=First+comment+here",
    )
    .await;
    assert_eq!(body["approved"], true);
    let parent = BlogComment::approved_for_post(&app.state.db, post_id).await.unwrap();
    let parent_id = parent[0].id;

    app.outbox.lock().unwrap().clear();
    let (status, _) = submit(
        &app,
        "hello",
        "3.3.3.3",
        &format!("name=Stranger&email=s@example.com&content=Replying+to+you&parent_id={parent_id}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let outbox = app.outbox.lock().unwrap();
    assert_eq!(outbox.len(), 2);
    // Admin summary plus the reply ping to the parent commenter.
    assert!(outbox[0].subject.starts_with("New comment on"));
    assert!(outbox[1].subject.starts_with("Reply to your comment"));
    assert_eq!(outbox[1].to, vec!["author@example.com".to_string()]);
}

#[tokio::test]
async fn replies_under_held_comments_do_not_notify() {
    let app = spawn_app().await;
    let post_id = seed_post(&app.state.db, "hello", None).await;

    submit(&app, "hello", "1.1.1.1", "name=Stranger&email=s@example.com&content=Held+comment+here")
        .await;
    let held = sqlx::query_scalar::<_, i64>("SELECT id FROM blog_comments WHERE post_id = ?")
        .bind(post_id)
        .fetch_one(&app.state.db)
        .await
        .unwrap();

    app.outbox.lock().unwrap().clear();
    submit(
        &app,
        "hello",
        "3.3.3.3",
        &format!("name=Other&email=o@example.com&content=Replying+anyway&parent_id={held}"),
    )
    .await;

    // Only the admin summary; no ping for a parent that was never shown.
    let subjects = app.outbox_subjects();
    assert_eq!(subjects.len(), 1);
    assert!(subjects[0].starts_with("New comment on"));
}

#[tokio::test]
async fn replies_must_stay_on_the_same_post() {
    let app = spawn_app().await;
    let first = seed_post(&app.state.db, "first", Some("author@example.com")).await;
    seed_post(&app.state.db, "second", None).await;

    submit(&app, "first", "1.1.1.1", "name=The+Author&email=author@example.com&content=On+the+first+post")
        .await;
    let parent = BlogComment::approved_for_post(&app.state.db, first).await.unwrap()[0].id;

    let (status, body) = submit(
        &app,
        "second",
        "1.1.1.1",
        &format!("name=Someone&email=s@example.com&content=Wrong+thread&parent_id={parent}"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "parent_id");
}

#[tokio::test]
async fn fourth_comment_within_the_hour_is_rate_limited() {
    let app = spawn_app().await;
    seed_post(&app.state.db, "hello", None).await;

    for i in 0..3 {
        let (status, _) = submit(
            &app,
            "hello",
            "7.7.7.7",
            &format!("name=Someone&email=s@example.com&content=Comment+number+{i}"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = submit(
        &app,
        "hello",
        "7.7.7.7",
        "name=Someone&email=s@example.com&content=One+comment+too+many",
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}
