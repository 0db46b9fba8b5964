mod common;

use axum::http::StatusCode;
use folio::db::blog_post::{BlogPost, UpdatePost};
use folio::db::project::{Project, UpdateProject};
use folio::db::skill::{Skill, UpdateSkill};

use common::{json_body, spawn_app, TestApp};

async fn seed_draft(app: &TestApp) -> i64 {
    BlogPost::create(
        &app.state.db,
        &UpdatePost {
            slug: "launch".into(),
            title: "Launch".into(),
            excerpt: "We shipped".into(),
            content: "word ".repeat(450),
            author_email: None,
            tags: "news".into(),
            featured: false,
            allow_comments: true,
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn publishing_broadcasts_to_verified_subscribers() {
    let app = spawn_app().await;
    let id = seed_draft(&app).await;

    // One verified subscriber, one still pending.
    app.post_form("/api/newsletter/subscribe", "email=verified@example.com").await;
    let token = folio::db::subscriber::Subscriber::lookup_by_email(&app.state.db, "verified@example.com")
        .await
        .unwrap()
        .unwrap()
        .verification_token
        .unwrap();
    app.get(&format!("/api/newsletter/verify/{token}")).await;
    app.post_form("/api/newsletter/subscribe", "email=pending@example.com").await;

    app.outbox.lock().unwrap().clear();
    let response = app.post(&format!("/admin/posts/{id}/publish")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "published");
    assert_eq!(body["reading_time"], 2);

    let outbox = app.outbox.lock().unwrap();
    assert_eq!(outbox.len(), 1);
    assert!(outbox[0].subject.starts_with("New article:"));
    assert_eq!(outbox[0].to, vec!["verified@example.com".to_string()]);

    // Draft is now publicly readable.
    drop(outbox);
    assert_eq!(app.get("/api/blog/launch").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn republishing_keeps_the_original_publication_date() {
    let app = spawn_app().await;
    let id = seed_draft(&app).await;

    let first = json_body(app.post(&format!("/admin/posts/{id}/publish")).await).await;
    let second = json_body(app.post(&format!("/admin/posts/{id}/publish")).await).await;
    assert_eq!(first["published_at"], second["published_at"]);
}

#[tokio::test]
async fn counter_reset_is_the_only_non_monotonic_write() {
    let app = spawn_app().await;
    let id = Project::create(
        &app.state.db,
        &UpdateProject {
            slug: "site".into(),
            title: "Site".into(),
            category: "web_app".into(),
            description: "A site".into(),
            technologies: "".into(),
            tags: "".into(),
            github_url: None,
            live_url: None,
            status: Project::COMPLETED.into(),
            featured: true,
            sort_order: 0,
        },
    )
    .await
    .unwrap();

    app.get("/api/projects/site").await;
    app.post("/api/projects/site/like").await;

    let response = app.post(&format!("/admin/projects/{id}/reset-counters")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["views"], 0);
    assert_eq!(body["likes"], 0);
}

#[tokio::test]
async fn home_aggregates_sections_and_stats() {
    let app = spawn_app().await;
    Project::create(
        &app.state.db,
        &UpdateProject {
            slug: "site".into(),
            title: "Site".into(),
            category: "web_app".into(),
            description: "A site".into(),
            technologies: "".into(),
            tags: "".into(),
            github_url: None,
            live_url: None,
            status: Project::COMPLETED.into(),
            featured: true,
            sort_order: 0,
        },
    )
    .await
    .unwrap();
    Skill::create(
        &app.state.db,
        &UpdateSkill {
            name: "Rust".into(),
            category: "backend".into(),
            proficiency: 90,
            sort_order: 0,
            featured: true,
        },
    )
    .await
    .unwrap();

    let body = json_body(app.get("/api/home").await).await;
    assert_eq!(body["featured_projects"].as_array().unwrap().len(), 1);
    assert_eq!(body["skills"][0]["name"], "Rust");
    assert_eq!(body["stats"]["total_projects"], 1);
    assert_eq!(body["site_settings"]["site_name"], "Portfolio");
}

#[tokio::test]
async fn settings_updates_invalidate_the_cached_read() {
    let app = spawn_app().await;

    // Prime the cache.
    let body = json_body(app.get("/api/home").await).await;
    assert_eq!(body["site_settings"]["site_name"], "Portfolio");

    let form = "site_name=Renamed&tagline=t&description=d&email=e@example.com&location=l&\
                enable_blog=true&enable_newsletter=true&enable_testimonials=true&\
                maintenance_mode=false&available_for_work=true&footer_text=f";
    let response = app.post_form("/admin/settings", form).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(app.get("/api/home").await).await;
    assert_eq!(body["site_settings"]["site_name"], "Renamed");
}

#[tokio::test]
async fn search_spans_projects_and_posts() {
    let app = spawn_app().await;
    Project::create(
        &app.state.db,
        &UpdateProject {
            slug: "rusty".into(),
            title: "Rusty Tracker".into(),
            category: "web_app".into(),
            description: "Issue tracking".into(),
            technologies: "rust".into(),
            tags: "rust".into(),
            github_url: None,
            live_url: None,
            status: Project::COMPLETED.into(),
            featured: false,
            sort_order: 0,
        },
    )
    .await
    .unwrap();
    let post = seed_draft(&app).await;
    app.post(&format!("/admin/posts/{post}/publish")).await;

    let body = json_body(app.get("/api/search?q=rust").await).await;
    assert_eq!(body["total_results"], 1);
    assert_eq!(body["projects"][0]["slug"], "rusty");

    let body = json_body(app.get("/api/search?q=").await).await;
    assert_eq!(body["total_results"], 0);
}
