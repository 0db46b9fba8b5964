mod common;

use axum::http::StatusCode;
use folio::db::contact::ContactMessage;

use common::{json_body, spawn_app};

const VALID_FORM: &str = "name=Jo+Smith&email=jo@example.com&subject=Website&\
                          message=Hi+there,+I+need+a+website+built";

#[tokio::test]
async fn valid_submission_is_stored_and_notifies_both_parties() {
    let app = spawn_app().await;

    let response = app.post_form_from("/api/contact", "1.2.3.4", VALID_FORM).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);

    let messages = ContactMessage::list(&app.state.db).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].email, "jo@example.com");
    assert_eq!(messages[0].ip_address.as_deref(), Some("1.2.3.4"));
    assert!(!messages[0].is_read);

    let subjects = app.outbox_subjects();
    assert_eq!(subjects.len(), 2);
    assert!(subjects[0].starts_with("New Contact:"));
    assert!(subjects[1].starts_with("Thank you for contacting"));
}

#[tokio::test]
async fn fourth_submission_within_the_hour_is_rate_limited() {
    let app = spawn_app().await;

    for _ in 0..3 {
        let response = app.post_form_from("/api/contact", "9.9.9.9", VALID_FORM).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app.post_form_from("/api/contact", "9.9.9.9", VALID_FORM).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // A different IP is unaffected.
    let response = app.post_form_from("/api/contact", "8.8.8.8", VALID_FORM).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(ContactMessage::list(&app.state.db).await.unwrap().len(), 4);
}

#[tokio::test]
async fn honeypot_pretends_success_but_stores_nothing() {
    let app = spawn_app().await;

    let body = format!("{VALID_FORM}&website=http://spam.example");
    let response = app.post_form_from("/api/contact", "1.2.3.4", &body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["success"], true);

    assert!(ContactMessage::list(&app.state.db).await.unwrap().is_empty());
    assert!(app.outbox_subjects().is_empty());
}

#[tokio::test]
async fn spam_patterns_pretend_success_but_store_nothing() {
    let app = spawn_app().await;

    let body = "name=Jo+Smith&email=jo@example.com&subject=Deal&\
                message=Click+here+to+buy+now,+best+pharmacy+prices";
    let response = app.post_form_from("/api/contact", "1.2.3.4", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["success"], true);

    assert!(ContactMessage::list(&app.state.db).await.unwrap().is_empty());
}

#[tokio::test]
async fn disposable_email_domain_is_refused() {
    let app = spawn_app().await;

    let body = "name=Jo&email=jo@tempmail.com&subject=Hello&\
                message=Hi+there,+need+a+website+built";
    let response = app.post_form_from("/api/contact", "1.2.3.4", body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["field"], "email");

    assert!(ContactMessage::list(&app.state.db).await.unwrap().is_empty());
}

#[tokio::test]
async fn field_validation_reports_the_offending_field() {
    let app = spawn_app().await;

    // Single-character name.
    let body = "name=J&email=jo@example.com&subject=Hello&message=Hi+there,+long+enough";
    let response = app.post_form_from("/api/contact", "1.2.3.4", body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["field"], "name");

    // Message below the 10-character floor.
    let body = "name=Jo+Smith&email=jo@example.com&subject=Hello&message=too+short";
    let response = app.post_form_from("/api/contact", "1.2.3.4", body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["field"], "message");

    // Empty subject.
    let body = "name=Jo+Smith&email=jo@example.com&subject=&message=Hi+there,+long+enough";
    let response = app.post_form_from("/api/contact", "1.2.3.4", body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["field"], "subject");
}
