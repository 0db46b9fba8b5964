#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, Response};
use http_body_util::BodyExt as _;
use tower::ServiceExt as _;

use folio::app::{self, AppState};
use folio::db::settings::SiteSettings;
use folio::utils::cache::ReadCache;
use folio::utils::config::{AppConfig, CacheConfig, Config, DbConfig, GuardConfig, NetConfig};
use folio::utils::guard::Guard;
use folio::utils::moderation;
use folio::utils::notify::{Notifier, Outbox};
use folio::utils::types::SharedAppState;

pub struct TestApp {
    pub router: axum::Router,
    pub state: SharedAppState,
    pub outbox: Outbox,
}

pub fn test_config() -> Config {
    Config {
        app: AppConfig {
            domain: "example.com".into(),
            url: "http://example.com".into(),
            admin_email: "Admin <admin@example.com>".parse().unwrap(),
        },
        net: NetConfig { bind_addr: "127.0.0.1:0".parse().unwrap() },
        db: DbConfig { file: ":memory:".into(), seed_data: None },
        email: None,
        guard: GuardConfig {
            trusted_domains: vec!["trusted-domain.com".into()],
            ..GuardConfig::default()
        },
        cache: CacheConfig::default(),
    }
}

/// An app over an in-memory database with a memory notification sink.
pub async fn spawn_app() -> TestApp {
    let config = test_config();
    let db = folio::db::init_memory().await.unwrap();
    SiteSettings::init(&db).await.unwrap();

    let (notifier, outbox) = Notifier::memory(&config);
    let state = Arc::new(AppState {
        guard: Guard::new(&config.guard),
        trust: moderation::domain_allowlist(config.guard.trusted_domains.clone()),
        cache: ReadCache::new(Duration::from_secs(config.cache.ttl_secs)),
        notifier,
        db,
        config,
    });

    TestApp { router: app::router(state.clone()), state, outbox }
}

impl TestApp {
    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.request(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, body: &str) -> Response<Body> {
        self.request(form_request(uri, body, None)).await
    }

    /// POST a form as if it came from `ip`.
    pub async fn post_form_from(&self, uri: &str, ip: &str, body: &str) -> Response<Body> {
        self.request(form_request(uri, body, Some(ip))).await
    }

    pub async fn post(&self, uri: &str) -> Response<Body> {
        self.request(Request::post(uri).body(Body::empty()).unwrap()).await
    }

    /// Subjects of everything dispatched so far.
    pub fn outbox_subjects(&self) -> Vec<String> {
        self.outbox.lock().unwrap().iter().map(|d| d.subject.clone()).collect()
    }
}

fn form_request(uri: &str, body: &str, ip: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(ip) = ip {
        builder = builder.header("x-forwarded-for", ip);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The cookie pair (`name=value`) from a Set-Cookie header, if any.
pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}
