use crate::db::settings::SiteSettings;
use crate::prelude::*;
use crate::utils::cache::ReadCache;
use crate::utils::emailer::Emailer;
use crate::utils::guard::Guard;
use crate::utils::moderation::{self, TrustPolicy};
use crate::utils::notify::Notifier;

mod admin;
mod blog;
mod contact;
mod home;
mod newsletter;
mod projects;
mod search;

pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub guard: Guard,
    pub trust: TrustPolicy,
    pub notifier: Notifier,
    pub cache: ReadCache,
}

pub async fn build(config: Config) -> Result<axum::Router<()>> {
    let db = crate::db::init(&config.db).await?;
    SiteSettings::init(&db).await?;

    let notifier = match &config.email {
        Some(email) => Notifier::smtp(Emailer::connect(email)?, &config),
        None => {
            tracing::warn!("no [email] config; notifications will only be logged");
            Notifier::log(&config)
        }
    };

    let state = Arc::new(AppState {
        guard: Guard::new(&config.guard),
        trust: moderation::domain_allowlist(config.guard.trusted_domains.clone()),
        cache: ReadCache::new(Duration::from_secs(config.cache.ttl_secs)),
        notifier,
        db,
        config,
    });

    Ok(router(state))
}

/// Assemble the full router for the given state. Split out from [`build`]
/// so tests can drive the app over an in-memory database.
pub fn router(state: SharedAppState) -> axum::Router<()> {
    // Register business logic routes
    let r = AppRouter::new(&state);
    let r = home::add_routes(r);
    let r = projects::add_routes(r);
    let r = blog::add_routes(r);
    let r = contact::add_routes(r);
    let r = newsletter::add_routes(r);
    let r = search::add_routes(r);
    let r = admin::add_routes(r);
    let (r, state) = r.finish();

    let r = r.fallback(|| async { AppError::NotFound });

    // Register middleware
    let r = crate::utils::tracing::add_middleware(r);
    r.with_state(state)
}
