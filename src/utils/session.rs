use axum_extra::extract::cookie::{Cookie, CookieJar};

/// Cookie holding project ids this session has liked.
pub const LIKED_PROJECTS: &str = "liked_projects";
/// Cookie holding blog post ids this session has liked.
pub const LIKED_POSTS: &str = "liked_posts";

/// Session-scoped set of content ids the visitor has already liked,
/// carried in a cookie as a comma-separated id list. Nothing is persisted
/// server-side; the ledger lives and dies with the session cookie.
#[derive(Debug, Default)]
pub struct LikeLedger {
    ids: Vec<i64>,
}

impl LikeLedger {
    pub fn from_jar(jar: &CookieJar, name: &str) -> Self {
        let ids = jar
            .get(name)
            .map(|cookie| cookie.value().split(',').filter_map(|id| id.parse().ok()).collect())
            .unwrap_or_default();
        Self { ids }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn with(mut self, id: i64) -> Self {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
        self
    }

    pub fn into_cookie(self, name: &'static str) -> Cookie<'static> {
        let value = self.ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
        Cookie::build((name, value))
            .http_only(true)
            .same_site(cookie::SameSite::Lax)
            .path("/")
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_cookie_value() {
        let ledger = LikeLedger::default().with(3).with(14).with(3);
        let cookie = ledger.into_cookie(LIKED_PROJECTS);
        assert_eq!(cookie.value(), "3,14");

        let jar = CookieJar::new().add(cookie);
        let ledger = LikeLedger::from_jar(&jar, LIKED_PROJECTS);
        assert!(ledger.contains(3));
        assert!(ledger.contains(14));
        assert!(!ledger.contains(5));
    }

    #[test]
    fn garbage_values_parse_to_empty() {
        let jar = CookieJar::new().add(Cookie::new(LIKED_POSTS, "a,b,"));
        let ledger = LikeLedger::from_jar(&jar, LIKED_POSTS);
        assert!(!ledger.contains(0));
    }
}
