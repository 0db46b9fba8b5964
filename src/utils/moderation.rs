use std::sync::Arc;

/// Policy deciding whether a commenter's email is trusted enough to skip
/// the moderation queue. Injected so it can be swapped or tested without
/// touching the submission flow.
pub type TrustPolicy = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// The default policy: trust senders whose email domain is on the allowlist.
pub fn domain_allowlist(domains: Vec<String>) -> TrustPolicy {
    Arc::new(move |email: &str| {
        email
            .rsplit_once('@')
            .map(|(_, domain)| domains.iter().any(|d| d.eq_ignore_ascii_case(domain)))
            .unwrap_or(false)
    })
}

/// A comment starts out approved if it comes from the post author or from a
/// trusted sender; everything else waits for an explicit admin approve.
pub fn decide_initial_approval(
    comment_email: &str,
    author_email: Option<&str>,
    policy: &TrustPolicy,
) -> bool {
    if let Some(author) = author_email {
        if comment_email.eq_ignore_ascii_case(author) {
            return true;
        }
    }
    policy(comment_email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_email_is_always_trusted() {
        let policy = domain_allowlist(vec![]);
        assert!(decide_initial_approval("me@site.com", Some("me@site.com"), &policy));
        assert!(decide_initial_approval("ME@SITE.COM", Some("me@site.com"), &policy));
        assert!(!decide_initial_approval("other@site.com", Some("me@site.com"), &policy));
    }

    #[test]
    fn allowlisted_domains_skip_moderation() {
        let policy = domain_allowlist(vec!["trusted.dev".into()]);
        assert!(decide_initial_approval("anyone@trusted.dev", None, &policy));
        assert!(!decide_initial_approval("anyone@elsewhere.dev", None, &policy));
        assert!(!decide_initial_approval("no-at-sign", None, &policy));
    }

    #[test]
    fn policies_are_swappable() {
        let deny_all: TrustPolicy = Arc::new(|_| false);
        assert!(!decide_initial_approval("anyone@trusted.dev", None, &deny_all));
    }
}
