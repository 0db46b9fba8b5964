use chrono::Duration as ChronoDuration;
use regex::Regex;

use crate::db::comment::BlogComment;
use crate::db::contact::ContactMessage;
use crate::db::Db;
use crate::utils::config::GuardConfig;
use crate::utils::error::AppResult;

/// Submissions of one kind allowed per IP within the trailing window.
const RATE_LIMIT_MAX: i64 = 3;
const RATE_LIMIT_WINDOW_SECS: i64 = 3600;

/// Why a submission was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The hidden form field was filled in. Callers answer as if the
    /// submission succeeded so bots learn nothing.
    Honeypot,
    RateLimited,
    Invalid { field: &'static str, reason: &'static str },
    /// Matched a spam pattern. Also answered as success, like Honeypot.
    Spam,
}

#[derive(Debug)]
pub enum Verdict {
    Admit,
    Reject(Rejection),
}

/// A contact form submission, as seen by the guard.
pub struct ContactSubmission<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub subject: &'a str,
    pub message: &'a str,
    /// The hidden honeypot field.
    pub website: &'a str,
}

/// A comment submission, as seen by the guard.
pub struct CommentSubmission<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub content: &'a str,
}

/// Evaluates inbound mutations against rate-limit and spam rules before
/// anything is persisted. Reads the store for rate-limit counts but never
/// mutates it.
pub struct Guard {
    disposable_domains: Vec<String>,
    spam_patterns: Vec<Regex>,
    name_pattern: Regex,
    email_pattern: Regex,
}

impl Guard {
    pub fn new(config: &GuardConfig) -> Self {
        let spam_patterns = ["(?i)viagra|cialis|pharmacy", "(?i)click here|buy now", "(?i)winner|congratulations.*prize"]
            .iter()
            .map(|p| Regex::new(p).unwrap())
            .collect();
        Self {
            disposable_domains: config.disposable_domains.clone(),
            spam_patterns,
            name_pattern: Regex::new(r"^[a-zA-Z\s\-'.]+$").unwrap(),
            email_pattern: Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap(),
        }
    }

    pub async fn admit_contact(
        &self,
        db: &Db,
        ip: Option<&str>,
        sub: &ContactSubmission<'_>,
    ) -> AppResult<Verdict> {
        if !sub.website.trim().is_empty() {
            tracing::warn!(ip, "honeypot tripped on contact form");
            return Ok(Verdict::Reject(Rejection::Honeypot));
        }
        if let Some(rejection) = self
            .check_name(sub.name)
            .or_else(|| self.check_email(sub.email, true))
            .or_else(|| check_subject(sub.subject))
            .or_else(|| self.check_message(sub.message))
        {
            return Ok(Verdict::Reject(rejection));
        }
        if let Some(ip) = ip {
            let cutoff = rate_limit_cutoff();
            if ContactMessage::count_recent_from_ip(db, ip, cutoff).await? >= RATE_LIMIT_MAX {
                tracing::warn!(ip, "contact form rate limit hit");
                return Ok(Verdict::Reject(Rejection::RateLimited));
            }
        }
        Ok(Verdict::Admit)
    }

    pub async fn admit_comment(
        &self,
        db: &Db,
        ip: Option<&str>,
        sub: &CommentSubmission<'_>,
    ) -> AppResult<Verdict> {
        if let Some(rejection) = self
            .check_name(sub.name)
            .or_else(|| self.check_email(sub.email, false))
            .or_else(|| check_comment_content(sub.content))
        {
            return Ok(Verdict::Reject(rejection));
        }
        if let Some(ip) = ip {
            let cutoff = rate_limit_cutoff();
            if BlogComment::count_recent_from_ip(db, ip, cutoff).await? >= RATE_LIMIT_MAX {
                tracing::warn!(ip, "comment rate limit hit");
                return Ok(Verdict::Reject(Rejection::RateLimited));
            }
        }
        Ok(Verdict::Admit)
    }

    /// Format check for newsletter signups; no denylist, duplicates are
    /// handled by the unique email constraint instead.
    pub fn check_subscriber_email(&self, email: &str) -> Option<Rejection> {
        self.check_email(email, false)
    }

    fn check_name(&self, name: &str) -> Option<Rejection> {
        let name = name.trim();
        if name.chars().count() < 2 {
            return Some(Rejection::Invalid { field: "name", reason: "Please enter your full name." });
        }
        if !self.name_pattern.is_match(name) {
            return Some(Rejection::Invalid { field: "name", reason: "Name contains invalid characters." });
        }
        None
    }

    fn check_email(&self, email: &str, deny_disposable: bool) -> Option<Rejection> {
        let email = email.trim().to_lowercase();
        if !self.email_pattern.is_match(&email) {
            return Some(Rejection::Invalid { field: "email", reason: "Please enter a valid email address." });
        }
        if deny_disposable {
            let domain = email.rsplit_once('@').map(|(_, d)| d).unwrap_or("");
            if self.disposable_domains.iter().any(|d| d == domain) {
                return Some(Rejection::Invalid {
                    field: "email",
                    reason: "Please use a permanent email address.",
                });
            }
        }
        None
    }

    fn check_message(&self, message: &str) -> Option<Rejection> {
        let message = message.trim();
        let len = message.chars().count();
        if len < 10 {
            return Some(Rejection::Invalid {
                field: "message",
                reason: "Please provide more details (at least 10 characters).",
            });
        }
        if len > 2000 {
            return Some(Rejection::Invalid {
                field: "message",
                reason: "Message is too long (maximum 2000 characters).",
            });
        }
        if self.spam_patterns.iter().any(|p| p.is_match(message)) {
            tracing::warn!("spam pattern matched in contact message");
            return Some(Rejection::Spam);
        }
        None
    }
}

fn check_subject(subject: &str) -> Option<Rejection> {
    if subject.trim().is_empty() {
        return Some(Rejection::Invalid { field: "subject", reason: "Please enter a subject." });
    }
    None
}

fn check_comment_content(content: &str) -> Option<Rejection> {
    let len = content.trim().chars().count();
    if len < 5 {
        return Some(Rejection::Invalid {
            field: "content",
            reason: "Comment must be at least 5 characters long.",
        });
    }
    if len > 1000 {
        return Some(Rejection::Invalid {
            field: "content",
            reason: "Comment is too long (maximum 1000 characters).",
        });
    }
    None
}

fn rate_limit_cutoff() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc() - ChronoDuration::seconds(RATE_LIMIT_WINDOW_SECS)
}
