use std::sync::{Arc, Mutex};

use lettre::message::Mailbox;

use crate::utils::config::Config;
use crate::utils::emailer::Emailer;

/// An engagement event worth telling someone about.
///
/// Dispatch is strictly best-effort: rendering or delivery failures are
/// logged and swallowed so the request that raised the event always
/// completes with its primary outcome.
#[derive(Debug, Clone)]
pub enum Event {
    /// A contact message was stored; goes to the admin.
    ContactReceived {
        name: String,
        email: String,
        phone: Option<String>,
        subject: String,
        message: String,
        budget: Option<String>,
        timeline: Option<String>,
    },
    /// Confirmation back to whoever sent the contact message.
    ContactConfirmation { name: String, email: String },
    /// A comment was stored (approved or held); goes to the admin.
    CommentSubmitted {
        post_title: String,
        post_slug: String,
        name: String,
        email: String,
        content: String,
        approved: bool,
    },
    /// A reply landed under an approved comment; goes to the parent commenter.
    CommentReply { post_title: String, post_slug: String, replier: String, content: String, recipient: String },
    /// A project view counter hit a milestone exactly; goes to the admin.
    ViewMilestone { title: String, slug: String, milestone: i64, likes: i64 },
    /// Welcome + verification link for a new or reactivated subscriber.
    SubscriptionWelcome { email: String, name: Option<String>, token: String },
    /// A post went live; bcc'd to every active, verified subscriber.
    PostPublished { title: String, slug: String, excerpt: String, reading_time: i64, recipients: Vec<String> },
}

/// A rendered, outbound notification as the sink saw it.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Captured deliveries from a [`Notifier::memory`] sink.
pub type Outbox = Arc<Mutex<Vec<Delivery>>>;

enum Sink {
    Smtp(Emailer),
    /// No SMTP configured: log the rendered notification and move on.
    Log,
    /// Record deliveries in memory; used by tests.
    Memory(Outbox),
}

/// Renders events into messages and hands them to the configured sink.
pub struct Notifier {
    sink: Sink,
    admin: Mailbox,
    base_url: String,
    site_name: String,
}

impl Notifier {
    pub fn smtp(emailer: Emailer, config: &Config) -> Self {
        Self::new(Sink::Smtp(emailer), config)
    }

    pub fn log(config: &Config) -> Self {
        Self::new(Sink::Log, config)
    }

    pub fn memory(config: &Config) -> (Self, Outbox) {
        let outbox: Outbox = Default::default();
        (Self::new(Sink::Memory(outbox.clone()), config), outbox)
    }

    fn new(sink: Sink, config: &Config) -> Self {
        Self {
            sink,
            admin: config.app.admin_email.clone(),
            base_url: config.app.url.clone(),
            site_name: config.app.domain.clone(),
        }
    }

    /// Render and deliver, swallowing every failure.
    pub async fn dispatch(&self, event: Event) {
        let delivery = self.render(&event);
        if delivery.to.is_empty() {
            return;
        }
        if let Err(e) = self.deliver(&delivery).await {
            tracing::warn!("notification dropped: {e:#}");
        }
    }

    async fn deliver(&self, delivery: &Delivery) -> anyhow::Result<()> {
        match &self.sink {
            Sink::Smtp(emailer) => {
                let mut builder = emailer.builder().subject(&delivery.subject);
                // Single recipient goes in To; broadcasts are bcc'd.
                if let [only] = delivery.to.as_slice() {
                    builder = builder.to(only.parse::<Mailbox>()?);
                } else {
                    builder = builder.to(self.admin.clone());
                    for recipient in &delivery.to {
                        match recipient.parse::<Mailbox>() {
                            Ok(mailbox) => builder = builder.bcc(mailbox),
                            Err(e) => tracing::warn!("skipping bad recipient {recipient}: {e}"),
                        }
                    }
                }
                let message = builder.body(delivery.body.clone())?;
                emailer.send(message).await
            }
            Sink::Log => {
                tracing::info!(to = ?delivery.to, subject = %delivery.subject, "notification (no smtp configured)");
                Ok(())
            }
            Sink::Memory(outbox) => {
                outbox.lock().unwrap().push(delivery.clone());
                Ok(())
            }
        }
    }

    fn render(&self, event: &Event) -> Delivery {
        let admin = self.admin.email.to_string();
        let base = &self.base_url;
        let site = &self.site_name;
        match event {
            Event::ContactReceived { name, email, phone, subject, message, budget, timeline } => Delivery {
                to: vec![admin],
                subject: format!("New Contact: {subject}"),
                body: format!(
                    "New contact message received\n\n\
                     From: {name}\n\
                     Email: {email}\n\
                     Phone: {}\n\n\
                     {message}\n\n\
                     Budget: {}\n\
                     Timeline: {}\n",
                    phone.as_deref().unwrap_or("not provided"),
                    budget.as_deref().unwrap_or("not specified"),
                    timeline.as_deref().unwrap_or("not specified"),
                ),
            },
            Event::ContactConfirmation { name, email } => Delivery {
                to: vec![email.clone()],
                subject: format!("Thank you for contacting {site}"),
                body: format!(
                    "Hi {name},\n\n\
                     Thanks for reaching out! Your message has been received\n\
                     and I'll get back to you as soon as I can.\n"
                ),
            },
            Event::CommentSubmitted { post_title, post_slug, name, email, content, approved } => Delivery {
                to: vec![admin],
                subject: format!("New comment on '{post_title}'"),
                body: format!(
                    "New comment from {name} ({email}):\n\n\
                     {content}\n\n\
                     {}\n\n\
                     View: {base}/api/blog/{post_slug}\n",
                    if *approved { "Approved automatically" } else { "Pending approval" },
                ),
            },
            Event::CommentReply { post_title, post_slug, replier, content, recipient } => Delivery {
                to: vec![recipient.clone()],
                subject: format!("Reply to your comment on '{post_title}'"),
                body: format!(
                    "{replier} replied to your comment on \"{post_title}\":\n\n\
                     {content}\n\n\
                     View the conversation: {base}/api/blog/{post_slug}\n"
                ),
            },
            Event::ViewMilestone { title, slug, milestone, likes } => Delivery {
                to: vec![admin],
                subject: format!("Milestone: {title} reached {milestone} views"),
                body: format!(
                    "\"{title}\" has reached {milestone} views.\n\n\
                     Total likes: {likes}\n\
                     View: {base}/api/projects/{slug}\n"
                ),
            },
            Event::SubscriptionWelcome { email, name, token } => Delivery {
                to: vec![email.clone()],
                subject: format!("Welcome to the {site} newsletter"),
                body: format!(
                    "Hi {},\n\n\
                     Thanks for subscribing! Please verify your email address\n\
                     to activate your subscription:\n\n\
                     {base}/api/newsletter/verify/{token}\n\n\
                     To unsubscribe: {base}/api/newsletter/unsubscribe/{email}\n",
                    name.as_deref().unwrap_or("there"),
                ),
            },
            Event::PostPublished { title, slug, excerpt, reading_time, recipients } => Delivery {
                to: recipients.clone(),
                subject: format!("New article: {title}"),
                body: format!(
                    "{title}\n\n\
                     {excerpt}\n\n\
                     Reading time: {reading_time} minutes\n\
                     Read the full article: {base}/api/blog/{slug}\n"
                ),
            },
        }
    }
}
