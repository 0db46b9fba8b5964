use crate::db::contact::{ContactMessage, CreateContactMessage};
use crate::prelude::*;
use crate::utils::guard::{ContactSubmission, Rejection, Verdict};

/// Add all `contact` routes to the router.
pub fn add_routes(router: AppRouter) -> AppRouter {
    router.public_routes(|r| r.route("/api/contact", post(contact_form)))
}

#[derive(Debug, serde::Deserialize)]
struct ContactForm {
    name: String,
    email: String,
    phone: Option<String>,
    subject: String,
    message: String,
    budget: Option<String>,
    timeline: Option<String>,
    /// Honeypot; hidden on the real form, so anything here is a bot.
    #[serde(default)]
    website: String,
}

#[derive(serde::Serialize)]
struct ContactResponse {
    success: bool,
    message: &'static str,
}

const SENT: ContactResponse =
    ContactResponse { success: true, message: "Message sent successfully!" };

async fn contact_form(
    State(state): State<SharedAppState>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
    Form(form): Form<ContactForm>,
) -> AppResult<Json<ContactResponse>> {
    let submission = ContactSubmission {
        name: &form.name,
        email: &form.email,
        subject: &form.subject,
        message: &form.message,
        website: &form.website,
    };
    match state.guard.admit_contact(&state.db, ip.as_deref(), &submission).await? {
        // Honeypot and spam hits look exactly like success to the caller;
        // nothing is persisted.
        Verdict::Reject(Rejection::Honeypot | Rejection::Spam) => return Ok(Json(SENT)),
        Verdict::Reject(Rejection::RateLimited) => return Err(AppError::RateLimited),
        Verdict::Reject(Rejection::Invalid { field, reason }) => {
            return Err(AppError::Validation { field, reason: reason.into() })
        }
        Verdict::Admit => {}
    }

    let id = ContactMessage::create(
        &state.db,
        &CreateContactMessage {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_lowercase(),
            phone: form.phone.filter(|p| !p.trim().is_empty()),
            subject: form.subject.trim().to_string(),
            message: form.message.trim().to_string(),
            budget: form.budget.filter(|b| !b.trim().is_empty()),
            timeline: form.timeline.filter(|t| !t.trim().is_empty()),
            ip_address: ip,
            user_agent: header_value(&headers, header::USER_AGENT),
            referrer: header_value(&headers, header::REFERER),
        },
    )
    .await?;
    let message = ContactMessage::lookup_by_id(&state.db, id).await?.ok_or(AppError::NotFound)?;

    state
        .notifier
        .dispatch(Event::ContactReceived {
            name: message.name.clone(),
            email: message.email.clone(),
            phone: message.phone.clone(),
            subject: message.subject.clone(),
            message: message.message.clone(),
            budget: message.budget.clone(),
            timeline: message.timeline.clone(),
        })
        .await;
    state
        .notifier
        .dispatch(Event::ContactConfirmation { name: message.name, email: message.email })
        .await;

    Ok(Json(SENT))
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}
