use crate::db::subscriber::{SubscribeOutcome, Subscriber};
use crate::prelude::*;
use crate::utils::guard::Rejection;

/// Add all `newsletter` routes to the router.
#[rustfmt::skip]
pub fn add_routes(router: AppRouter) -> AppRouter {
    router.public_routes(|r| {
        r.route("/api/newsletter/subscribe", post(subscribe))
         .route("/api/newsletter/verify/{token}", get(verify))
         .route("/api/newsletter/unsubscribe/{email}", get(unsubscribe))
    })
}

#[derive(Debug, serde::Deserialize)]
struct SubscribeForm {
    email: String,
    name: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct SubscribeQuery {
    source: Option<String>,
}

#[derive(serde::Serialize)]
struct SubscribeResponse {
    success: bool,
    message: &'static str,
}

async fn subscribe(
    State(state): State<SharedAppState>,
    ClientIp(ip): ClientIp,
    Query(query): Query<SubscribeQuery>,
    Form(form): Form<SubscribeForm>,
) -> AppResult<Json<SubscribeResponse>> {
    if let Some(Rejection::Invalid { field, reason }) =
        state.guard.check_subscriber_email(&form.email)
    {
        return Err(AppError::Validation { field, reason: reason.into() });
    }

    let name = form.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let source = query.source.as_deref().unwrap_or("website");

    match Subscriber::subscribe(&state.db, &form.email, name, source, ip.as_deref()).await? {
        SubscribeOutcome::AlreadySubscribed => {
            Ok(Json(SubscribeResponse { success: false, message: "You are already subscribed!" }))
        }
        SubscribeOutcome::Subscribed(subscriber) => {
            if let Some(token) = &subscriber.verification_token {
                state
                    .notifier
                    .dispatch(Event::SubscriptionWelcome {
                        email: subscriber.email.clone(),
                        name: subscriber.name.clone(),
                        token: token.clone(),
                    })
                    .await;
            }
            Ok(Json(SubscribeResponse {
                success: true,
                message: "Successfully subscribed! Check your email to verify.",
            }))
        }
    }
}

#[derive(serde::Serialize)]
struct VerifyResponse {
    success: bool,
    message: &'static str,
}

async fn verify(
    State(state): State<SharedAppState>,
    Path(token): Path<String>,
) -> AppResult<Json<VerifyResponse>> {
    // A consumed token is cleared, so a second redemption falls through
    // to NotFound here.
    match Subscriber::verify(&state.db, &token).await? {
        Some(_) => Ok(Json(VerifyResponse {
            success: true,
            message: "Email verified! You're now subscribed to the newsletter.",
        })),
        None => Err(AppError::NotFound),
    }
}

async fn unsubscribe(
    State(state): State<SharedAppState>,
    Path(email): Path<String>,
) -> AppResult<Json<VerifyResponse>> {
    match Subscriber::unsubscribe(&state.db, &email).await? {
        Some(_) => Ok(Json(VerifyResponse {
            success: true,
            message: "You have been unsubscribed.",
        })),
        None => Err(AppError::NotFound),
    }
}
