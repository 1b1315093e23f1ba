use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Form;
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{error, instrument, warn};

use super::dto::TwilioInbound;
use super::replies;
use crate::goals;
use crate::meals;
use crate::progress;
use crate::state::AppState;

pub async fn home() -> &'static str {
    "Bot is running!"
}

/// Twilio inbound-message webhook. Always answers 200 with a TwiML body,
/// including on internal errors - Twilio redelivers on anything else.
#[instrument(skip(state, form))]
pub async fn inbound(
    State(state): State<AppState>,
    form: Result<Form<TwilioInbound>, FormRejection>,
) -> impl IntoResponse {
    let message = match form {
        Ok(Form(form)) => match dispatch(&state, &form).await {
            Ok(msg) => msg,
            Err(e) => {
                error!(error = %e, "webhook dispatch failed");
                replies::GENERIC_ERROR.to_string()
            }
        },
        Err(e) => {
            warn!(error = %e, "malformed webhook form");
            replies::GENERIC_ERROR.to_string()
        }
    };
    ([(header::CONTENT_TYPE, "text/xml")], replies::twiml(&message))
}

async fn dispatch(state: &AppState, inbound: &TwilioInbound) -> anyhow::Result<String> {
    let user_id = inbound.from.as_str();
    state.store.register_user(user_id).await?;

    if let Some(url) = inbound.media_url.as_deref() {
        return analyze_and_log(state, user_id, url).await;
    }

    let text = inbound.body.as_deref().unwrap_or("").trim().to_lowercase();
    match text.as_str() {
        "summary" => summary(state, user_id).await,
        "goals" => progress_reply(state, user_id).await,
        "set goals" => Ok(replies::dialogue(
            &goals::service::begin(&state.sessions, user_id).await,
        )),
        "help" => Ok(replies::HELP.into()),
        _ => {
            // A conversation in progress owns every message that is not an
            // explicit command.
            match goals::service::handle_input(
                state.store.as_ref(),
                &state.sessions,
                user_id,
                &text,
            )
            .await
            {
                Some(reply) => Ok(replies::dialogue(&reply)),
                None => Ok(replies::WELCOME.into()),
            }
        }
    }
}

async fn analyze_and_log(
    state: &AppState,
    user_id: &str,
    media_url: &str,
) -> anyhow::Result<String> {
    let (image, content_type) = match fetch_media(state, media_url).await {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "media fetch failed");
            return Ok(replies::analysis_failed("could not download the image"));
        }
    };

    let analysis = match state.vision.analyze(image, &content_type).await {
        Ok(a) => a,
        Err(e) => {
            warn!(error = %e, "image analysis failed");
            return Ok(replies::analysis_failed(&e.to_string()));
        }
    };

    match meals::service::log_meal(state.store.as_ref(), user_id, &analysis, Some(media_url)).await
    {
        Ok(event) => Ok(replies::meal_logged(&event)),
        Err(e) => {
            error!(error = %e, "recording meal failed");
            Ok(replies::MEAL_SAVE_FAILED.into())
        }
    }
}

async fn fetch_media(state: &AppState, url: &str) -> anyhow::Result<(Bytes, String)> {
    let twilio = &state.config.twilio;
    let response = state
        .http
        .get(url)
        .basic_auth(&twilio.account_sid, Some(&twilio.auth_token))
        .send()
        .await?
        .error_for_status()?;
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("image/jpeg")
        .to_string();
    Ok((response.bytes().await?, content_type))
}

async fn summary(state: &AppState, user_id: &str) -> anyhow::Result<String> {
    let today = OffsetDateTime::now_utc().date();
    if !state.store.has_meals(user_id, today).await? {
        return Ok(replies::NO_MEALS_TODAY.into());
    }
    let totals = state.store.daily_totals(user_id, today).await?;
    Ok(replies::daily_summary(&totals))
}

async fn progress_reply(state: &AppState, user_id: &str) -> anyhow::Result<String> {
    let today = OffsetDateTime::now_utc().date();
    let goals = state.store.get_goals(user_id).await?;
    let totals = state.store.daily_totals(user_id, today).await?;
    let has_meals = state.store.has_meals(user_id, today).await?;
    match progress::report(goals.as_ref(), &totals, has_meals) {
        Some(report) => Ok(replies::daily_progress(&report)),
        None => Ok(replies::NO_PROGRESS_DATA.into()),
    }
}
