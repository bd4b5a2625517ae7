//! Request handlers for the availability-confirmation flow.
//!
//! Every token-gated handler follows the same shape: resolve the token
//! payload, map failures onto the outcome pages (expired tokens redirect
//! into the reissue flow, invalid tokens render not-found, everything else
//! renders service-unavailable), then drive the data API through the
//! gateway. Redirects are plain 302s and re-carry the token and correlation
//! id as query parameters because redirects drop request headers.

use axum::{
    Form, Json,
    extract::{Extension, Query, State},
    http::{StatusCode, header::LOCATION},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use atf_core::CorrelationId;
use atf_token::TokenError;

use crate::AppState;
use crate::templates;

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
    pub retry: Option<String>,
}

impl TokenQuery {
    fn retry(&self) -> bool {
        self.retry.as_deref() == Some("true")
    }
}

#[derive(Debug, Deserialize)]
pub struct ChoiceForm {
    pub availability: Option<String>,
}

fn redirect(uri: String) -> Response {
    (StatusCode::FOUND, [(LOCATION, uri)]).into_response()
}

/// Builds a same-service URI that carries the token and correlation id
/// through a redirect or form POST. Values are form-urlencoded; the
/// correlation id is client-supplied and may hold reserved characters.
fn build_uri(path: &str, token: &str, correlation_id: &CorrelationId, retry: bool) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("token", token);
    query.append_pair("correlationId", correlation_id.as_str());
    if retry {
        query.append_pair("retry", "true");
    }
    format!("{path}?{}", query.finish())
}

fn not_found_page() -> Response {
    (StatusCode::NOT_FOUND, Html(templates::render_not_found())).into_response()
}

fn service_unavailable_page(state: &AppState, detail: &str) -> Response {
    let detail = state.development.then_some(detail);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(templates::render_service_unavailable(detail)),
    )
        .into_response()
}

/// Maps a token-validation failure onto its outcome: expired tokens are
/// sent into the reissue flow, invalid tokens get the not-found page, and
/// a secret-resolution failure is a server error.
fn token_failure(
    state: &AppState,
    token: &str,
    correlation_id: &CorrelationId,
    err: &TokenError,
) -> Response {
    if err.is_expired() {
        return redirect(build_uri("/reissue-token", token, correlation_id, false));
    }
    if err.is_invalid_token() {
        return not_found_page();
    }
    service_unavailable_page(state, &err.to_string())
}

/// `GET /update` — the entry point from the availability email.
///
/// Tokens issued by the older revision of the email job carry the chosen
/// availability as an `isAvailable` claim; those are applied immediately
/// and redirected to the confirmation. Tokens without the claim land on
/// the choice page instead.
pub async fn update_availability(
    State(state): State<AppState>,
    Extension(correlation_id): Extension<CorrelationId>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let Some(token) = query.token.as_deref() else {
        tracing::warn!(%correlation_id, "update request without token");
        return not_found_page();
    };

    let payload = match state
        .tokens
        .extract_token_payload(&correlation_id, Some(token), false)
        .await
    {
        Ok(payload) => payload,
        Err(e) => return token_failure(&state, token, &correlation_id, &e),
    };

    match payload.is_available {
        Some(is_available) => {
            match state
                .gateway
                .update_atf_availability(&correlation_id, &payload, is_available)
                .await
            {
                Ok(_) => redirect(build_uri("/confirm", token, &correlation_id, false)),
                Err(e) => service_unavailable_page(&state, &e.to_string()),
            }
        }
        None => match state.gateway.get_atf(&correlation_id, &payload.atf_id).await {
            Ok(atf) => {
                let action = build_uri("/confirm", token, &correlation_id, false);
                Html(templates::render_choice_page(&atf, &action, None)).into_response()
            }
            Err(e) => service_unavailable_page(&state, &e.to_string()),
        },
    }
}

/// `GET /confirm` — shows the facility what their availability now is.
pub async fn confirm_availability(
    State(state): State<AppState>,
    Extension(correlation_id): Extension<CorrelationId>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let Some(token) = query.token.as_deref() else {
        tracing::warn!(%correlation_id, "confirm request without token");
        return not_found_page();
    };

    let payload = match state
        .tokens
        .extract_token_payload(&correlation_id, Some(token), false)
        .await
    {
        Ok(payload) => payload,
        Err(e) => return token_failure(&state, token, &correlation_id, &e),
    };

    match state.gateway.get_atf(&correlation_id, &payload.atf_id).await {
        Ok(atf) => {
            let is_available = atf
                .availability
                .as_ref()
                .map(|a| a.is_available)
                .or(payload.is_available)
                .unwrap_or(false);
            Html(templates::render_confirmation(&atf, is_available)).into_response()
        }
        Err(e) => service_unavailable_page(&state, &e.to_string()),
    }
}

/// `POST /confirm` — applies the yes/no choice from the choice page.
///
/// A submission without a choice re-renders the form with the validation
/// error and touches nothing.
pub async fn confirm_choice(
    State(state): State<AppState>,
    Extension(correlation_id): Extension<CorrelationId>,
    Query(query): Query<TokenQuery>,
    Form(form): Form<ChoiceForm>,
) -> Response {
    let Some(token) = query.token.as_deref() else {
        tracing::warn!(%correlation_id, "confirm submission without token");
        return not_found_page();
    };

    let payload = match state
        .tokens
        .extract_token_payload(&correlation_id, Some(token), false)
        .await
    {
        Ok(payload) => payload,
        Err(e) => return token_failure(&state, token, &correlation_id, &e),
    };

    let choice = form
        .availability
        .as_deref()
        .and_then(|v| v.parse::<bool>().ok());

    let Some(is_available) = choice else {
        tracing::info!(%correlation_id, atf_id = %payload.atf_id, "no availability choice submitted");
        return match state.gateway.get_atf(&correlation_id, &payload.atf_id).await {
            Ok(atf) => {
                let action = build_uri("/confirm", token, &correlation_id, false);
                let error = templates::default_choice_error();
                Html(templates::render_choice_page(&atf, &action, Some(&error))).into_response()
            }
            Err(e) => service_unavailable_page(&state, &e.to_string()),
        };
    };

    match state
        .gateway
        .update_atf_availability(&correlation_id, &payload, is_available)
        .await
    {
        Ok(_) => redirect(build_uri("/confirm", token, &correlation_id, false)),
        Err(e) => service_unavailable_page(&state, &e.to_string()),
    }
}

/// `GET /reissue-token` — asks the issuing service for a fresh token and
/// moves on to the expired-token page. Expiry is ignored here: the whole
/// point is that the token has lapsed, but its facility id is still good.
pub async fn reissue_token(
    State(state): State<AppState>,
    Extension(correlation_id): Extension<CorrelationId>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let Some(token) = query.token.as_deref() else {
        tracing::warn!(%correlation_id, "reissue request without token");
        return not_found_page();
    };

    let payload = match state
        .tokens
        .extract_token_payload(&correlation_id, Some(token), true)
        .await
    {
        Ok(payload) => payload,
        Err(e) => return token_failure(&state, token, &correlation_id, &e),
    };

    state.tokens.reissue_token(&correlation_id, &payload.atf_id).await;

    redirect(build_uri(
        "/expired-token",
        token,
        &correlation_id,
        query.retry(),
    ))
}

/// `GET /expired-token` — tells the facility a fresh link is on its way.
pub async fn expired_token(
    State(state): State<AppState>,
    Extension(correlation_id): Extension<CorrelationId>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let Some(token) = query.token.as_deref() else {
        tracing::warn!(%correlation_id, "expired-token request without token");
        return not_found_page();
    };

    let payload = match state
        .tokens
        .extract_token_payload(&correlation_id, Some(token), true)
        .await
    {
        Ok(payload) => payload,
        Err(e) => return token_failure(&state, token, &correlation_id, &e),
    };

    match state.gateway.get_atf(&correlation_id, &payload.atf_id).await {
        Ok(atf) => {
            let reissue_uri = build_uri("/reissue-token", token, &correlation_id, true);
            Html(templates::render_expired_token(&atf, &reissue_uri, query.retry()))
                .into_response()
        }
        Err(e) => service_unavailable_page(&state, &e.to_string()),
    }
}

pub async fn privacy() -> Html<String> {
    Html(templates::render_privacy())
}

pub async fn accessibility() -> Html<String> {
    Html(templates::render_accessibility())
}

pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn not_found() -> Response {
    not_found_page()
}
