//! HTTP server for the ATF availability-confirmation service.
//!
//! Authorised Testing Facilities receive an emailed link carrying a signed
//! token; this server verifies the token, lets the facility confirm whether
//! it can take more MOT bookings, and writes the answer through the
//! external data API.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod templates;
pub mod viewhelpers;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use atf_gateway::AvailabilityGateway;
use atf_token::TokenService;

pub use config::AppConfig;

/// Shared per-request dependencies. Both components are internally just a
/// `reqwest::Client` plus config, so the state is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub gateway: Arc<AvailabilityGateway>,
    /// Embeds error detail in failure pages.
    pub development: bool,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self, String> {
        let tokens = TokenService::from_config(&config.token)
            .map_err(|e| format!("failed to build token service: {e}"))?;
        let gateway = AvailabilityGateway::new(config.gateway.clone())
            .map_err(|e| format!("failed to build availability gateway: {e}"))?;
        Ok(Self {
            tokens: Arc::new(tokens),
            gateway: Arc::new(gateway),
            development: config.development,
        })
    }
}

/// Builds the application router with all routes and middleware attached.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/update", get(handlers::update_availability))
        .route(
            "/confirm",
            get(handlers::confirm_availability).post(handlers::confirm_choice),
        )
        .route("/reissue-token", get(handlers::reissue_token))
        .route("/expired-token", get(handlers::expired_token))
        .route("/privacy", get(handlers::privacy))
        .route("/accessibility", get(handlers::accessibility))
        .route("/healthz", get(handlers::healthz))
        .fallback(handlers::not_found)
        .layer(axum::middleware::from_fn(middleware::correlation_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
