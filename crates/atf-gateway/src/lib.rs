//! Availability gateway.
//!
//! Fetches and updates ATF records from the external data API. Every call
//! carries the request's correlation id so the API's logs can be joined
//! with ours, and every failure is logged here with the facility id and
//! then collapsed into the opaque [`AtfOperationError`] — callers only see
//! that the operation failed, never why.
//!
//! Reads and writes may use different base URLs (read replicas in some
//! deployments), hence the twin `read`/`write` settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use atf_core::{
    AuthorisedTestingFacility, Availability, CORRELATION_HEADER, CorrelationId, TokenPayload,
    now_iso_millis,
};

/// Any failure talking to the external data API. Detail is intentionally
/// not carried past this boundary; the underlying error is logged at the
/// point of detection.
#[derive(Debug, Error)]
#[error("ATF operation failed")]
pub struct AtfOperationError;

/// Configuration for the data API client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL for reads.
    pub read_base_url: String,
    /// Base URL for writes.
    pub write_base_url: String,
    /// Table holding the ATF records.
    pub table_name: String,
    /// Fixed timeout applied to every outbound call.
    pub request_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            read_base_url: String::new(),
            write_base_url: String::new(),
            table_name: String::new(),
            request_timeout_ms: 10_000,
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.read_base_url.is_empty() {
            return Err("gateway.read_base_url must not be empty".into());
        }
        if self.write_base_url.is_empty() {
            return Err("gateway.write_base_url must not be empty".into());
        }
        if self.table_name.is_empty() {
            return Err("gateway.table_name must not be empty".into());
        }
        if self.request_timeout_ms == 0 {
            return Err("gateway.request_timeout_ms must be > 0".into());
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Builds the availability value written for a facility. Pure construction:
/// the window dates come verbatim from the token payload and `lastUpdated`
/// is stamped with the current instant at call time.
pub fn set_availability(
    payload: &TokenPayload,
    is_available: bool,
) -> Result<Availability, AtfOperationError> {
    let last_updated = now_iso_millis().map_err(|e| {
        tracing::warn!(atf_id = %payload.atf_id, error = %e, "failed to stamp lastUpdated");
        AtfOperationError
    })?;

    Ok(Availability {
        is_available,
        start_date: payload.start_date.clone(),
        end_date: payload.end_date.clone(),
        last_updated,
    })
}

pub struct AvailabilityGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl AvailabilityGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client, config })
    }

    /// Fetches one facility record by id.
    pub async fn get_atf(
        &self,
        correlation_id: &CorrelationId,
        id: &str,
    ) -> Result<AuthorisedTestingFacility, AtfOperationError> {
        tracing::info!(%correlation_id, atf_id = id, "retrieving ATF details");

        let url = format!(
            "{}/{}/{id}?keyName=id",
            self.config.read_base_url, self.config.table_name
        );

        let result = async {
            self.client
                .get(&url)
                .header(CORRELATION_HEADER, correlation_id.as_str())
                .send()
                .await?
                .error_for_status()?
                .json::<AuthorisedTestingFacility>()
                .await
        }
        .await;

        result.map_err(|e| {
            tracing::warn!(%correlation_id, atf_id = id, error = %e, "failed to retrieve ATF details");
            AtfOperationError
        })
    }

    /// Replaces the facility's availability subdocument and returns the
    /// updated record.
    pub async fn update_atf_availability(
        &self,
        correlation_id: &CorrelationId,
        payload: &TokenPayload,
        is_available: bool,
    ) -> Result<AuthorisedTestingFacility, AtfOperationError> {
        let availability = set_availability(payload, is_available)?;

        tracing::info!(
            %correlation_id,
            atf_id = %payload.atf_id,
            is_available,
            "updating ATF availability"
        );

        let url = format!(
            "{}/{}/{}?keyName=id",
            self.config.write_base_url, self.config.table_name, payload.atf_id
        );

        let result = async {
            self.client
                .put(&url)
                .header(CORRELATION_HEADER, correlation_id.as_str())
                .json(&serde_json::json!({ "availability": availability }))
                .send()
                .await?
                .error_for_status()?
                .json::<AuthorisedTestingFacility>()
                .await
        }
        .await;

        result.map_err(|e| {
            tracing::warn!(
                %correlation_id,
                atf_id = %payload.atf_id,
                error = %e,
                "failed to update ATF availability"
            );
            AtfOperationError
        })
    }
}
