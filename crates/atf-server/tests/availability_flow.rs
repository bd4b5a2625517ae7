//! End-to-end tests for the availability-confirmation flow.
//!
//! Each test runs the real router on a local listener, with the external
//! data API and the token-issuing service stubbed by wiremock. Redirects
//! are not followed so the 302 outcomes can be asserted directly.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use atf_core::CORRELATION_HEADER;
use atf_gateway::{AvailabilityGateway, GatewayConfig};
use atf_server::{AppState, build_app};
use atf_token::{EnvSecretProvider, TokenService};

const SECRET: &str = "secret";
const ATF_ID: &str = "4321";
const START_DATE: i64 = 1_601_994_105; // 2020-10-06T14:21:45Z
const END_DATE: i64 = 1_604_413_305; // 2020-11-03T14:21:45Z
const FUTURE_EXP: i64 = 4_102_444_800; // 2100-01-01
const PAST_EXP: i64 = 946_684_800; // 2000-01-01

struct TestApp {
    addr: String,
    api: MockServer,
    issuer: MockServer,
    client: reqwest::Client,
}

impl TestApp {
    async fn spawn() -> Self {
        let api = MockServer::start().await;
        let issuer = MockServer::start().await;

        let tokens = TokenService::new(
            Arc::new(EnvSecretProvider::new(SECRET)),
            reqwest::Client::new(),
            format!("{}/generate-token", issuer.uri()),
        );
        let gateway = AvailabilityGateway::new(GatewayConfig {
            read_base_url: api.uri(),
            write_base_url: api.uri(),
            table_name: "atf".to_string(),
            request_timeout_ms: 5_000,
        })
        .unwrap();

        let state = AppState {
            tokens: Arc::new(tokens),
            gateway: Arc::new(gateway),
            development: false,
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, build_app(state)).await.unwrap();
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            addr,
            api,
            issuer,
            client,
        }
    }

    async fn get(&self, path_and_query: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path_and_query}", self.addr))
            .send()
            .await
            .unwrap()
    }
}

fn sign(claims: Value) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn claims(exp: i64) -> Value {
    json!({
        "sub": ATF_ID,
        "iss": "https://book-hgv-bus-trailer-mot.service.gov.uk",
        "startDate": START_DATE,
        "endDate": END_DATE,
        "exp": exp,
    })
}

fn atf_body() -> Value {
    json!({
        "id": ATF_ID,
        "name": "Derby Cars Ltd.",
        "email": "garage@example.com",
        "availability": {
            "isAvailable": true,
            "startDate": "2020-10-06T14:21:45.000Z",
            "endDate": "2020-11-03T14:21:45.000Z",
            "lastUpdated": "2020-10-06T15:00:00.000Z"
        }
    })
}

async fn stub_get_atf(api: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/atf/{ATF_ID}")))
        .and(query_param("keyName", "id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(atf_body()))
        .mount(api)
        .await;
}

fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

// === /update ===

#[tokio::test]
async fn update_with_legacy_claim_writes_and_redirects_to_confirm() {
    let app = TestApp::spawn().await;
    let mut token_claims = claims(FUTURE_EXP);
    token_claims["isAvailable"] = json!(true);
    let token = sign(token_claims);

    Mock::given(method("PUT"))
        .and(path(format!("/atf/{ATF_ID}")))
        .and(query_param("keyName", "id"))
        .and(header(CORRELATION_HEADER, "corr-1"))
        .and(body_partial_json(json!({
            "availability": {
                "isAvailable": true,
                "startDate": "2020-10-06T14:21:45.000Z",
                "endDate": "2020-11-03T14:21:45.000Z"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(atf_body()))
        .expect(1)
        .mount(&app.api)
        .await;

    let response = app
        .get(&format!("/update?token={token}&correlationId=corr-1"))
        .await;

    assert_eq!(response.status(), 302);
    assert_eq!(
        location(&response),
        format!("/confirm?token={token}&correlationId=corr-1")
    );
}

#[tokio::test]
async fn update_without_legacy_claim_renders_the_choice_page() {
    let app = TestApp::spawn().await;
    stub_get_atf(&app.api).await;
    let token = sign(claims(FUTURE_EXP));

    let response = app.get(&format!("/update?token={token}")).await;

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Derby Cars Ltd."));
    assert!(body.contains("name=\"availability\""));
    assert!(!body.contains("There is a problem"));
}

#[tokio::test]
async fn expired_token_redirects_into_the_reissue_flow() {
    let app = TestApp::spawn().await;
    let token = sign(claims(PAST_EXP));

    let response = app
        .get(&format!("/update?token={token}&correlationId=corr-1"))
        .await;

    assert_eq!(response.status(), 302);
    assert_eq!(
        location(&response),
        format!("/reissue-token?token={token}&correlationId=corr-1")
    );
    // Nothing was fetched or written.
    assert!(app.api.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_token_renders_not_found_without_touching_the_api() {
    let app = TestApp::spawn().await;
    let token = sign(claims(FUTURE_EXP));
    let tampered = format!("{token}x");

    let response = app.get(&format!("/update?token={tampered}")).await;

    assert_eq!(response.status(), 404);
    assert!(response.text().await.unwrap().contains("Page not found"));
    assert!(app.api.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_token_renders_not_found() {
    let app = TestApp::spawn().await;
    let response = app.get("/update").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn backend_failure_renders_service_unavailable() {
    let app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.api)
        .await;
    let token = sign(claims(FUTURE_EXP));

    let response = app.get(&format!("/update?token={token}")).await;

    assert_eq!(response.status(), 500);
    let body = response.text().await.unwrap();
    assert!(body.contains("Sorry, the service is unavailable"));
    // Production mode never embeds error detail.
    assert!(!body.contains("<code>"));
}

// === /confirm ===

#[tokio::test]
async fn confirm_renders_the_current_availability() {
    let app = TestApp::spawn().await;
    stub_get_atf(&app.api).await;
    let token = sign(claims(FUTURE_EXP));

    let response = app.get(&format!("/confirm?token={token}")).await;

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("You can take more MOT bookings"));
    assert!(body.contains("03 November 2020"));
}

#[tokio::test]
async fn choice_submission_updates_and_redirects() {
    let app = TestApp::spawn().await;
    let token = sign(claims(FUTURE_EXP));

    Mock::given(method("PUT"))
        .and(path(format!("/atf/{ATF_ID}")))
        .and(body_partial_json(
            json!({ "availability": { "isAvailable": false } }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(atf_body()))
        .expect(1)
        .mount(&app.api)
        .await;

    let response = app
        .client
        .post(format!(
            "{}/confirm?token={token}&correlationId=corr-1",
            app.addr
        ))
        .form(&[("availability", "false")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 302);
    assert_eq!(
        location(&response),
        format!("/confirm?token={token}&correlationId=corr-1")
    );
}

#[tokio::test]
async fn choice_submission_without_a_choice_re_renders_with_the_error() {
    let app = TestApp::spawn().await;
    stub_get_atf(&app.api).await;
    let token = sign(claims(FUTURE_EXP));

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.api)
        .await;

    let response = app
        .client
        .post(format!("{}/confirm?token={token}", app.addr))
        .form(&Vec::<(&str, &str)>::new())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("There is a problem"));
    assert!(body.contains("Select yes if you can take more MOT bookings"));
}

// === reissue and expired-token ===

#[tokio::test]
async fn reissue_requests_a_new_token_and_redirects() {
    let app = TestApp::spawn().await;
    let token = sign(claims(PAST_EXP));

    Mock::given(method("POST"))
        .and(path("/generate-token"))
        .and(header(CORRELATION_HEADER, "corr-1"))
        .and(body_json(json!({ "atfId": ATF_ID })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.issuer)
        .await;

    let response = app
        .get(&format!("/reissue-token?token={token}&correlationId=corr-1"))
        .await;

    assert_eq!(response.status(), 302);
    assert_eq!(
        location(&response),
        format!("/expired-token?token={token}&correlationId=corr-1")
    );
}

#[tokio::test]
async fn reissue_redirects_even_when_the_issuer_fails() {
    let app = TestApp::spawn().await;
    let token = sign(claims(PAST_EXP));

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.issuer)
        .await;

    let response = app
        .get(&format!(
            "/reissue-token?token={token}&correlationId=corr-1&retry=true"
        ))
        .await;

    assert_eq!(response.status(), 302);
    assert_eq!(
        location(&response),
        format!("/expired-token?token={token}&correlationId=corr-1&retry=true")
    );
}

#[tokio::test]
async fn expired_token_page_shows_the_facility_email() {
    let app = TestApp::spawn().await;
    stub_get_atf(&app.api).await;
    let token = sign(claims(PAST_EXP));

    let response = app.get(&format!("/expired-token?token={token}")).await;

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("This link has expired"));
    assert!(body.contains("We have emailed a new link"));
    assert!(body.contains("garage@example.com"));
}

#[tokio::test]
async fn expired_token_page_has_a_retry_variant() {
    let app = TestApp::spawn().await;
    stub_get_atf(&app.api).await;
    let token = sign(claims(PAST_EXP));

    let response = app
        .get(&format!("/expired-token?token={token}&retry=true"))
        .await;

    assert_eq!(response.status(), 200);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("We have sent another email")
    );
}

// === correlation id ===

#[tokio::test]
async fn correlation_header_takes_precedence_over_the_query_param() {
    let app = TestApp::spawn().await;
    let token = sign(claims(PAST_EXP));

    let response = app
        .client
        .get(format!(
            "{}/update?token={token}&correlationId=from-query",
            app.addr
        ))
        .header(CORRELATION_HEADER, "from-header")
        .send()
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(CORRELATION_HEADER).unwrap(),
        "from-header"
    );
    assert_eq!(
        location(&response),
        format!("/reissue-token?token={token}&correlationId=from-header")
    );
}

#[tokio::test]
async fn a_correlation_id_is_generated_when_none_is_supplied() {
    let app = TestApp::spawn().await;

    let response = app.get("/healthz").await;

    let correlation_id = response
        .headers()
        .get(CORRELATION_HEADER)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(uuid::Uuid::parse_str(correlation_id).is_ok());
}

// === static routes ===

#[tokio::test]
async fn healthz_reports_ok() {
    let app = TestApp::spawn().await;
    let response = app.get("/healthz").await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({ "status": "ok" })
    );
}

#[tokio::test]
async fn content_pages_render() {
    let app = TestApp::spawn().await;
    let privacy = app.get("/privacy").await;
    assert_eq!(privacy.status(), 200);
    assert!(privacy.text().await.unwrap().contains("Privacy notice"));

    let accessibility = app.get("/accessibility").await;
    assert_eq!(accessibility.status(), 200);
}

#[tokio::test]
async fn unknown_routes_render_the_not_found_page() {
    let app = TestApp::spawn().await;
    let response = app.get("/does-not-exist").await;
    assert_eq!(response.status(), 404);
    assert!(response.text().await.unwrap().contains("Page not found"));
}
