// ============================================================================
// Access Gate Tests
// ============================================================================
//
// Page requests against a running server:
// - every row of the route / credential decision table
// - cookies that are forged, expired or blank
// - ungated paths pass through
//
// ============================================================================

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use summary_gateway::auth::Claims;

use test_utils::{TEST_SECRET, client, spawn_app};

fn cookie(token: &str) -> String {
    format!("token={}", token)
}

async fn get_page(
    client: &reqwest::Client,
    url: String,
    token: Option<&str>,
) -> reqwest::Response {
    let mut request = client.get(url);
    if let Some(token) = token {
        request = request.header("Cookie", cookie(token));
    }
    request.send().await.unwrap()
}

fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_without_credential() {
    let app = spawn_app().await;
    let client = client();

    let response = get_page(&client, app.url("/"), None).await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), Some("/login"));

    let response = get_page(&client, app.url("/login"), None).await;
    assert_eq!(response.status(), 200);

    let response = get_page(&client, app.url("/summary"), None).await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_with_valid_credential() {
    let app = spawn_app().await;
    let client = client();
    let token = app.login(&client).await;

    let response = get_page(&client, app.url("/"), Some(&token)).await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), Some("/summary"));

    let response = get_page(&client, app.url("/login"), Some(&token)).await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), Some("/summary"));

    let response = get_page(&client, app.url("/summary"), Some(&token)).await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("gpt-4o"));
    assert!(body.contains("claude-3"));
}

#[tokio::test]
async fn test_forged_credential_is_treated_as_absent() {
    let app = spawn_app().await;
    let client = client();

    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: "admin".to_string(),
        jti: "forged".to_string(),
        exp: now + 600,
        iat: now,
        iss: app.config.jwt_issuer.clone(),
    };
    let forged = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"some_other_secret_that_is_long_enough"),
    )
    .unwrap();

    let response = get_page(&client, app.url("/summary"), Some(&forged)).await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), Some("/login"));

    let response = get_page(&client, app.url("/login"), Some(&forged)).await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_expired_credential_is_rejected() {
    let app = spawn_app().await;
    let client = client();

    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: "admin".to_string(),
        jti: "expired".to_string(),
        exp: now - 60,
        iat: now - 3600,
        iss: app.config.jwt_issuer.clone(),
    };
    let expired = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let response = get_page(&client, app.url("/"), Some(&expired)).await;
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_blank_and_garbage_cookies() {
    let app = spawn_app().await;
    let client = client();

    for token in ["", "garbage", "a.b.c"] {
        let response = get_page(&client, app.url("/summary"), Some(token)).await;
        assert_eq!(response.status(), 303, "token {:?}", token);
        assert_eq!(location(&response), Some("/login"));
    }
}

#[tokio::test]
async fn test_ungated_paths_pass_through() {
    let app = spawn_app().await;
    let client = client();

    let response = get_page(&client, app.url("/health"), None).await;
    assert_eq!(response.status(), 200);

    let response = get_page(&client, app.url("/nowhere"), None).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_redirects_carry_security_headers() {
    let app = spawn_app().await;
    let client = client();

    let response = get_page(&client, app.url("/"), None).await;
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
}
