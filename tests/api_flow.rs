//! End-to-end flows through the HTTP router with in-memory storage,
//! a recording email sender and a stubbed provider

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use regex::Regex;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use iptv_gateway::api::create_router_with_state;
use iptv_gateway::build_app_state;
use iptv_gateway::domain::user::UserRepository;
use iptv_gateway::domain::verification::MAX_FAILED_ATTEMPTS;
use iptv_gateway::infrastructure::email::MemoryEmailSender;
use iptv_gateway::infrastructure::storage::StorageFactory;
use iptv_gateway::infrastructure::xtream::{XtreamClient, XtreamClientConfig};
use iptv_gateway::AppConfig;

const API_KEY: &str = "test-gateway-key";

struct TestApp {
    router: Router,
    emails: Arc<MemoryEmailSender>,
    users: Arc<dyn UserRepository>,
    provider: MockServer,
}

impl TestApp {
    async fn start() -> Self {
        let provider = MockServer::start().await;

        let mut config = AppConfig::default();
        config.auth.api_keys = vec![API_KEY.to_string()];
        config.auth.jwt_secret = "integration-test-secret".to_string();

        let emails = Arc::new(MemoryEmailSender::new());
        let upstream = Arc::new(
            XtreamClient::new(XtreamClientConfig {
                timeout: Duration::from_secs(5),
                user_agent: "api-flow-test".to_string(),
            })
            .unwrap(),
        );

        let repositories = StorageFactory::in_memory();
        let users = repositories.users.clone();
        let state = build_app_state(&config, repositories, emails.clone(), upstream);

        Self {
            router: create_router_with_state(state),
            emails,
            users,
            provider,
        }
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-api-key", API_KEY);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, value)
    }

    fn last_code_for(&self, email: &str) -> String {
        let message = self.emails.last_to(email).expect("no email sent");
        let code = Regex::new(r"\b(\d{6})\b").unwrap();

        code.captures(&message.text_body)
            .map(|c| c[1].to_string())
            .expect("no code in email")
    }

    /// Register, verify and return a session token
    async fn signed_in_user(&self, email: &str) -> String {
        let (status, _) = self
            .request(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({ "email": email, "name": "Test User", "password": "correct horse" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let code = self.last_code_for(email);
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/verify",
                None,
                Some(json!({ "email": email, "code": code })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        body["token"].as_str().unwrap().to_string()
    }

    async fn create_profile(&self, token: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/profiles",
                Some(token),
                Some(json!({
                    "name": "Home",
                    "url": format!("{}/", self.provider.uri()),
                    "username": "john",
                    "password": "s3cret"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);

        body["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn health_is_public_and_api_requires_key() {
    let app = TestApp::start().await;

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"email":"a@b.co","password":"x"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_verification_and_login() {
    let app = TestApp::start().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": " Jane@Example.com ", "name": "Jane", "password": "correct horse" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["verification_sent"], true);
    assert_eq!(body["user"]["email"], "jane@example.com");
    assert_eq!(body["user"]["email_verified"], false);
    assert!(body["user"].get("password_hash").is_none());

    // duplicate email
    let (status, _) = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "jane@example.com", "name": "Jane", "password": "correct horse" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // unverified login
    let login = json!({ "email": "jane@example.com", "password": "correct horse" });
    let (status, body) = app
        .request(Method::POST, "/auth/login", None, Some(login.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "email_not_verified");

    let code = app.last_code_for("jane@example.com");
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let (status, _) = app
        .request(
            Method::POST,
            "/auth/verify",
            None,
            Some(json!({ "email": "jane@example.com", "code": wrong })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/verify",
            None,
            Some(json!({ "email": "jane@example.com", "code": code })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email_verified"], true);

    // a code works once
    let (status, _) = app
        .request(
            Method::POST,
            "/auth/verify",
            None,
            Some(json!({ "email": "jane@example.com", "code": code })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "jane@example.com", "password": "wrong password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.request(Method::POST, "/auth/login", None, Some(login)).await;
    assert_eq!(status, StatusCode::OK);

    let token = body["token"].as_str().unwrap();
    let (status, me) = app.request(Method::GET, "/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["name"], "Jane");
}

#[tokio::test]
async fn malformed_json_uses_error_envelope() {
    let app = TestApp::start().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/auth/register")
                .header("x-api-key", API_KEY)
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "json_parse_error");
    assert_eq!(body["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn password_reset_flow() {
    let app = TestApp::start().await;
    app.signed_in_user("reset@example.com").await;

    // unknown emails get the same answer
    let (status, _) = app
        .request(
            Method::POST,
            "/auth/password/forgot",
            None,
            Some(json!({ "email": "nobody@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, _) = app
        .request(
            Method::POST,
            "/auth/password/forgot",
            None,
            Some(json!({ "email": "reset@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let code = app.last_code_for("reset@example.com");
    let (status, _) = app
        .request(
            Method::POST,
            "/auth/password/reset",
            None,
            Some(json!({ "email": "reset@example.com", "code": code, "new_password": "brand new secret" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let notice = app.emails.last_to("reset@example.com").unwrap();
    assert!(notice.subject.to_lowercase().contains("password"));

    let (status, _) = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "reset@example.com", "password": "brand new secret" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn profiles_are_private_to_their_owner() {
    let app = TestApp::start().await;
    let owner = app.signed_in_user("owner@example.com").await;
    let other = app.signed_in_user("other@example.com").await;

    let id = app.create_profile(&owner).await;

    let (status, body) = app
        .request(Method::GET, &format!("/profiles/{}", id), Some(owner.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], app.provider.uri());

    let (status, _) = app
        .request(Method::GET, &format!("/profiles/{}", id), Some(other.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.request(Method::GET, "/profiles", Some(other.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);

    let (status, _) = app.request(Method::GET, "/profiles", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/profiles/{}", id),
            Some(owner.as_str()),
            Some(json!({ "name": "Cabin" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Cabin");
    assert_eq!(body["username"], "john");

    let (status, _) = app
        .request(Method::DELETE, &format!("/profiles/{}", id), Some(owner.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn catalog_listing_and_search() {
    let app = TestApp::start().await;
    let token = app.signed_in_user("viewer@example.com").await;
    let id = app.create_profile(&token).await;

    Mock::given(method("GET"))
        .and(path("/player_api.php"))
        .and(query_param("action", "get_vod_streams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "stream_id": 1, "name": "Zulu News", "added": "1700000300" },
            { "stream_id": 2, "name": "alpha", "added": "1700000100" },
            { "stream_id": 3, "name": "Mike", "added": "1700000200" }
        ])))
        .mount(&app.provider)
        .await;
    Mock::given(method("GET"))
        .and(query_param("action", "get_live_streams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "stream_id": 10, "name": "News 24" }
        ])))
        .mount(&app.provider)
        .await;
    Mock::given(method("GET"))
        .and(query_param("action", "get_series"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&app.provider)
        .await;

    let (status, page) = app
        .request(
            Method::GET,
            &format!("/profiles/{}/vod?sort=name_asc&limit=2", id),
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["items"][0]["name"], "alpha");
    assert_eq!(page["items"][1]["name"], "Mike");

    let (status, page) = app
        .request(
            Method::GET,
            &format!("/profiles/{}/vod?sort=added_desc&page=2&limit=2", id),
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["items"][0]["stream_id"], 2);

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/profiles/{}/vod?limit=0", id),
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, results) = app
        .request(
            Method::GET,
            &format!("/profiles/{}/search?q=news", id),
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results["live"].as_array().unwrap().len(), 1);
    assert_eq!(results["vod"].as_array().unwrap().len(), 1);
    assert!(results["series"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn upstream_failure_is_server_error() {
    let app = TestApp::start().await;
    let token = app.signed_in_user("flaky@example.com").await;
    let id = app.create_profile(&token).await;

    Mock::given(method("GET"))
        .and(query_param("action", "get_live_categories"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&app.provider)
        .await;

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/profiles/{}/live/categories", id),
            Some(token.as_str()),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["type"], "upstream_error");
    assert!(!body.to_string().contains("s3cret"));
}

#[tokio::test]
async fn deleting_account_removes_access() {
    let app = TestApp::start().await;
    let token = app.signed_in_user("leaving@example.com").await;
    app.create_profile(&token).await;

    let (status, _) = app.request(Method::DELETE, "/auth/me", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.request(Method::GET, "/auth/me", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_catalog_query_uses_error_envelope() {
    let app = TestApp::start().await;
    let token = app.signed_in_user("query@example.com").await;
    let id = app.create_profile(&token).await;

    for query in ["sort=bogus", "page=abc", "page=-1"] {
        let (status, body) = app
            .request(
                Method::GET,
                &format!("/profiles/{}/vod?{}", id, query),
                Some(token.as_str()),
                None,
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", query);
        assert_eq!(body["error"]["code"], "query_parse_error", "{}", query);
    }

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/profiles/{}/search?q=news&limit=many", id),
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn suspended_account_gets_no_token_from_verification() {
    let app = TestApp::start().await;

    let (status, _) = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "held@example.com", "name": "Held", "password": "correct horse" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut user = app
        .users
        .get_by_email("held@example.com")
        .await
        .unwrap()
        .unwrap();
    user.suspend();
    app.users.update(&user).await.unwrap();

    let code = app.last_code_for("held@example.com");
    let (status, body) = app
        .request(
            Method::POST,
            "/auth/verify",
            None,
            Some(json!({ "email": "held@example.com", "code": code })),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "account_suspended");
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn repeated_wrong_codes_burn_the_reset_code() {
    let app = TestApp::start().await;
    app.signed_in_user("guess@example.com").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/auth/password/forgot",
            None,
            Some(json!({ "email": "guess@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let code = app.last_code_for("guess@example.com");

    let mut wrong = 0u32;
    let mut guesses = 0;
    while guesses < MAX_FAILED_ATTEMPTS {
        let guess = format!("{:06}", wrong);
        wrong += 1;
        if guess == code {
            continue;
        }

        let (status, _) = app
            .request(
                Method::POST,
                "/auth/password/reset",
                None,
                Some(json!({ "email": "guess@example.com", "code": guess, "new_password": "brand new secret" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        guesses += 1;
    }

    let (status, _) = app
        .request(
            Method::POST,
            "/auth/password/reset",
            None,
            Some(json!({ "email": "guess@example.com", "code": code, "new_password": "brand new secret" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
