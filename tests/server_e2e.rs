//! End-to-end tests: the HTTP server on an ephemeral port, backed by mock
//! upstreams, driven with `reqwest`.

use mdr::config::{AppConfig, ServerConfig};
use mdr::session::{SessionService, SignedSessionService, UserId};
use mdr::{AppState, SearchServer};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "e2e-secret";

fn ddg_page() -> String {
    let blocks: String = (0..3)
        .map(|i| {
            format!(
                r#"<div class="result results_links web-result">
  <h2 class="result__title"><a class="result__a" href="https://zh.cppreference.com/w/c/io/fprintf{i}">fprintf {i}</a></h2>
  <a class="result__snippet">print formatted output {i}</a>
</div>"#
            )
        })
        .collect();
    format!("<html><body>{blocks}</body></html>")
}

struct Harness {
    _ddg: MockServer,
    _cppref: MockServer,
    _google: MockServer,
    server: SearchServer,
    client: reqwest::Client,
}

impl Harness {
    async fn start() -> Self {
        let ddg = MockServer::start().await;
        let cppref = MockServer::start().await;
        let google = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/html/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ddg_page()))
            .mount(&ddg)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&cppref)
            .await;
        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"title": "printf tutorial", "link": "https://tutorial.example.com/printf", "snippet": "Use printf"}
                ]
            })))
            .mount(&google)
            .await;

        let mut config = AppConfig::default();
        config.server = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            ..ServerConfig::default()
        };
        config.search.timeout_seconds = 1;
        config.search.user_agent = Some("TestBot/1.0".into());
        config.search.duckduckgo_url = format!("{}/html/", ddg.uri());
        config.search.cppreference_origin = cppref.uri();
        config.search.google_api_url = format!("{}/customsearch/v1", google.uri());
        config.search.google_api_key = Some("test-key".into());
        config.search.google_engine_id = Some("test-cx".into());
        config.session.secret = SECRET.into();
        config.validate().expect("valid config");

        let state = AppState::from_config(&config).expect("state");
        let server = SearchServer::start(state, &config.server)
            .await
            .expect("server starts");

        Self {
            _ddg: ddg,
            _cppref: cppref,
            _google: google,
            server,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.server.addr())
    }

    fn session_cookie(&self, user: &str) -> String {
        let service = SignedSessionService::new(SECRET, 60, 3600);
        let token = service
            .issue(&UserId::new(user).expect("user id"), false)
            .expect("token");
        format!("token={token}")
    }
}

#[tokio::test]
async fn search_returns_three_source_contract() {
    let h = Harness::start().await;

    let resp = h
        .client
        .get(h.url("/search/printf"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("json");
    let object = body.as_object().expect("object");
    assert_eq!(object.len(), 3);
    assert_eq!(body["mct"], json!([]));

    let cppref = body["cppref"].as_array().expect("cppref array");
    assert_eq!(cppref.len(), 3);
    assert_eq!(cppref[0]["title"], "fprintf 0");
    assert_eq!(cppref[0]["link"], "https://zh.cppreference.com/w/c/io/fprintf0");
    for entry in cppref {
        let keys: Vec<&str> = entry
            .as_object()
            .expect("entry")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys.len(), 3);
        for key in ["title", "description", "link"] {
            assert!(entry[key].is_string(), "{key} should be a string");
        }
    }

    assert_eq!(body["google"][0]["title"], "printf tutorial");
}

#[tokio::test]
async fn empty_search_is_bad_request() {
    let h = Harness::start().await;

    for path in ["/search/", "/search/%20%20"] {
        let resp = h.client.get(h.url(path)).send().await.expect("request");
        assert_eq!(resp.status(), 400, "path {path}");
        let body: Value = resp.json().await.expect("json");
        assert_eq!(body["error"], "validation_error");
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let h = Harness::start().await;
    let body: Value = h
        .client
        .get(h.url("/health"))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn feedback_requires_session() {
    let h = Harness::start().await;

    let resp = h
        .client
        .post(h.url("/api/feedback"))
        .json(&json!({"content": "great"}))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 401);

    let resp = h
        .client
        .post(h.url("/api/feedback"))
        .header("cookie", "token=forged.token")
        .json(&json!({"content": "great"}))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn feedback_with_session_is_accepted() {
    let h = Harness::start().await;

    let resp = h
        .client
        .post(h.url("/api/feedback"))
        .header("cookie", h.session_cookie("alice"))
        .json(&json!({"content": "the printf results are helpful"}))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("json");
    assert_eq!(body, json!({"message": "feedback received"}));
}

#[tokio::test]
async fn feedback_rejects_blank_or_malformed_body() {
    let h = Harness::start().await;

    let resp = h
        .client
        .post(h.url("/api/feedback"))
        .header("cookie", h.session_cookie("alice"))
        .json(&json!({"content": "   "}))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 400);

    let resp = h
        .client
        .post(h.url("/api/feedback"))
        .header("cookie", h.session_cookie("alice"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("json");
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let h = Harness::start().await;

    let resp = h
        .client
        .get(h.url("/health"))
        .header("origin", "http://localhost:5173")
        .send()
        .await
        .expect("request");
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
    assert_eq!(
        resp.headers()
            .get("access-control-allow-credentials")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
}

#[tokio::test]
async fn undecodable_query_gets_json_bad_request() {
    let h = Harness::start().await;

    let resp = h
        .client
        .get(h.url("/search/%FF"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("json");
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn login_check_reports_session_user() {
    let h = Harness::start().await;

    let resp = h
        .client
        .get(h.url("/api/auth/login"))
        .header("cookie", h.session_cookie("alice"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("json");
    assert_eq!(body, json!({"userId": "alice"}));
}

#[tokio::test]
async fn login_check_rejects_and_clears_bad_cookie() {
    let h = Harness::start().await;

    let resp = h
        .client
        .get(h.url("/api/auth/login"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 401);

    let resp = h
        .client
        .get(h.url("/api/auth/login"))
        .header("cookie", "token=forged.token")
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 401);
    let cookie = resp
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .expect("set-cookie");
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn logout_expires_session_cookie() {
    let h = Harness::start().await;

    let resp = h
        .client
        .delete(h.url("/api/auth/logout"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 401);

    let resp = h
        .client
        .delete(h.url("/api/auth/logout"))
        .header("cookie", h.session_cookie("alice"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);
    let cookie = resp
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .expect("set-cookie")
        .to_owned();
    assert!(cookie.contains("Max-Age=0"));
    let body: Value = resp.json().await.expect("json");
    assert_eq!(body, json!({"message": "logged out"}));
}

#[tokio::test]
async fn state_requires_session_secret() {
    let mut config = AppConfig::default();
    config.server.port = 0;
    let err = AppState::from_config(&config)
        .err()
        .expect("blank secret rejected");
    assert!(err.to_string().contains("session.secret"));
}
