use std::sync::OnceLock;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusHandle;
use relay_api::{ApiConfig, router, state::ApiState};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

pub const TEST_CLIENT_ID: &str = "test_client_id";
pub const TEST_CLIENT_SECRET: &str = "test_client_secret_do_not_leak";
pub const TOKEN_PATH: &str = "/login/oauth/access_token";
pub const AUTHORIZE_PATH: &str = "/login/oauth/authorize";

pub const SUCCESS_PREFIX: &str = "authorization:github:success:";

/// Test state builder for creating an ApiState against a mock provider
pub struct TestStateBuilder {
    config: ApiConfig,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            config: ApiConfig::new(TEST_CLIENT_ID, TEST_CLIENT_SECRET),
        }
    }

    /// Point both provider endpoints at a wiremock server
    pub fn with_provider(mut self, server: &MockServer) -> Self {
        self.config.github_authorize_url = format!("{}{}", server.uri(), AUTHORIZE_PATH);
        self.config.github_token_url = format!("{}{}", server.uri(), TOKEN_PATH);
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.config.github_token_url = url.into();
        self
    }

    pub fn with_client_id(mut self, client_id: &str) -> Self {
        self.config.github_client_id = client_id.to_string();
        self
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.config.oauth_scope = scope.to_string();
        self
    }

    pub fn with_allowed_origins(mut self, origins: &str) -> Self {
        self.config.allowed_origins = Some(origins.to_string());
        self
    }

    pub fn with_site_dir(mut self, dir: &str) -> Self {
        self.config.site_dir = Some(dir.to_string());
        self
    }

    pub fn with_environment(mut self, env: relay_api::config::Environment) -> Self {
        self.config.env = env;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn build(self) -> ApiState {
        ApiState::new(&self.config).expect("Failed to create test state")
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Relay routes only, no outer middleware
pub fn relay_app(state: ApiState) -> Router {
    router::router(None).with_state(state)
}

/// Full application stack as the binaries build it
pub fn full_app(builder: TestStateBuilder) -> Router {
    let config = builder.config().clone();
    let state = builder.build();
    // Recorder handle without installing a global recorder
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .build_recorder()
        .handle();
    router::app(&config, state, handle)
}

/// Handle to the global Prometheus recorder, installed once per test binary
pub fn installed_metrics_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("Failed to install metrics recorder")
        })
        .clone()
}

/// Full application stack reporting into the global recorder
pub fn metered_app(builder: TestStateBuilder) -> Router {
    let config = builder.config().clone();
    let state = builder.build();
    router::app(&config, state, installed_metrics_handle())
}

/// Mount a token endpoint that must be hit exactly once with `code`
pub async fn mock_token_exchange(server: &MockServer, code: &str, response: Value) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("accept", "application/json"))
        .and(body_json(serde_json::json!({
            "client_id": TEST_CLIENT_ID,
            "client_secret": TEST_CLIENT_SECRET,
            "code": code,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(1)
        .mount(server)
        .await;
}

/// Mount a token endpoint that must never be called
pub async fn mock_no_token_exchange(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

/// Helper to make requests to the test app
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Send a request and get the response
    pub async fn request(&self, mut request: Request<Body>) -> TestResponse {
        // Add ConnectInfo extension for rate limiting to work in tests
        use axum::extract::ConnectInfo;
        use std::net::{IpAddr, Ipv4Addr, SocketAddr};

        let test_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080);
        request.extensions_mut().insert(ConnectInfo(test_addr));

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            body: body_bytes.to_vec(),
            headers,
        }
    }

    /// Send a GET request
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.get_from(uri, "127.0.0.1").await
    }

    /// Send a GET request as if it came from `ip`
    pub async fn get_from(&self, uri: &str, ip: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header("x-forwarded-for", ip) // Required for rate limiting in tests
            .body(Body::empty())
            .expect("Failed to build request");

        self.request(request).await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: HeaderMap,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not UTF-8")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
