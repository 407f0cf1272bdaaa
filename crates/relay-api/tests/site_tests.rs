use std::path::PathBuf;

use crate::common::{self, TestClient, TestStateBuilder};
use axum::http::StatusCode;
use relay_api::router;

/// Temporary site directory, removed on drop
struct SiteDir(PathBuf);

impl SiteDir {
    fn create() -> Self {
        let root = std::env::temp_dir().join(format!("relay-site-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(root.join("admin")).expect("Failed to create site dir");
        std::fs::write(root.join("index.html"), "<h1>Calligraphy classes</h1>")
            .expect("Failed to write index");
        std::fs::write(
            root.join("admin").join("index.html"),
            "<script src=\"decap-cms.js\"></script>",
        )
        .expect("Failed to write admin index");
        std::fs::write(root.join("admin").join("config.yml"), "backend:\n  name: github\n")
            .expect("Failed to write admin config");
        Self(root)
    }

    fn path(&self) -> &str {
        self.0.to_str().expect("temp dir is UTF-8")
    }
}

impl Drop for SiteDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

#[tokio::test]
async fn test_site_files_served() {
    let site = SiteDir::create();
    let state = TestStateBuilder::new().build();
    let client = TestClient::new(router::router(Some(site.0.as_path())).with_state(state));

    let response = client.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("Calligraphy classes"));

    let response = client.get("/admin/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("decap-cms.js"));

    let response = client.get("/admin/config.yml").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("name: github"));
}

#[tokio::test]
async fn test_missing_site_file_is_not_found() {
    let site = SiteDir::create();
    let state = TestStateBuilder::new().build();
    let client = TestClient::new(router::router(Some(site.0.as_path())).with_state(state));

    let response = client.get("/images/missing.png").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_relay_routes_take_precedence_over_site() {
    let site = SiteDir::create();
    let client = TestClient::new(common::full_app(
        TestStateBuilder::new()
            .with_client_id("cid_1")
            .with_site_dir(site.path()),
    ));

    let response = client.get("/auth").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert!(response.header("location").unwrap().contains("client_id=cid_1"));

    let response = client.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("x-frame-options"), Some("DENY"));
}

#[tokio::test]
async fn test_without_site_dir_unknown_paths_404() {
    let state = TestStateBuilder::new().build();
    let client = TestClient::new(common::relay_app(state));

    let response = client.get("/").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "The requested resource was not found");
}
