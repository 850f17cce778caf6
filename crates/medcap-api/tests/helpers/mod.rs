//! Shared test setup: an in-process server with a temp upload root and a
//! stub captioner so no model weights are needed.

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use medcap_api::setup::routes::setup_routes;
use medcap_api::state::AppState;
use medcap_captioner::Captioner;
use medcap_core::Config;
use medcap_storage::{LocalStorage, OverwritePolicy};

pub struct TestApp {
    pub server: TestServer,
    pub upload_root: PathBuf,
    _tempdir: tempfile::TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Deterministic captioner: echoes the stored filename so tests can assert
/// the handler captioned the right file.
struct StubCaptioner;

#[async_trait]
impl Captioner for StubCaptioner {
    async fn caption(&self, path: &Path) -> anyhow::Result<String> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(format!("a test caption for {}", name))
    }
}

pub async fn setup_test_app() -> TestApp {
    let tempdir = tempfile::tempdir().expect("Failed to create temp dir");
    let upload_root = tempdir.path().join("uploads");

    let config = Config {
        upload_root: upload_root.clone(),
        ..Config::default()
    };

    let storage = LocalStorage::new(&upload_root, OverwritePolicy::Replace)
        .await
        .expect("Failed to create test storage");

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(storage),
        Arc::new(StubCaptioner),
    ));

    let router = setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        upload_root,
        _tempdir: tempdir,
    }
}
