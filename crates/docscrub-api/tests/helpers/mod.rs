//! Test helpers: build the router around a stub `qpdf` for integration tests.
//!
//! Run from workspace root: `cargo test -p docscrub-api`.

pub mod tools;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use docscrub_api::setup;
use docscrub_core::Config;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test application: server plus the directories it owns.
pub struct TestApp {
    pub server: TestServer,
    pub scratch: TempDir,
    pub _tools: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Everything left behind in the scratch directory.
    pub fn leftovers(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.scratch.path())
            .expect("Failed to read scratch dir")
            .map(|entry| entry.expect("Failed to read entry").path())
            .collect()
    }
}

/// Setup a test app whose `qpdf` is the given shell script.
pub async fn setup_test_app(script: &str) -> TestApp {
    let tools = tempfile::tempdir().expect("Failed to create tools directory");
    let binary = tools::write_stub_tool(tools.path(), "qpdf", script);
    setup_test_app_with_binary(binary.to_string_lossy().into_owned(), tools).await
}

/// Setup a test app whose `qpdf` is the given shell script, with `configure`
/// applied to the test configuration first.
pub async fn setup_test_app_with_config(
    script: &str,
    configure: impl FnOnce(&mut Config),
) -> TestApp {
    let tools = tempfile::tempdir().expect("Failed to create tools directory");
    let binary = tools::write_stub_tool(tools.path(), "qpdf", script);
    build_test_app(binary.to_string_lossy().into_owned(), tools, configure).await
}

/// Setup a test app pointing at an arbitrary binary path.
pub async fn setup_test_app_with_binary(binary: String, tools: TempDir) -> TestApp {
    build_test_app(binary, tools, |_| {}).await
}

async fn build_test_app(
    binary: String,
    tools: TempDir,
    configure: impl FnOnce(&mut Config),
) -> TestApp {
    let scratch = tempfile::tempdir().expect("Failed to create scratch directory");
    let mut config = Config::for_tests(binary, scratch.path());
    configure(&mut config);

    let (_state, router) = setup::initialize_app(config)
        .await
        .expect("Failed to initialize app");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        scratch,
        _tools: tools,
    }
}

/// Multipart form with a single `file` part.
pub fn file_form(data: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(data.to_vec())
            .file_name("document.pdf")
            .mime_type("application/pdf"),
    )
}

pub fn qpdf_on_path() -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join("qpdf"))
        .find(|candidate| Path::new(candidate).is_file())
}
