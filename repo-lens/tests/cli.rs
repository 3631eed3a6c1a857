use assert_cmd::Command;
use base64::Engine as _;
use predicates::prelude::*;
use serde_json::json;
use std::fs::write;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Writes a config file pointing the aggregator at `api_base_url`.
fn create_config(api_base_url: &str, repositories: &[&str]) -> NamedTempFile {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    let repos: String = repositories
        .iter()
        .map(|r| format!("  - \"{r}\"\n"))
        .collect();
    write(
        config.path(),
        format!("repositories:\n{repos}aggregator:\n  api_base_url: \"{api_base_url}\"\n  metadata_timeout_secs: 5\n"),
    )
    .expect("Writing temp config failed");
    config
}

async fn mount_single_file_repo(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/repos/octo/cat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "default_branch": "main" })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/cat/git/trees/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tree": [
                { "path": "docs", "type": "tree", "url": format!("{}/trees/docs", server.uri()) },
                { "path": "README.md", "type": "blob", "url": format!("{}/blobs/readme", server.uri()) }
            ],
            "truncated": false
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blobs/readme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "encoding": "base64",
            "content": base64::engine::general_purpose::STANDARD.encode("# Cat\n고양이\n"),
        })))
        .mount(server)
        .await;
}

#[test]
fn help_lists_the_aggregate_command() {
    let mut cmd = Command::cargo_bin("repo-lens").expect("Binary exists");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("aggregate"));
}

#[test]
fn invalid_url_is_rejected_without_network() {
    let mut cmd = Command::cargo_bin("repo-lens").expect("Binary exists");
    cmd.env_remove("GITHUB_TOKEN")
        .args(["aggregate", "https://github.com/just-an-owner"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid repository reference"))
        .stderr(predicate::str::contains("https://github.com/just-an-owner"));
}

#[test]
fn missing_repositories_is_an_error() {
    let mut cmd = Command::cargo_bin("repo-lens").expect("Binary exists");
    cmd.env_remove("GITHUB_TOKEN")
        .arg("aggregate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one repository"));
}

#[tokio::test(flavor = "multi_thread")]
async fn aggregate_prints_json_context_from_config() {
    let server = MockServer::start().await;
    mount_single_file_repo(&server).await;
    let config = create_config(&server.uri(), &["https://github.com/octo/cat"]);

    let mut cmd = Command::cargo_bin("repo-lens").expect("Binary exists");
    cmd.env_remove("GITHUB_TOKEN")
        .arg("aggregate")
        .arg("--config")
        .arg(config.path())
        .args(["--format", "json"]);

    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .expect("join")
        .expect("run binary");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let context: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(context["summary"], "Repo octo/cat: 2 files.");
    assert_eq!(
        context["structure"],
        "Directory Structure (Repo: octo/cat):\nREADME.md"
    );
    assert_eq!(
        context["file_contents"],
        "\n--- START OF FILE: octo/cat/README.md ---\n# Cat\n고양이\n\n--- END OF FILE ---"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn not_found_repository_fails_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/nonexistent-repo"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let config = create_config(&server.uri(), &[]);

    let mut cmd = Command::cargo_bin("repo-lens").expect("Binary exists");
    cmd.env_remove("GITHUB_TOKEN")
        .arg("aggregate")
        .arg("--config")
        .arg(config.path())
        .arg("https://github.com/octo/nonexistent-repo");

    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .expect("join")
        .expect("run binary");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("octo/nonexistent-repo"), "stderr: {stderr}");
    assert!(stderr.contains("private"), "stderr: {stderr}");
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use repo_lens::cli::{run, Cli, Commands, OutputFormat};

    // A malformed URL fails before any request, keeping this test offline.
    let cli = Cli {
        command: Commands::Aggregate {
            urls: vec!["not-a-repository".into()],
            config: None,
            token: None,
            format: OutputFormat::Text,
        },
    };

    let result = run(cli).await;
    assert!(result.is_err());

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
