//! Shared helpers for the wiremock-backed reconciliation tests

use repoconform::{Config, GitHubClient, ReconcileEngine};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ACCOUNT: &str = "dfar-io";

/// Config pointed at the mock server, with the default policy
pub fn test_config(server_uri: &str) -> Config {
    let mut config = Config::default();
    config.github.account = ACCOUNT.to_string();
    config.github.api_url = server_uri.to_string();
    config
}

/// Engine whose client talks to the mock server
pub fn engine(config: Config) -> ReconcileEngine {
    let client = GitHubClient::new(&config, "ghp_testtoken").expect("client should build");
    ReconcileEngine::new(config, client)
}

pub fn repo(name: &str, archived: bool) -> Value {
    json!({ "name": name, "archived": archived })
}

/// Mount the repository listing: one page of repositories, then empty
/// pages ending pagination.
pub async fn mount_repo_list(server: &MockServer, repos: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(format!("/users/{ACCOUNT}/repos")))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(repos)))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/users/{ACCOUNT}/repos")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

pub fn settings_path(repo: &str) -> String {
    format!("/repos/{ACCOUNT}/{repo}")
}

pub fn workflow_runs_path(repo: &str, file: &str) -> String {
    format!("/repos/{ACCOUNT}/{repo}/actions/workflows/{file}/runs")
}

pub fn protection_path(repo: &str, branch: &str) -> String {
    format!("/repos/{ACCOUNT}/{repo}/branches/{branch}/protection")
}

/// Workflow-runs body for a repository with run history
pub fn runs_body(total: u32) -> Value {
    json!({ "total_count": total, "workflow_runs": [] })
}

/// The full-replace protection body expected for the given check contexts
pub fn protection_body(contexts: &[&str]) -> Value {
    let checks: Vec<Value> = contexts.iter().map(|c| json!({ "context": c })).collect();
    json!({
        "required_status_checks": {
            "strict": true,
            "checks": checks,
        },
        "required_pull_request_reviews": {
            "required_approving_review_count": 0,
        },
        "enforce_admins": true,
        "restrictions": null,
    })
}
