//! Shared helpers for tests against a mock Airflow webserver.

#![allow(dead_code)]

use serde_json::{Value, json};
use spade_types::Process;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "spade";
pub const PASSWORD: &str = "pw";
pub const TOKEN: &str = "jwt-token";

/// A process pointing at the mock server with working credentials.
pub fn process_for(server: &MockServer, dag_id: impl Into<Value>) -> Process {
    Process::new("daily-load")
        .with_param("url", server.uri())
        .with_param("username", USERNAME)
        .with_param("password", PASSWORD)
        .with_param("dag_id", dag_id)
}

/// Mount a login endpoint handing out [`TOKEN`].
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .and(body_json(json!({"username": USERNAME, "password": PASSWORD})))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("set-cookie", format!("_token={}; Path=/; HttpOnly", TOKEN)),
        )
        .mount(server)
        .await;
}

/// Path of the DAG runs collection of a DAG.
pub fn dag_runs_path(dag_id: &str) -> String {
    format!("/api/v2/dags/{}/dagRuns", dag_id)
}

/// A list response body.
pub fn dag_runs_body(runs: Vec<Value>) -> Value {
    let total = runs.len();
    json!({"dag_runs": runs, "total_entries": total})
}

/// Number of requests the mock server has seen.
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}
