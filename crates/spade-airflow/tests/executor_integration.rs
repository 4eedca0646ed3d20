//! Executor tests against a mock Airflow webserver.

mod common;

use common::{TOKEN, dag_runs_body, dag_runs_path, mount_login, process_for, request_count};
use serde_json::{Map, Value, json};
use spade_airflow::{
    ALREADY_RUNNING, AirflowRunDagExecutor, CONFIRMATION_MISSING, ConfigSource, NO_DAG_ID,
};
use spade_types::{Executor, Process, RunStatus, UserIdentity};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn executor() -> AirflowRunDagExecutor {
    AirflowRunDagExecutor::with_config(ConfigSource::params_only())
}

fn user() -> UserIdentity {
    UserIdentity::new("42", "ada@example.com")
}

fn params(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

async fn mount_recent_runs(server: &MockServer, dag_id: &str, states: &[&str]) {
    let runs = states
        .iter()
        .enumerate()
        .map(|(i, state)| json!({"dag_run_id": format!("run_{i}"), "state": state}))
        .collect();
    Mock::given(method("GET"))
        .and(path(dag_runs_path(dag_id)))
        .and(query_param("order_by", "-logical_date"))
        .and(query_param("state", "running"))
        .and(query_param("state", "restarting"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dag_runs_body(runs)))
        .mount(server)
        .await;
}

// ─────────────────────────────────────────────────────────────────────────────
// Happy path
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_run_triggers_dag_with_identity() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_recent_runs(&server, "daily_load", &["success", "failed"]).await;
    Mock::given(method("POST"))
        .and(path(dag_runs_path("daily_load")))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(body_json(json!({
            "conf": {
                "date": "2025-03-01",
                "spade_user_id": "42",
                "spade_user_email": "ada@example.com"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dag_run_id": "manual__2025-03-01",
            "dag_id": "daily_load",
            "state": "queued",
            "queued_at": "2025-03-01T10:00:00Z",
            "conf": {"date": "2025-03-01", "spade_user_id": "42"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let process = process_for(&server, "daily_load");
    let result = executor()
        .run(&process, &params(json!({"date": "2025-03-01"})), &user())
        .await
        .unwrap();

    assert_eq!(result.status, RunStatus::Running);
    assert!(result.error_message.is_none());
    assert_eq!(result.user_id.as_deref(), Some("42"));
    assert!(result.created_at.is_some());
    assert_eq!(result.output.unwrap()["dag_run_id"], "manual__2025-03-01");
}

#[tokio::test]
async fn test_accepted_trigger_with_unreadable_body_is_running() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_recent_runs(&server, "daily_load", &[]).await;
    Mock::given(method("POST"))
        .and(path(dag_runs_path("daily_load")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let process = process_for(&server, "daily_load");
    let result = executor().run(&process, &Map::new(), &user()).await.unwrap();

    assert_eq!(result.status, RunStatus::Running);
    assert!(result.error_message.is_none());
    assert!(result.output.is_none());
    assert_eq!(result.user_id.as_deref(), Some("42"));
}

#[tokio::test]
async fn test_user_param_overrides_dag_id() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_recent_runs(&server, "backfill", &[]).await;
    Mock::given(method("POST"))
        .and(path(dag_runs_path("backfill")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "queued"})))
        .expect(1)
        .mount(&server)
        .await;

    let process = process_for(&server, "daily_load");
    let result = executor()
        .run(&process, &params(json!({"dag_id": "backfill"})), &user())
        .await
        .unwrap();
    assert_eq!(result.status, RunStatus::Running);
}

#[tokio::test]
async fn test_allow_multiple_runs_skips_running_check() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path(dag_runs_path("daily_load")))
        .respond_with(ResponseTemplate::new(200).set_body_json(dag_runs_body(vec![])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(dag_runs_path("daily_load")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "queued"})))
        .expect(1)
        .mount(&server)
        .await;

    let process = process_for(&server, "daily_load").with_param("allow_multiple_runs", true);
    let result = executor().run(&process, &Map::new(), &user()).await.unwrap();
    assert_eq!(result.status, RunStatus::Running);
}

// ─────────────────────────────────────────────────────────────────────────────
// Policy rejections
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_dag_id_fails_without_http() {
    let server = MockServer::start().await;
    let process = Process::new("daily-load")
        .with_param("url", server.uri())
        .with_param("username", "spade")
        .with_param("password", "pw");

    let result = executor().run(&process, &Map::new(), &user()).await.unwrap();

    assert_eq!(result.status, RunStatus::Failed);
    assert_eq!(result.error_message.as_deref(), Some(NO_DAG_ID));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_declined_confirmation_fails_without_http() {
    let server = MockServer::start().await;
    let process = process_for(&server, "daily_load");

    let result = executor()
        .run(&process, &params(json!({"confirm": false})), &user())
        .await
        .unwrap();

    assert_eq!(result.status, RunStatus::Failed);
    assert_eq!(result.error_message.as_deref(), Some(CONFIRMATION_MISSING));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_running_dag_blocks_trigger() {
    for state in ["running", "restarting"] {
        let server = MockServer::start().await;
        mount_login(&server).await;
        mount_recent_runs(&server, "daily_load", &["success", state]).await;
        Mock::given(method("POST"))
            .and(path(dag_runs_path("daily_load")))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let process = process_for(&server, "daily_load");
        let result = executor().run(&process, &Map::new(), &user()).await.unwrap();

        assert_eq!(result.status, RunStatus::Failed, "state {state}");
        assert_eq!(result.error_message.as_deref(), Some(ALREADY_RUNNING));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Failures
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_running_check_blocks_trigger() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path(dag_runs_path("daily_load")))
        .respond_with(ResponseTemplate::new(500).set_body_string("scheduler unavailable"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(dag_runs_path("daily_load")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let process = process_for(&server, "daily_load");
    let result = executor().run(&process, &Map::new(), &user()).await.unwrap();

    assert_eq!(result.status, RunStatus::Failed);
    assert_eq!(result.error_message.as_deref(), Some("scheduler unavailable"));
}

#[tokio::test]
async fn test_rejected_trigger_surfaces_remote_error() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_recent_runs(&server, "daily_load", &[]).await;
    Mock::given(method("POST"))
        .and(path(dag_runs_path("daily_load")))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"detail":"conf is invalid"}"#),
        )
        .mount(&server)
        .await;

    let process = process_for(&server, "daily_load");
    let result = executor().run(&process, &Map::new(), &user()).await.unwrap();

    assert_eq!(result.status, RunStatus::Failed);
    assert_eq!(
        result.error_message.as_deref(),
        Some(r#"{"detail":"conf is invalid"}"#)
    );
}

#[tokio::test]
async fn test_login_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let process = process_for(&server, "daily_load");
    let err = executor()
        .run(&process, &Map::new(), &user())
        .await
        .unwrap_err();

    assert!(err.is_auth_error());
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_missing_credentials_abort_before_http() {
    let server = MockServer::start().await;
    let process = Process::new("daily-load")
        .with_param("url", server.uri())
        .with_param("username", "spade")
        .with_param("dag_id", "daily_load");

    let err = executor()
        .run(&process, &Map::new(), &user())
        .await
        .unwrap_err();

    assert!(err.is_config_error());
    assert_eq!(request_count(&server).await, 0);
}
