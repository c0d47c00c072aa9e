use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use futures_util::StreamExt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use taskdeck_daemon::config::ServerConfig;
use taskdeck_daemon::{create_router, AppState, RunConfigStore};
use taskdeck_engine::{
    AccountRoster, AccountValidator, ExecutorError, InMemoryTaskLog, Orchestrator,
    SimulatedValidator, TaskExecutor, TaskInvocation,
};
use taskdeck_types::{Account, AccountStatus, RunConfiguration, TaskInput};
use tokio::sync::Semaphore;
use tower::ServiceExt;

/// Succeeds once a permit is available; records follow-target counts
struct GatedExecutor {
    gate: Arc<Semaphore>,
    follow_counts: Mutex<Vec<usize>>,
}

impl GatedExecutor {
    fn open() -> Arc<Self> {
        Self::with_permits(Semaphore::MAX_PERMITS)
    }

    fn with_permits(permits: usize) -> Arc<Self> {
        Arc::new(Self {
            gate: Arc::new(Semaphore::new(permits)),
            follow_counts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl TaskExecutor for GatedExecutor {
    async fn execute(&self, invocation: &TaskInvocation) -> Result<(), ExecutorError> {
        if let TaskInput::FollowTargets(targets) = &invocation.input {
            self.follow_counts.lock().unwrap().push(targets.len());
        }
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| ExecutorError::Fatal(e.to_string()))?;
        permit.forget();
        Ok(())
    }
}

struct Fixture {
    app: Router,
    config_path: PathBuf,
    _dir: tempfile::TempDir,
}

fn fixture(executor: Arc<GatedExecutor>, roster: Vec<Account>) -> Fixture {
    fixture_with_validator(executor, roster, Arc::new(SimulatedValidator::default()))
}

fn fixture_with_validator(
    executor: Arc<GatedExecutor>,
    roster: Vec<Account>,
    validator: Arc<dyn AccountValidator>,
) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");

    let roster = Arc::new(AccountRoster::new(roster));
    let log = Arc::new(InMemoryTaskLog::new());
    let run_config = Arc::new(RunConfigStore::new(
        &config_path,
        RunConfiguration::without_pauses(),
    ));
    let orchestrator = Orchestrator::new(executor, log.clone(), roster.clone(), run_config.shared());

    let state =
        AppState::new(Arc::new(orchestrator), roster, log, run_config).with_validator(validator);
    Fixture {
        app: create_router(state, &ServerConfig::default()),
        config_path,
        _dir: dir,
    }
}

fn ok_accounts(tokens: &[&str]) -> Vec<Account> {
    tokens
        .iter()
        .map(|t| Account::from_token(*t).with_status(AccountStatus::Ok))
        .collect()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn progress_currents(resp: Response) -> Vec<u64> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    parse_lines(&bytes)
}

fn parse_lines(bytes: &[u8]) -> Vec<u64> {
    std::str::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|line| {
            let message: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(message["type"], "progress");
            message["progress"]["current"].as_u64().unwrap()
        })
        .collect()
}

#[tokio::test]
async fn batch_run_streams_one_line_per_account() {
    let f = fixture(GatedExecutor::open(), Vec::new());

    let resp = send(
        &f.app,
        "POST",
        "/api/batch/run",
        Some(serde_json::json!({
            "task_ids": ["follow"],
            "inputs": { "follow": "alice bob" },
            "account_tokens": ["t1", "t2", "t3"],
        })),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/x-ndjson"
    );
    assert_eq!(progress_currents(resp).await, vec![1, 2, 3]);

    let stats = json_body(send(&f.app, "GET", "/api/statistics", None).await).await;
    assert_eq!(stats["total_tasks"], 3);
    assert_eq!(stats["success_rate"], 100);
    assert_eq!(stats["task_stats"]["follow"]["total"], 3);
    assert_eq!(stats["recent_activity"][0]["account_index"], 3);
}

#[tokio::test]
async fn second_run_is_rejected_while_first_streams() {
    let executor = GatedExecutor::with_permits(0);
    let f = fixture(executor.clone(), ok_accounts(&["a", "b"]));

    let first = send(
        &f.app,
        "POST",
        "/api/batch/run",
        Some(serde_json::json!({ "tasks": ["tweet"], "accounts": ["a", "b", "c"] })),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = send(
        &f.app,
        "POST",
        "/api/batch/run",
        Some(serde_json::json!({ "task_ids": ["check_valid"], "account_tokens": ["a"] })),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(second).await["code"], "ALREADY_RUNNING");

    let mutual = send(
        &f.app,
        "POST",
        "/api/mutual-subscription/run",
        Some(serde_json::json!({ "followers_per_account": 1, "account_tokens": ["a", "b"] })),
    )
    .await;
    assert_eq!(mutual.status(), StatusCode::CONFLICT);

    let stats = json_body(send(&f.app, "GET", "/api/statistics", None).await).await;
    assert_eq!(stats["active_sessions"], 1);

    executor.gate.add_permits(16);
    assert_eq!(progress_currents(first).await, vec![1, 2, 3]);

    let status = json_body(send(&f.app, "GET", "/api/status", None).await).await;
    assert_eq!(status["stats"]["run_active"], false);
    assert_eq!(status["stats"]["log_entries"], 3);
}

#[tokio::test]
async fn cancel_stops_stream_after_account_in_flight() {
    let executor = GatedExecutor::with_permits(1);
    let f = fixture(executor.clone(), Vec::new());

    let resp = send(
        &f.app,
        "POST",
        "/api/batch/run",
        Some(serde_json::json!({
            "task_ids": ["tweet"],
            "account_tokens": ["a", "b", "c", "d", "e"],
        })),
    )
    .await;

    let mut body = resp.into_body().into_data_stream();
    let first: Bytes = body.next().await.unwrap().unwrap();
    assert_eq!(parse_lines(&first), vec![1]);

    let cancel = send(&f.app, "POST", "/api/batch/cancel", None).await;
    assert_eq!(cancel.status(), StatusCode::OK);
    executor.gate.add_permits(16);

    let mut rest = Vec::new();
    while let Some(chunk) = body.next().await {
        rest.extend(parse_lines(&chunk.unwrap()));
    }
    assert!(rest.iter().all(|current| *current <= 2));

    let status = json_body(send(&f.app, "GET", "/api/status", None).await).await;
    assert_eq!(status["stats"]["run_active"], false);
}

#[tokio::test]
async fn mutual_subscription_caps_targets() {
    let executor = GatedExecutor::open();
    let mut roster = ok_accounts(&["a", "b", "c"]);
    roster.push(Account::from_token("d").with_status(AccountStatus::WrongToken));
    let f = fixture(executor.clone(), roster);

    let resp = send(
        &f.app,
        "POST",
        "/api/mutual-subscription/run",
        Some(serde_json::json!({
            "followersPerAccount": 5,
            "accounts": ["a", "b", "c", "d"],
        })),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(progress_currents(resp).await, vec![1, 2, 3]);
    assert_eq!(*executor.follow_counts.lock().unwrap(), vec![2, 2, 2]);

    let stats = json_body(send(&f.app, "GET", "/api/statistics", None).await).await;
    assert_eq!(stats["task_stats"]["mutual_subscription"]["total"], 3);
}

#[tokio::test]
async fn mutual_subscription_needs_two_eligible_accounts() {
    let mut roster = ok_accounts(&["a"]);
    roster.push(Account::from_token("b").with_status(AccountStatus::Suspended));
    let f = fixture(GatedExecutor::open(), roster);

    let resp = send(
        &f.app,
        "POST",
        "/api/mutual-subscription/run",
        Some(serde_json::json!({ "followers_per_account": 1, "account_tokens": ["a", "b"] })),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["code"], "INSUFFICIENT_ACCOUNTS");
    assert_eq!(body["details"]["eligible"], 1);
}

#[tokio::test]
async fn missing_input_is_rejected_before_streaming() {
    let f = fixture(GatedExecutor::open(), Vec::new());

    let resp = send(
        &f.app,
        "POST",
        "/api/batch/run",
        Some(serde_json::json!({ "task_ids": ["comment"], "account_tokens": ["a"] })),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["code"], "MISSING_INPUT");
    assert_eq!(body["details"]["task"], "comment");

    let stats = json_body(send(&f.app, "GET", "/api/statistics", None).await).await;
    assert_eq!(stats["total_tasks"], 0);
    assert_eq!(stats["active_sessions"], 0);
}

#[tokio::test]
async fn omitted_accounts_use_run_error_body() {
    let f = fixture(GatedExecutor::open(), Vec::new());

    let resp = send(
        &f.app,
        "POST",
        "/api/batch/run",
        Some(serde_json::json!({ "task_ids": ["check_valid"] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["code"], "NO_ACCOUNTS");
}

#[tokio::test]
async fn validated_accounts_become_eligible_for_mutual_subscription() {
    let executor = GatedExecutor::open();
    let roster = vec![Account::from_token("a"), Account::from_token("b"), Account::from_token("c")];
    let f = fixture_with_validator(executor.clone(), roster, Arc::new(SimulatedValidator::new(1.0)));
    let request = serde_json::json!({
        "followers_per_account": 1,
        "account_tokens": ["a", "b", "c"],
    });

    let resp = send(&f.app, "POST", "/api/mutual-subscription/run", Some(request.clone())).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["details"]["eligible"], 0);

    let resp = send(&f.app, "POST", "/api/accounts/validate", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let accounts = json_body(resp).await;
    for account in accounts.as_array().unwrap() {
        assert_eq!(account["status"], "ok");
        assert!(account["username"].as_str().unwrap().starts_with("user_"));
    }

    let resp = send(&f.app, "POST", "/api/mutual-subscription/run", Some(request)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(progress_currents(resp).await, vec![1, 2, 3]);
    assert_eq!(*executor.follow_counts.lock().unwrap(), vec![1, 1, 1]);
}

#[tokio::test]
async fn export_returns_workbook() {
    let f = fixture(GatedExecutor::open(), Vec::new());

    let run = send(
        &f.app,
        "POST",
        "/api/batch/run",
        Some(serde_json::json!({ "task_ids": ["check_valid"], "account_tokens": ["a", "b"] })),
    )
    .await;
    assert_eq!(progress_currents(run).await, vec![1, 2]);

    let resp = send(&f.app, "GET", "/api/statistics/export", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn config_update_is_validated_and_persisted() {
    let f = fixture(GatedExecutor::open(), Vec::new());

    let mut config = json_body(send(&f.app, "GET", "/api/config", None).await).await;
    assert_eq!(config["SETTINGS"]["THREADS"], 1);

    config["SETTINGS"]["ATTEMPTS"] = serde_json::json!(0);
    let resp = send(&f.app, "PUT", "/api/config", Some(config.clone())).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(resp).await["code"], "VALIDATION_ERROR");
    assert!(!f.config_path.exists());

    config["SETTINGS"]["ATTEMPTS"] = serde_json::json!(3);
    let resp = send(&f.app, "PUT", "/api/config", Some(config)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let persisted = std::fs::read_to_string(&f.config_path).unwrap();
    assert!(persisted.contains("ATTEMPTS: 3"));

    let config = json_body(send(&f.app, "GET", "/api/config", None).await).await;
    assert_eq!(config["SETTINGS"]["ATTEMPTS"], 3);
}

#[tokio::test]
async fn imported_roster_feeds_selection() {
    let f = fixture(GatedExecutor::open(), Vec::new());

    let workbook = {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (row, cells) in [["AUTH_TOKEN", "STATUS"], ["tok-1", "ok"], ["tok-2", "locked"]]
            .iter()
            .enumerate()
        {
            for (col, value) in cells.iter().enumerate() {
                sheet.write_string(row as u32, col as u16, *value).unwrap();
            }
        }
        workbook.save_to_buffer().unwrap()
    };

    let resp = f
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/accounts/import")
                .body(Body::from(workbook))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let accounts = json_body(resp).await;
    assert_eq!(accounts.as_array().unwrap().len(), 2);
    assert_eq!(accounts[1]["status"], "locked");

    let selection = json_body(send(&f.app, "GET", "/api/accounts/selection", None).await).await;
    assert_eq!(selection["total"], 2);

    let resp = send(
        &f.app,
        "PUT",
        "/api/accounts",
        Some(serde_json::json!([{ "auth_token": "tok-9", "status": "ok" }])),
    )
    .await;
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 1);
}
