// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end JSON-RPC over HTTP against an in-process stub backend.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use url::Url;

use wellbeing_client::adapters::{TaskState, Tasks};
use wellbeing_client::config::ServiceAccount;
use wellbeing_client::connectivity::NetworkMonitor;
use wellbeing_client::presenter::Presenter;
use wellbeing_client::rpc::{HttpTransport, RpcClient, RpcError, TransportError};
use wellbeing_client::session::{AuthState, LoginError, SessionManager};
use wellbeing_client::storage::{LocalStore, MemoryBackend};
use zeroize::Zeroizing;

type Seen = Arc<Mutex<Vec<Value>>>;

#[derive(Default)]
struct Recorder {
    alerts: Mutex<Vec<String>>,
    toasts: Mutex<Vec<String>>,
}

#[async_trait]
impl Presenter for Recorder {
    async fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    fn toast(&self, message: &str) {
        self.toasts.lock().unwrap().push(message.to_string());
    }

    async fn confirm(&self, _message: &str) -> bool {
        true
    }

    fn show_login(&self) {}
}

async fn handle(State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    seen.lock().unwrap().push(body.clone());

    let id = body["id"].clone();
    let params = &body["params"];
    let args = &params["args"];
    let reply = match (params["service"].as_str(), params["method"].as_str()) {
        (Some("common"), Some("authenticate")) => {
            if args[2] == "s3cret" {
                json!({"jsonrpc": "2.0", "id": id, "result": 1})
            } else {
                json!({"jsonrpc": "2.0", "id": id, "result": false})
            }
        }
        (Some("object"), Some("execute_kw")) => match (args[3].as_str(), args[4].as_str()) {
            (Some("res.users"), Some("read")) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": [{
                    "id": 1,
                    "name": "Nguyen An",
                    "login": "0964164434",
                    "email": false,
                    "role": "student",
                    "partner_id": [11, "Nguyen An"],
                    "school_id": [3, "THCS Le Loi"],
                    "class_id": false
                }]
            }),
            (Some("project.task"), Some("search_read")) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {
                    "code": 200,
                    "message": "Odoo Server Error",
                    "data": {"name": "odoo.exceptions.AccessError", "message": "Access denied"}
                }
            }),
            _ => json!({"jsonrpc": "2.0", "id": id}),
        },
        _ => json!({"jsonrpc": "2.0", "id": id, "result": false}),
    };
    Json(reply)
}

async fn unavailable() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

async fn spawn_stub() -> (Url, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/jsonrpc", post(handle))
        .route("/down", post(unavailable))
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (Url::parse(&format!("http://{addr}/jsonrpc")).unwrap(), seen)
}

fn client(endpoint: Url, presenter: Arc<Recorder>) -> Arc<RpcClient> {
    let transport = HttpTransport::new(endpoint, Some(Duration::from_secs(5))).unwrap();
    Arc::new(RpcClient::new(
        "wellbeing",
        ServiceAccount {
            uid: 2,
            password: Zeroizing::new("portal".into()),
        },
        Arc::new(transport),
        presenter,
    ))
}

fn manager(rpc: Arc<RpcClient>) -> SessionManager {
    let store = LocalStore::open(Arc::new(MemoryBackend::new()), "app-secret").unwrap();
    SessionManager::new(rpc, store)
}

#[tokio::test]
async fn login_over_http() {
    let (endpoint, seen) = spawn_stub().await;
    let presenter = Arc::new(Recorder::default());
    let sessions = manager(client(endpoint, presenter.clone()));

    let scope = sessions.login("0964164434", "s3cret").await.unwrap();
    assert_eq!(scope.user_id(), 1);
    assert_eq!(sessions.state().await, AuthState::Authenticated);
    assert!(sessions.is_authenticated());

    let profile = sessions.auth_data().await.unwrap();
    assert_eq!(profile.school.name(), Some("THCS Le Loi"));
    assert_eq!(profile.email, None);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0]["jsonrpc"], "2.0");
    assert_eq!(seen[0]["method"], "call");
    assert_eq!(seen[1]["params"]["args"][3], "res.users");
    let ids: HashSet<u64> = seen.iter().map(|e| e["id"].as_u64().unwrap()).collect();
    assert_eq!(ids.len(), 2);
    assert!(presenter.alerts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn rejected_login_over_http() {
    let (endpoint, _) = spawn_stub().await;
    let sessions = manager(client(endpoint, Arc::new(Recorder::default())));

    let err = sessions.login("0964164434", "wrong").await.unwrap_err();
    assert!(matches!(err, LoginError::InvalidCredentials));
    assert!(!sessions.is_authenticated());
}

#[tokio::test]
async fn server_error_envelope_alerts_once() {
    let (endpoint, _) = spawn_stub().await;
    let presenter = Arc::new(Recorder::default());
    let rpc = client(endpoint, presenter.clone());
    let sessions = manager(rpc.clone());
    let scope = sessions.login("0964164434", "s3cret").await.unwrap();

    let err = Tasks::new(&rpc, &scope)
        .assigned(Some(TaskState::InProgress), 0, 20)
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Server { ref message } if message == "Access denied"));
    assert_eq!(
        presenter.alerts.lock().unwrap().clone(),
        vec!["Access denied".to_string()]
    );
}

#[tokio::test]
async fn http_status_is_transport_error() {
    let (endpoint, _) = spawn_stub().await;
    let presenter = Arc::new(Recorder::default());
    let rpc = client(endpoint.join("/down").unwrap(), presenter.clone());

    let err = rpc.authenticate("0964164434", "s3cret").await.unwrap_err();
    assert!(matches!(
        err,
        RpcError::Transport(TransportError::Status { status: 503 })
    ));
    assert!(presenter.alerts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn probe_sees_stub_as_online() {
    let (endpoint, _) = spawn_stub().await;
    let presenter = Arc::new(Recorder::default());
    let monitor = NetworkMonitor::new(endpoint, presenter.clone()).unwrap();

    assert!(monitor.probe().await);
    assert!(presenter.toasts.lock().unwrap().is_empty());
}
