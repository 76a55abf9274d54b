#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use nokos_backend::config::Config;
use nokos_backend::jobs::otp_poll::PollConfig;
use nokos_backend::models::order::{Order, OrderStatus};
use nokos_backend::{routes, AppState};

/// Scriptable stand-in for the OTP provider.
#[derive(Clone)]
pub struct MockJasa {
    /// When set, order.php rejects with this message.
    pub order_fail_message: Arc<Mutex<Option<String>>>,
    pub cancel_ok: Arc<Mutex<bool>>,
    /// Responses popped per sms.php call; empty means "Menunggu SMS".
    pub sms_script: Arc<Mutex<VecDeque<Value>>>,
    pub next_order_id: Arc<AtomicU64>,
    pub sms_calls: Arc<AtomicU64>,
    pub cancel_calls: Arc<AtomicU64>,
}

impl MockJasa {
    pub fn new() -> Self {
        Self {
            order_fail_message: Arc::new(Mutex::new(None)),
            cancel_ok: Arc::new(Mutex::new(true)),
            sms_script: Arc::new(Mutex::new(VecDeque::new())),
            next_order_id: Arc::new(AtomicU64::new(100001)),
            sms_calls: Arc::new(AtomicU64::new(0)),
            cancel_calls: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn push_sms(&self, body: Value) {
        self.sms_script.lock().push_back(body);
    }

    pub fn waiting_sms() -> Value {
        json!({"success": true, "data": {"otp": "Menunggu SMS"}})
    }

    pub fn otp_sms(text: &str) -> Value {
        json!({"success": true, "data": {"otp": text}})
    }

    fn router(&self) -> Router {
        Router::new()
            .route(
                "/negara.php",
                get(|| async {
                    Json(json!({
                        "success": true,
                        "data": [{"id": "62", "name": "Indonesia"}]
                    }))
                }),
            )
            .route(
                "/layanan.php",
                get(|| async {
                    Json(json!({
                        "62": {
                            "wa": {"harga": 15000, "name": "WhatsApp"},
                            "tg": {"harga": 8000, "name": "Telegram"}
                        }
                    }))
                }),
            )
            .route("/order.php", get(mock_place_order))
            .route("/cancel.php", get(mock_cancel))
            .route("/sms.php", get(mock_sms))
            .with_state(self.clone())
    }
}

async fn mock_place_order(State(mock): State<MockJasa>) -> Json<Value> {
    if let Some(message) = mock.order_fail_message.lock().clone() {
        return Json(json!({"success": false, "message": message}));
    }
    let id = mock.next_order_id.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "success": true,
        "data": {"order_id": id, "number": format!("62811000{id}"), "app": "wa"}
    }))
}

async fn mock_cancel(State(mock): State<MockJasa>) -> Json<Value> {
    mock.cancel_calls.fetch_add(1, Ordering::SeqCst);
    if *mock.cancel_ok.lock() {
        Json(json!({"success": true, "message": "ok"}))
    } else {
        Json(json!({"success": false, "message": "tidak bisa dibatalkan"}))
    }
}

async fn mock_sms(State(mock): State<MockJasa>) -> Json<Value> {
    mock.sms_calls.fetch_add(1, Ordering::SeqCst);
    let scripted = mock.sms_script.lock().pop_front();
    Json(scripted.unwrap_or_else(MockJasa::waiting_sms))
}

/// Stand-in for the QRIS gateway.
#[derive(Clone)]
pub struct MockAtlantic {
    pub create_ok: Arc<Mutex<bool>>,
    pub status: Arc<Mutex<String>>,
}

impl MockAtlantic {
    pub fn new() -> Self {
        Self {
            create_ok: Arc::new(Mutex::new(true)),
            status: Arc::new(Mutex::new("processing".into())),
        }
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/deposit/create", post(mock_deposit_create))
            .route("/deposit/status", post(mock_deposit_status))
            .with_state(self.clone())
    }
}

async fn mock_deposit_create(State(mock): State<MockAtlantic>) -> Json<Value> {
    if *mock.create_ok.lock() {
        Json(json!({
            "status": true,
            "message": "ok",
            "data": {"id": 90001, "qr_string": "00020101mockqrpayload"}
        }))
    } else {
        Json(json!({"status": false, "message": "deposit ditolak"}))
    }
}

async fn mock_deposit_status(State(mock): State<MockAtlantic>) -> Json<Value> {
    let status = mock.status.lock().clone();
    Json(json!({"data": {"status": status}}))
}

async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub jasa: MockJasa,
    pub atlantic: MockAtlantic,
}

/// App wired against fresh mock upstreams, with a slow generous poll
/// budget so committed orders stay pending for the duration of a test.
pub async fn test_app() -> TestApp {
    let jasa = MockJasa::new();
    let atlantic = MockAtlantic::new();
    let jasa_url = spawn_server(jasa.router()).await;
    let atlantic_url = spawn_server(atlantic.router()).await;

    let config = Config {
        bind_addr: "127.0.0.1:0".into(),
        jasaotp_api_key: "test-key".into(),
        jasaotp_base_url: jasa_url,
        atlantic_api_key: "test-key".into(),
        atlantic_base_url: atlantic_url,
        margin: Decimal::ZERO,
        poll: PollConfig {
            interval: Duration::from_millis(50),
            max_attempts: 1000,
        },
    };
    let state = AppState::new(config);

    TestApp {
        router: routes::router(state.clone()),
        state,
        jasa,
        atlantic,
    }
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub fn pending_order(order_id: &str, user_id: &str, price: Decimal) -> Order {
    Order {
        order_id: order_id.into(),
        user_id: user_id.into(),
        negara: "62".into(),
        layanan: "wa".into(),
        operator: "any".into(),
        aplikasi: "wa".into(),
        nomor: "6281100042".into(),
        price,
        status: OrderStatus::Pending,
        created_at: chrono::Utc::now(),
        otp: None,
        raw: None,
    }
}

/// Polls the store until the order reaches `status` or two seconds pass.
pub async fn wait_for_status(state: &AppState, order_id: &str, status: OrderStatus) -> Order {
    for _ in 0..200 {
        if let Some(order) = state.orders.get(order_id).await {
            if order.status == status {
                return order;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("order {order_id} never reached {status:?}");
}
