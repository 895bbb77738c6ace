use std::sync::{Arc, Mutex};

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use chrono::{DateTime, FixedOffset, NaiveDate};
use greenmin_admin::{
    client::ApiClient,
    clock::FixedClock,
    config::Endpoints,
    expiry::{ExpiryMode, PeriodEnd},
    orders::{ExecuteStatus, OrderDraft, OrderType, Session},
    submission::{
        CONFIRMATION_TITLE, OrderSubmissionFlow, SubmissionFailure, SubmissionState,
        UNREACHABLE_MESSAGE,
    },
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Clone)]
struct Stub {
    reply: (StatusCode, String),
    seen: Arc<Mutex<Vec<Value>>>,
}

async fn take_order(State(stub): State<Stub>, Json(body): Json<Value>) -> (StatusCode, String) {
    stub.seen.lock().unwrap().push(body);
    stub.reply.clone()
}

/// Orders API stub answering every POST with `reply`; returns its base URL and the bodies it saw.
async fn spawn_orders_api(status: StatusCode, reply: &str) -> (String, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        reply: (status, reply.to_string()),
        seen: seen.clone(),
    };
    let app = Router::new()
        .route("/api/order", post(take_order))
        .with_state(stub);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), seen)
}

fn noon() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2024-06-01T12:00:00+05:30").unwrap()
}

fn flow_for(base: &str) -> OrderSubmissionFlow<FixedClock> {
    let client = ApiClient::new(Endpoints::under(base));
    let mut flow = OrderSubmissionFlow::new(client, FixedClock(noon()), Session::new("Ginura"));
    *flow.draft_mut() = OrderDraft {
        order_type: OrderType::Buy,
        price_min: "100".into(),
        price_max: "120.5".into(),
        quantity: "10".into(),
        execute_status: Some(ExecuteStatus::Single),
        expiry_mode: ExpiryMode::Today,
        period_from: None,
        period_to: None,
    };
    flow
}

#[tokio::test]
async fn accepted_order_moves_to_success_with_timestamp() {
    let (base, seen) = spawn_orders_api(
        StatusCode::OK,
        r#"{"code":"0000","order":{"id":"ord-1","quantity":"10"}}"#,
    )
    .await;
    let mut flow = flow_for(&base);

    match flow.submit().await {
        SubmissionState::Success(c) => {
            assert_eq!(c.title, CONFIRMATION_TITLE);
            assert_eq!(c.placed_at, noon());
            assert_eq!(c.order.as_ref().unwrap()["id"], "ord-1");
        }
        other => panic!("expected success, got {:?}", other),
    }

    let bodies = seen.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(
        bodies[0],
        json!({
            "buySell": "B",
            "priceMin": "100",
            "priceMax": "120.5",
            "quantity": "10",
            "executeFrom": "2024-06-01T06:30:00.000Z",
            "executeTo": "2024-06-01T18:29:59.000Z",
            "balanceQuantity": "0",
            "executeStatus": "pending",
            "userId": "Ginura",
        })
    );
}

#[tokio::test]
async fn rejected_order_surfaces_server_message() {
    let (base, _) =
        spawn_orders_api(StatusCode::OK, r#"{"code":"X","message":"bad quantity"}"#).await;
    let mut flow = flow_for(&base);

    let state = flow.submit().await.clone();
    assert_eq!(
        state,
        SubmissionState::Failure(SubmissionFailure::Rejected {
            code: Some("X".into()),
            message: "bad quantity".into(),
        })
    );
    if let SubmissionState::Failure(f) = state {
        assert_eq!(f.message(), "bad quantity");
    }
}

#[tokio::test]
async fn http_error_status_is_judged_by_body() {
    let (base, _) = spawn_orders_api(
        StatusCode::BAD_REQUEST,
        r#"{"code":"E12","message":"price out of range"}"#,
    )
    .await;
    let mut flow = flow_for(&base);

    match flow.submit().await {
        SubmissionState::Failure(f) => assert_eq!(f.message(), "price out of range"),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn unparseable_reply_is_unreachable() {
    let (base, seen) = spawn_orders_api(StatusCode::OK, "<html>gateway</html>").await;
    let mut flow = flow_for(&base);

    assert_eq!(
        flow.submit().await,
        &SubmissionState::Failure(SubmissionFailure::Unreachable)
    );
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn connection_refused_is_unreachable() {
    // grab a free port, then close it
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut flow = flow_for(&format!("http://{}", addr));
    match flow.submit().await {
        SubmissionState::Failure(f) => assert_eq!(f.message(), UNREACHABLE_MESSAGE),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn each_submit_sends_exactly_one_request() {
    let (base, seen) = spawn_orders_api(StatusCode::OK, r#"{"code":"0000"}"#).await;
    let mut flow = flow_for(&base);

    flow.submit().await;
    flow.submit().await;
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn period_window_is_sent_as_start_of_days() {
    let (base, seen) = spawn_orders_api(StatusCode::OK, r#"{"code":"0000"}"#).await;
    let mut flow = flow_for(&base);
    {
        let d = flow.draft_mut();
        d.expiry_mode = ExpiryMode::Period;
        d.period_from = NaiveDate::from_ymd_opt(2024, 1, 1);
        d.period_to = NaiveDate::from_ymd_opt(2024, 1, 31);
    }
    flow.submit().await;

    let body = seen.lock().unwrap()[0].clone();
    assert_eq!(body["executeFrom"], "2024-01-01T00:00:00.000Z");
    assert_eq!(body["executeTo"], "2024-01-31T00:00:00.000Z");
}

#[tokio::test]
async fn period_without_dates_sends_empty_strings() {
    let (base, seen) = spawn_orders_api(StatusCode::OK, r#"{"code":"0000"}"#).await;
    let mut flow = flow_for(&base).with_period_end(PeriodEnd::EndOfDay);
    flow.draft_mut().expiry_mode = ExpiryMode::Period;
    flow.submit().await;

    let body = seen.lock().unwrap()[0].clone();
    assert_eq!(body["executeFrom"], "");
    assert_eq!(body["executeTo"], "");
}

#[tokio::test]
async fn clear_after_success_returns_to_idle_defaults() {
    let (base, seen) = spawn_orders_api(StatusCode::OK, r#"{"code":"0000"}"#).await;
    let mut flow = flow_for(&base);
    assert!(matches!(flow.submit().await, SubmissionState::Success(_)));

    flow.clear();
    assert_eq!(flow.state(), &SubmissionState::Idle);
    assert_eq!(flow.draft(), &OrderDraft::default());
    assert_eq!(seen.lock().unwrap().len(), 1);
}
