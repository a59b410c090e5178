//! Drives a complete purchase through the HTTP API, backed by a real SQLite database.
use std::env::temp_dir;

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use sepay_engine::{events::EventProducers, OrderFlowApi, SqliteDatabase};
use serde_json::Value;

use super::helpers::{get_request, post_request};
use crate::{
    middleware::ApiKeyMiddlewareFactory,
    routes::{CheckPaymentStatusRoute, CreateOrderRoute, OrderByIdRoute, SepayWebhookRoute},
};

async fn new_database() -> SqliteDatabase {
    let nonce = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let path = temp_dir().join(format!("spg_server_flow_{}_{nonce}.db", std::process::id()));
    let url = format!("sqlite://{}", path.display());
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

fn configure(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = OrderFlowApi::new(db, EventProducers::default());
        cfg.service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(CheckPaymentStatusRoute::<SqliteDatabase>::new())
            .service(SepayWebhookRoute::<SqliteDatabase>::new(ApiKeyMiddlewareFactory::new(None)))
            .app_data(web::Data::new(api));
    }
}

fn webhook_payload(content: &str, amount: i64) -> String {
    serde_json::json!({
        "id": 1,
        "gateway": "MBBank",
        "transactionDate": "2024-10-19 11:00:00",
        "accountNumber": "0903252427",
        "content": content,
        "transferType": "in",
        "transferAmount": amount,
        "accumulated": 5_000_000,
        "referenceCode": "FT24293000042",
    })
    .to_string()
}

async fn payment_status(db: &SqliteDatabase, order_id: i64) -> (StatusCode, String) {
    let request = format!(r#"{{"order_id": {order_id}}}"#);
    post_request("/check-payment-status", &request, &[], configure(db.clone())).await
}

#[actix_web::test]
async fn order_is_paid_by_matching_transfer() {
    let _ = env_logger::try_init();
    let db = new_database().await;

    let (status, body) = post_request("/orders", r#"{"total": "3000"}"#, &[], configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    let order_id = body["order_id"].as_i64().expect("order_id should be a number");
    assert_eq!(body["order"]["payment_status"], "Unpaid");
    assert_eq!(payment_status(&db, order_id).await.1, r#"{"payment_status":"Unpaid"}"#);

    // The wrong amount does not pay for the order
    let payload = webhook_payload(&format!("CT DH{order_id} thanh toan"), 2000);
    let (status, body) = post_request("/sepay-webhook", &payload, &[], configure(db.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, format!(r#"{{"success":false,"message":"Order not found. Order_id: {order_id}"}}"#));
    assert_eq!(payment_status(&db, order_id).await.1, r#"{"payment_status":"Unpaid"}"#);

    let payload = webhook_payload(&format!("CT DH{order_id} thanh toan"), 3000);
    let (status, body) = post_request("/sepay-webhook", &payload, &[], configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true}"#);
    assert_eq!(payment_status(&db, order_id).await.1, r#"{"payment_status":"Paid"}"#);

    // A repeat notification finds no unpaid order
    let (status, _) = post_request("/sepay-webhook", &payload, &[], configure(db.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get_request(&format!("/orders/{order_id}"), configure(db.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["order"]["payment_status"], "Paid");
    assert_eq!(body["order"]["total"], 3000);
}
