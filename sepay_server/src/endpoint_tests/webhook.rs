use actix_web::{http::StatusCode, web::ServiceConfig};
use sepay_engine::{
    db_types::{OrderId, PaymentStatus},
    PaymentGatewayError,
};
use spg_common::{Secret, Vnd};

use super::{
    helpers::{get_request, linked_transaction, order, orders_api, post_request, stored_transaction},
    mocks::MockDatabase,
};
use crate::{
    middleware::ApiKeyMiddlewareFactory,
    routes::{sepay_webhook_get, SepayWebhookRoute},
};

const API_KEY: &str = "Apikey 8YbGcU1vMTn3Vq2Rf9";

const PAYMENT_FOR_ORDER_1: &str = r#"{
    "id": 92704,
    "gateway": "MBBank",
    "transactionDate": "2024-10-19 10:15:23",
    "accountNumber": "0903252427",
    "code": null,
    "content": "NGUYEN VAN A chuyen tien DH1 FT24293",
    "transferType": "in",
    "transferAmount": 3000,
    "accumulated": 19077000,
    "subAccount": null,
    "referenceCode": "FT24293514417",
    "description": "BankAPINotify NGUYEN VAN A chuyen tien DH1 FT24293"
}"#;

fn configure(db: MockDatabase, key: Option<&str>) -> impl FnOnce(&mut ServiceConfig) {
    let key = key.map(|k| Secret::new(k.to_string()));
    move |cfg| {
        cfg.service(SepayWebhookRoute::<MockDatabase>::new(ApiKeyMiddlewareFactory::new(key)))
            .service(sepay_webhook_get)
            .app_data(orders_api(db));
    }
}

/// A database that records transactions, and settles order #1 for 3,000 dong.
fn settling_database() -> MockDatabase {
    let mut db = MockDatabase::new();
    db.expect_insert_transaction().times(1).returning(|tx| Ok(stored_transaction(11, tx, None)));
    db.expect_settle_order()
        .withf(|order_id, tx_id, amount, tolerance| {
            *order_id == OrderId(1) && *tx_id == 11 && *amount == Vnd::from(3000) && *tolerance == Vnd::from(0)
        })
        .times(1)
        .returning(|order_id, tx_id, _, _| {
            Ok(Some((order(order_id.value(), 3000, PaymentStatus::Paid), linked_transaction(tx_id, order_id))))
        });
    db.expect_fetch_transaction().never();
    db
}

fn untouched_database() -> MockDatabase {
    let mut db = MockDatabase::new();
    db.expect_insert_transaction().never();
    db.expect_settle_order().never();
    db
}

#[actix_web::test]
async fn webhook_pays_order() {
    let _ = env_logger::try_init();
    let (status, body) = post_request(
        "/sepay-webhook",
        PAYMENT_FOR_ORDER_1,
        &[("Authorization", API_KEY)],
        configure(settling_database(), Some("8YbGcU1vMTn3Vq2Rf9")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true}"#);
}

#[actix_web::test]
async fn webhook_records_transaction_details() {
    let _ = env_logger::try_init();
    let mut db = MockDatabase::new();
    db.expect_insert_transaction()
        .withf(|tx| {
            tx.gateway == "MBBank" &&
                tx.transaction_date == "2024-10-19 10:15:23" &&
                tx.account_number == "0903252427" &&
                tx.amount_in == Vnd::from(3000) &&
                tx.amount_out == Vnd::from(0) &&
                tx.accumulated == Vnd::from(19_077_000) &&
                tx.transaction_content == "NGUYEN VAN A chuyen tien DH1 FT24293" &&
                tx.reference_number.as_deref() == Some("FT24293514417") &&
                tx.body.as_deref() == Some("BankAPINotify NGUYEN VAN A chuyen tien DH1 FT24293") &&
                tx.sub_account.is_none() &&
                tx.code.is_none()
        })
        .times(1)
        .returning(|tx| Ok(stored_transaction(3, tx, None)));
    db.expect_settle_order().returning(|_, _, _, _| Ok(None));
    let (status, body) = post_request("/sepay-webhook", PAYMENT_FOR_ORDER_1, &[], configure(db, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"success":false,"message":"Order not found. Order_id: 1"}"#);
}

#[actix_web::test]
async fn webhook_without_api_key_configured() {
    let _ = env_logger::try_init();
    let (status, body) =
        post_request("/sepay-webhook", PAYMENT_FOR_ORDER_1, &[], configure(settling_database(), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true}"#);
}

#[actix_web::test]
async fn webhook_missing_authorization_header() {
    let _ = env_logger::try_init();
    let (status, body) = post_request(
        "/sepay-webhook",
        PAYMENT_FOR_ORDER_1,
        &[],
        configure(untouched_database(), Some("8YbGcU1vMTn3Vq2Rf9")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"success":false,"message":"Unauthorized: Missing Authorization header"}"#);
}

#[actix_web::test]
async fn webhook_wrong_authorization_format() {
    let _ = env_logger::try_init();
    for header in ["Bearer 8YbGcU1vMTn3Vq2Rf9", "8YbGcU1vMTn3Vq2Rf9", "apikey 8YbGcU1vMTn3Vq2Rf9"] {
        let (status, body) = post_request(
            "/sepay-webhook",
            PAYMENT_FOR_ORDER_1,
            &[("Authorization", header)],
            configure(untouched_database(), Some("8YbGcU1vMTn3Vq2Rf9")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            r#"{"success":false,"message":"Unauthorized: Invalid Authorization format. Expected \"Apikey <api_key>\""}"#
        );
    }
}

#[actix_web::test]
async fn webhook_wrong_api_key() {
    let _ = env_logger::try_init();
    for header in ["Apikey not-the-key", "Apikey ", "Apikey 8YbGcU1vMTn3Vq2Rf9X"] {
        let (status, body) = post_request(
            "/sepay-webhook",
            PAYMENT_FOR_ORDER_1,
            &[("Authorization", header)],
            configure(untouched_database(), Some("8YbGcU1vMTn3Vq2Rf9")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header: {header}");
        assert_eq!(body, r#"{"success":false,"message":"Unauthorized: Invalid API key"}"#);
    }
}

#[actix_web::test]
async fn webhook_missing_fields() {
    let _ = env_logger::try_init();
    let incomplete = [
        "",
        "null",
        "[]",
        r#"{"transactionDate": "2024-10-19 10:15:23", "accountNumber": "0903252427", "content": "DH1"}"#,
        r#"{"gateway": "MBBank", "accountNumber": "0903252427", "content": "DH1"}"#,
        r#"{"gateway": "MBBank", "transactionDate": "2024-10-19 10:15:23", "accountNumber": "", "content": "DH1"}"#,
    ];
    for payload in incomplete {
        let (status, body) =
            post_request("/sepay-webhook", payload, &[("Authorization", API_KEY)], configure(untouched_database(), None))
                .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {payload}");
        assert_eq!(body, r#"{"success":false,"message":"No data or missing required fields"}"#);
    }
}

#[actix_web::test]
async fn webhook_without_order_reference() {
    let _ = env_logger::try_init();
    let payload = PAYMENT_FOR_ORDER_1.replace("DH1", "tien an trua");
    let mut db = MockDatabase::new();
    db.expect_insert_transaction().times(1).returning(|tx| Ok(stored_transaction(12, tx, None)));
    db.expect_settle_order().never();
    let (status, body) = post_request("/sepay-webhook", &payload, &[], configure(db, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"success":false,"message":"Order not found. Order_id: null"}"#);
}

#[actix_web::test]
async fn webhook_for_paid_or_mismatched_order() {
    let _ = env_logger::try_init();
    let payload = PAYMENT_FOR_ORDER_1.replace("DH1 ", "DH8124 ");
    let mut db = MockDatabase::new();
    db.expect_insert_transaction().times(1).returning(|tx| Ok(stored_transaction(13, tx, None)));
    db.expect_settle_order().withf(|order_id, _, _, _| *order_id == OrderId(8124)).times(1).returning(|_, _, _, _| Ok(None));
    let (status, body) = post_request("/sepay-webhook", &payload, &[], configure(db, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"success":false,"message":"Order not found. Order_id: 8124"}"#);
}

#[actix_web::test]
async fn webhook_database_failure() {
    let _ = env_logger::try_init();
    let mut db = MockDatabase::new();
    db.expect_insert_transaction().returning(|_| Err(PaymentGatewayError::DatabaseError("database is locked".into())));
    db.expect_settle_order().never();
    let (status, body) = post_request("/sepay-webhook", PAYMENT_FOR_ORDER_1, &[], configure(db, None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Cannot insert record to database"), "{body}");
}

#[actix_web::test]
async fn webhook_settlement_failure() {
    let _ = env_logger::try_init();
    let mut db = MockDatabase::new();
    db.expect_insert_transaction().times(1).returning(|tx| Ok(stored_transaction(14, tx, None)));
    db.expect_settle_order()
        .times(1)
        .returning(|_, _, _, _| Err(PaymentGatewayError::DatabaseError("database is locked".into())));
    let (status, body) = post_request("/sepay-webhook", PAYMENT_FOR_ORDER_1, &[], configure(db, None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.starts_with(r#"{"success":false,"message":"Cannot update order: "#), "{body}");
    assert!(body.contains("database is locked"), "{body}");
}

#[actix_web::test]
async fn webhook_only_accepts_post() {
    let _ = env_logger::try_init();
    let (status, body) = get_request("/sepay-webhook", configure(untouched_database(), None)).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, r#"{"message":"Method not allowed"}"#);
}
