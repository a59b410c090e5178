use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{TimeZone, Utc};
use log::debug;
use sepay_engine::{
    db_types::{NewTransaction, Order, OrderId, PaymentStatus, Transaction},
    events::EventProducers,
    OrderFlowApi,
};
use spg_common::Vnd;

use crate::endpoint_tests::mocks::MockDatabase;

pub async fn get_request<F>(path: &str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    send_request(TestRequest::get().uri(path), configure).await
}

pub async fn post_request<F>(path: &str, body: &str, headers: &[(&str, &str)], configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let mut req = TestRequest::post().uri(path).insert_header(("Content-Type", "application/json"));
    for &(name, value) in headers {
        req = req.insert_header((name, value));
    }
    send_request(req.set_payload(body.to_string()), configure).await
}

/// Sends the request to a fresh app, and returns the status code and body of the response. Errors raised by
/// middleware are converted into responses, as the HTTP server would do.
async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => res.into_parts().1.map_into_boxed_body(),
        Err(e) => e.error_response(),
    };
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

pub fn orders_api(db: MockDatabase) -> web::Data<OrderFlowApi<MockDatabase>> {
    web::Data::new(OrderFlowApi::new(db, EventProducers::default()))
}

pub fn order(id: i64, total: i64, status: PaymentStatus) -> Order {
    Order {
        id: OrderId(id),
        total: Vnd::from(total),
        name: "Kem Merino".to_string(),
        payment_status: status,
        created_at: Utc.with_ymd_and_hms(2024, 10, 19, 9, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 10, 19, 9, 30, 0).unwrap(),
    }
}

/// The record the database would create for the given transaction.
pub fn stored_transaction(id: i64, tx: NewTransaction, order_id: Option<OrderId>) -> Transaction {
    Transaction {
        id,
        gateway: tx.gateway,
        transaction_date: tx.transaction_date,
        account_number: tx.account_number,
        sub_account: tx.sub_account,
        amount_in: tx.amount_in,
        amount_out: tx.amount_out,
        accumulated: tx.accumulated,
        code: tx.code,
        transaction_content: tx.transaction_content,
        reference_number: tx.reference_number,
        body: tx.body,
        order_id,
        created_at: Utc.with_ymd_and_hms(2024, 10, 19, 9, 31, 0).unwrap(),
    }
}

/// A stored transfer of 3,000 dong that settled the given order.
pub fn linked_transaction(id: i64, order_id: OrderId) -> Transaction {
    Transaction {
        id,
        gateway: "MBBank".to_string(),
        transaction_date: "2024-10-19 10:15:23".to_string(),
        account_number: "0903252427".to_string(),
        sub_account: None,
        amount_in: Vnd::from(3000),
        amount_out: Vnd::from(0),
        accumulated: Vnd::from(19_077_000),
        code: None,
        transaction_content: format!("NGUYEN VAN A chuyen tien {} FT24293", order_id.reference()),
        reference_number: Some("FT24293514417".to_string()),
        body: None,
        order_id: Some(order_id),
        created_at: Utc.with_ymd_and_hms(2024, 10, 19, 9, 31, 0).unwrap(),
    }
}
