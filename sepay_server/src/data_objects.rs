use std::fmt::Display;

use sepay_engine::db_types::{NewTransaction, Order, OrderId, PaymentStatus, TransferType};
use serde::{Deserialize, Serialize};
use spg_common::Vnd;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

//----------------------------------------------   Orders  ----------------------------------------------------
/// Body of `POST /api/orders`. The total may be given as a number or as a numeric string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewOrderRequest {
    #[serde(default)]
    pub total: Option<Vnd>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderResponse {
    pub success: bool,
    pub order_id: OrderId,
    pub order: Order,
}

impl NewOrderResponse {
    pub fn new(order: Order) -> Self {
        Self { success: true, order_id: order.id, order }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: Order,
}

impl OrderResponse {
    pub fn new(order: Order) -> Self {
        Self { success: true, order }
    }
}

//----------------------------------------------   Payment status  ----------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentStatusRequest {
    #[serde(default)]
    pub order_id: Option<OrderId>,
}

/// Response to `POST /api/check-payment-status`. `payment_status` is one of `Unpaid`, `Paid` or `order_not_found`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    pub payment_status: String,
}

impl PaymentStatusResponse {
    pub const ORDER_NOT_FOUND: &'static str = "order_not_found";

    pub fn order_not_found() -> Self {
        Self { payment_status: Self::ORDER_NOT_FOUND.to_string() }
    }
}

impl From<PaymentStatus> for PaymentStatusResponse {
    fn from(status: PaymentStatus) -> Self {
        Self { payment_status: status.to_string() }
    }
}

//----------------------------------------------   Webhook  ----------------------------------------------------
/// The payload that SePay posts to the webhook for every transaction on the merchant's bank account.
///
/// Every field is optional at the serde level, so that incomplete notifications can be rejected with a meaningful
/// message rather than a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SePayWebhookData {
    /// SePay's own transaction id
    pub id: Option<i64>,
    pub gateway: Option<String>,
    pub transaction_date: Option<String>,
    pub account_number: Option<String>,
    pub sub_account: Option<String>,
    pub code: Option<String>,
    /// The transfer description, containing the order reference
    pub content: Option<String>,
    /// Either "in" or "out"
    pub transfer_type: Option<String>,
    pub description: Option<String>,
    pub transfer_amount: Option<Vnd>,
    pub reference_code: Option<String>,
    pub accumulated: Option<Vnd>,
}

impl SePayWebhookData {
    pub fn transfer_type(&self) -> Option<TransferType> {
        match self.transfer_type.as_deref().map(str::trim) {
            Some("in") => Some(TransferType::In),
            Some("out") => Some(TransferType::Out),
            _ => None,
        }
    }

    /// Converts the notification into a transaction record, or returns `None` if any of `gateway`, `transactionDate`
    /// or `accountNumber` is missing or blank.
    pub fn into_new_transaction(self) -> Option<NewTransaction> {
        let transfer_type = self.transfer_type();
        let amount = self.transfer_amount.unwrap_or_default();
        let gateway = non_empty(self.gateway)?;
        let transaction_date = non_empty(self.transaction_date)?;
        let account_number = non_empty(self.account_number)?;
        let mut tx = NewTransaction::new(gateway, transaction_date, account_number)
            .with_transfer(transfer_type, amount)
            .with_content(self.content.unwrap_or_default());
        tx.sub_account = non_empty(self.sub_account);
        tx.accumulated = self.accumulated.unwrap_or_default();
        tx.code = self.code;
        tx.reference_number = self.reference_code;
        tx.body = non_empty(self.description);
        Some(tx)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
