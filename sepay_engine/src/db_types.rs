use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{de, Deserialize, Deserializer, Serialize};
use spg_common::Vnd;
use sqlx::{FromRow, Type};
use thiserror::Error;

use crate::helpers::ORDER_REFERENCE_PREFIX;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------        OrderId        ---------------------------------------------------------
/// The numeric identifier of an order. Customers quote it in their transfer description as `DH<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize)]
#[sqlx(transparent)]
pub struct OrderId(pub i64);

impl OrderId {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// The text a customer must put in the transfer description so that the payment is matched to this order.
    pub fn reference(&self) -> String {
        format!("{ORDER_REFERENCE_PREFIX}{}", self.0)
    }
}

impl From<i64> for OrderId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for OrderId {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(ConversionError(format!("'{s}' is not a valid order id"))),
        }
    }
}

/// Order ids arrive as JSON numbers from API clients, and as strings from the payment page (route parameters).
impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: Deserializer<'de> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(i64),
            Text(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Int(id) if id > 0 => Ok(Self(id)),
            Repr::Int(id) => Err(de::Error::custom(format!("{id} is not a valid order id"))),
            Repr::Text(s) => s.parse().map_err(de::Error::custom),
        }
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------     PaymentStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// The order has been created, and no matching transfer has been received yet.
    Unpaid,
    /// A transfer quoting the order reference, for the right amount, has been received.
    Paid,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "Unpaid"),
            PaymentStatus::Paid => write!(f, "Paid"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unpaid" => Ok(Self::Unpaid),
            "Paid" => Ok(Self::Paid),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid payment status: {value}. But this conversion cannot fail. Defaulting to Unpaid");
            PaymentStatus::Unpaid
        })
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub total: Vnd,
    /// The product description shown on the payment page
    pub name: String,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

//--------------------------------------       NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub total: Vnd,
    pub name: String,
}

impl NewOrder {
    pub fn new<S: Into<String>>(total: Vnd, name: S) -> Self {
        Self { total, name: name.into() }
    }
}

//--------------------------------------     TransferType      ---------------------------------------------------------
/// The direction of a bank transfer, relative to the merchant's account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferType {
    In,
    Out,
}

impl TransferType {
    /// Splits a transfer amount into `(amount_in, amount_out)`.
    pub fn split(transfer_type: Option<TransferType>, amount: Vnd) -> (Vnd, Vnd) {
        let zero = Vnd::default();
        match transfer_type {
            Some(TransferType::In) => (amount, zero),
            Some(TransferType::Out) => (zero, amount),
            None => (zero, zero),
        }
    }
}

impl Display for TransferType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferType::In => write!(f, "in"),
            TransferType::Out => write!(f, "out"),
        }
    }
}

//--------------------------------------    NewTransaction     ---------------------------------------------------------
/// A bank transfer, as reported by the payment gateway, that has not been recorded yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTransaction {
    /// The bank, e.g. "MBBank"
    pub gateway: String,
    /// The transaction timestamp, as reported by the bank
    pub transaction_date: String,
    pub account_number: String,
    pub sub_account: Option<String>,
    pub amount_in: Vnd,
    pub amount_out: Vnd,
    /// The account balance after the transfer
    pub accumulated: Vnd,
    /// The payment code, if the gateway managed to recognise one
    pub code: Option<String>,
    /// The transfer description. This is where the customer quotes the order reference.
    pub transaction_content: String,
    /// The bank's reference number for the transfer
    pub reference_number: Option<String>,
    /// The full SMS/notification text
    pub body: Option<String>,
}

impl NewTransaction {
    pub fn new<S: Into<String>>(gateway: S, transaction_date: S, account_number: S) -> Self {
        Self {
            gateway: gateway.into(),
            transaction_date: transaction_date.into(),
            account_number: account_number.into(),
            ..Default::default()
        }
    }

    pub fn with_transfer(mut self, transfer_type: Option<TransferType>, amount: Vnd) -> Self {
        let (amount_in, amount_out) = TransferType::split(transfer_type, amount);
        self.amount_in = amount_in;
        self.amount_out = amount_out;
        self
    }

    pub fn with_content<S: Into<String>>(mut self, content: S) -> Self {
        self.transaction_content = content.into();
        self
    }
}

//--------------------------------------      Transaction      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub gateway: String,
    pub transaction_date: String,
    pub account_number: String,
    pub sub_account: Option<String>,
    pub amount_in: Vnd,
    pub amount_out: Vnd,
    pub accumulated: Vnd,
    pub code: Option<String>,
    pub transaction_content: String,
    pub reference_number: Option<String>,
    pub body: Option<String>,
    /// The order this transfer settled, if any
    pub order_id: Option<OrderId>,
    pub created_at: DateTime<Utc>,
}
