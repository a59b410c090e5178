use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderId, Transaction};

/// The outcome of matching an incoming bank transaction against the order book.
///
/// In every case, the transaction has been recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReconciliationResult {
    /// The transaction settled the order, which is now `Paid`.
    Paid { order: Order, transaction: Transaction },
    /// The transfer description did not contain an order reference.
    NoOrderReference { transaction: Transaction },
    /// The transfer quoted an order that does not exist, is already paid, or whose total does not match the amount
    /// transferred.
    OrderNotPayable { order_id: OrderId, transaction: Transaction },
}

impl ReconciliationResult {
    pub fn transaction(&self) -> &Transaction {
        match self {
            Self::Paid { transaction, .. } => transaction,
            Self::NoOrderReference { transaction } => transaction,
            Self::OrderNotPayable { transaction, .. } => transaction,
        }
    }

    pub fn paid_order(&self) -> Option<&Order> {
        match self {
            Self::Paid { order, .. } => Some(order),
            _ => None,
        }
    }
}
