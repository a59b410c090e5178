use serde::{Deserialize, Serialize};

use crate::db_types::{Order, Transaction};

/// Emitted once an order has been settled by a bank transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
    pub transaction: Transaction,
}

impl OrderPaidEvent {
    pub fn new(order: Order, transaction: Transaction) -> Self {
        Self { order, transaction }
    }
}
