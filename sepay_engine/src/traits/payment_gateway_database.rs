use spg_common::Vnd;
use thiserror::Error;

use crate::db_types::{NewOrder, NewTransaction, Order, OrderId, PaymentStatus, Transaction};

/// This trait defines the behaviour that storage backends need to provide for the SePay payment engine.
///
/// This behaviour includes:
/// * Creating and fetching orders
/// * Recording bank transactions reported by the payment gateway
/// * Settling an order against a transaction
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new order. The order always starts out as `Unpaid`.
    ///
    /// Returns the stored order, including its newly assigned id.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError>;

    /// Fetches the order with the given id, if it exists.
    async fn fetch_order(&self, order_id: OrderId) -> Result<Option<Order>, PaymentGatewayError>;

    /// Fetches only the payment status for the given order. This is polled frequently by the payment page, so
    /// backends may want to make it cheaper than [`Self::fetch_order`].
    async fn fetch_payment_status(&self, order_id: OrderId) -> Result<Option<PaymentStatus>, PaymentGatewayError>;

    /// Records a bank transaction. Transactions are always recorded, whether or not they match an order.
    async fn insert_transaction(&self, transaction: NewTransaction) -> Result<Transaction, PaymentGatewayError>;

    /// Fetches the transaction with the given id, if it exists.
    async fn fetch_transaction(&self, id: i64) -> Result<Option<Transaction>, PaymentGatewayError>;

    /// Settles an order with a recorded transaction, in a single atomic step:
    /// * The order must exist and be `Unpaid`.
    /// * The order total must be within `tolerance` of `amount`.
    /// * The order is marked as `Paid`, and the transaction is linked to the order.
    ///
    /// Returns the updated order and the linked transaction, or `None` if there was no order matching these criteria,
    /// in which case nothing is changed.
    async fn settle_order(
        &self,
        order_id: OrderId,
        transaction_id: i64,
        amount: Vnd,
        tolerance: Vnd,
    ) -> Result<Option<(Order, Transaction)>, PaymentGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("The database could not be initialised. {0}")]
    InitializationError(String),
    #[error("The order amount must be greater than zero. Got {0}")]
    InvalidAmount(Vnd),
    #[error("The requested transaction {0} does not exist")]
    TransactionNotFound(i64),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for PaymentGatewayError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        PaymentGatewayError::InitializationError(e.to_string())
    }
}
