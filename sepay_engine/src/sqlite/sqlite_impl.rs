//! `SqliteDatabase` is a concrete implementation of a SePay payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements [`PaymentGatewayDatabase`].
use std::fmt::Debug;

use log::*;
use spg_common::Vnd;
use sqlx::SqlitePool;

use super::db::{new_pool, orders, transactions};
use crate::{
    db_types::{NewOrder, NewTransaction, Order, OrderId, PaymentStatus, Transaction},
    traits::{PaymentGatewayDatabase, PaymentGatewayError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order(order, &mut conn).await
    }

    async fn fetch_order(&self, order_id: OrderId) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_payment_status(&self, order_id: OrderId) -> Result<Option<PaymentStatus>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let status = orders::fetch_payment_status(order_id, &mut conn).await?;
        Ok(status)
    }

    async fn insert_transaction(&self, transaction: NewTransaction) -> Result<Transaction, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        transactions::insert_transaction(transaction, &mut conn).await
    }

    async fn fetch_transaction(&self, id: i64) -> Result<Option<Transaction>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let transaction = transactions::fetch_transaction(id, &mut conn).await?;
        Ok(transaction)
    }

    /// In a single atomic transaction,
    /// * marks the unpaid order with the given id and a total within `tolerance` of `amount` as `Paid`,
    /// * links the bank transaction to the order.
    ///
    /// If no order qualifies, the database transaction is rolled back and `None` is returned.
    async fn settle_order(
        &self,
        order_id: OrderId,
        transaction_id: i64,
        amount: Vnd,
        tolerance: Vnd,
    ) -> Result<Option<(Order, Transaction)>, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let Some(order) = orders::mark_as_paid_if_payable(order_id, amount, tolerance, &mut tx).await? else {
            debug!("🗃️ No unpaid order {order_id} for {amount} (± {tolerance}). Nothing to settle");
            return Ok(None);
        };
        let transaction = transactions::link_to_order(transaction_id, order_id, &mut tx).await?;
        tx.commit().await?;
        info!("🗃️ Order {order_id} settled by transaction #{transaction_id}");
        Ok(Some((order, transaction)))
    }

    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        self.pool.close().await;
        Ok(())
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, creating the database if necessary and bringing its schema up to date.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, PaymentGatewayError> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        sqlx::migrate!("./src/sqlite/migrations").run(&pool).await?;
        debug!("🗃️ Database migrations are up to date");
        let url = url.to_string();
        Ok(Self { url, pool })
    }
}
