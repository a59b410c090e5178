use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewTransaction, OrderId, Transaction},
    traits::PaymentGatewayError,
};

/// Records a bank transaction. Duplicate notifications from the gateway are recorded as separate rows; they can
/// never pay an order twice since settlement only applies to unpaid orders.
pub async fn insert_transaction(
    transaction: NewTransaction,
    conn: &mut SqliteConnection,
) -> Result<Transaction, PaymentGatewayError> {
    let transaction: Transaction = sqlx::query_as(
        r#"
            INSERT INTO transactions (
                gateway,
                transaction_date,
                account_number,
                sub_account,
                amount_in,
                amount_out,
                accumulated,
                code,
                transaction_content,
                reference_number,
                body
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *;
        "#,
    )
    .bind(transaction.gateway)
    .bind(transaction.transaction_date)
    .bind(transaction.account_number)
    .bind(transaction.sub_account)
    .bind(transaction.amount_in)
    .bind(transaction.amount_out)
    .bind(transaction.accumulated)
    .bind(transaction.code)
    .bind(transaction.transaction_content)
    .bind(transaction.reference_number)
    .bind(transaction.body)
    .fetch_one(conn)
    .await?;
    debug!(
        "🏦️ Transaction #{} recorded. In: {}, Out: {}, Content: '{}'",
        transaction.id, transaction.amount_in, transaction.amount_out, transaction.transaction_content
    );
    Ok(transaction)
}

pub async fn fetch_transaction(id: i64, conn: &mut SqliteConnection) -> Result<Option<Transaction>, sqlx::Error> {
    let transaction =
        sqlx::query_as("SELECT * FROM transactions WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(transaction)
}

/// Records that the transaction settled the given order.
pub(crate) async fn link_to_order(
    id: i64,
    order_id: OrderId,
    conn: &mut SqliteConnection,
) -> Result<Transaction, PaymentGatewayError> {
    let transaction = sqlx::query_as("UPDATE transactions SET order_id = $1 WHERE id = $2 RETURNING *")
        .bind(order_id)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or(PaymentGatewayError::TransactionNotFound(id))?;
    Ok(transaction)
}
