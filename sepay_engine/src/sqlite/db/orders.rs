use log::{debug, trace};
use spg_common::Vnd;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderId, PaymentStatus},
    traits::PaymentGatewayError,
};

/// Inserts a new order into the database using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
///
/// The order status is always set to `Unpaid`.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, PaymentGatewayError> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (total, name, payment_status) VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(order.total)
    .bind(order.name)
    .bind(PaymentStatus::Unpaid.to_string())
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order {} inserted for {}", order.id, order.total);
    Ok(order)
}

/// Returns the order with the given id, if it exists.
pub async fn fetch_order(id: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// Returns just the payment status for the order with the given id, if it exists.
pub async fn fetch_payment_status(
    id: OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentStatus>, sqlx::Error> {
    let status = sqlx::query_scalar::<_, String>("SELECT payment_status FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .map(PaymentStatus::from);
    Ok(status)
}

/// Marks the order as `Paid`, provided that it is currently `Unpaid` and its total is within `tolerance` of
/// `amount`.
///
/// The check and the update happen in a single statement, so that an order is paid at most once even if several
/// transfers race for it. Returns `None` (and changes nothing) if no order qualifies.
pub(crate) async fn mark_as_paid_if_payable(
    id: OrderId,
    amount: Vnd,
    tolerance: Vnd,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    trace!("📝️ Looking for unpaid order {id} of {amount} (± {tolerance})");
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET payment_status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND payment_status = $3 AND abs(total - $4) <= $5
            RETURNING *
        "#,
    )
    .bind(PaymentStatus::Paid.to_string())
    .bind(id)
    .bind(PaymentStatus::Unpaid.to_string())
    .bind(amount)
    .bind(tolerance)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}
