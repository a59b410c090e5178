use std::fmt::Debug;

use log::*;
use spg_common::Vnd;

use crate::{
    db_types::{NewOrder, NewTransaction, Order, OrderId, PaymentStatus, Transaction},
    events::{EventProducers, OrderPaidEvent},
    helpers::extract_order_id,
    traits::{PaymentGatewayDatabase, PaymentGatewayError, ReconciliationResult},
};

/// The product name given to orders when none is configured.
pub const DEFAULT_PRODUCT_NAME: &str = "Kem Merino";

/// `OrderFlowApi` is the primary API for handling orders, and for reconciling incoming bank transfers with them.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
    product_name: String,
    amount_tolerance: Vnd,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({}, ± {})", self.product_name, self.amount_tolerance)
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, product_name: DEFAULT_PRODUCT_NAME.to_string(), amount_tolerance: Vnd::default() }
    }

    /// Sets the product name that new orders are created with.
    pub fn with_product_name<S: Into<String>>(mut self, name: S) -> Self {
        self.product_name = name.into();
        self
    }

    /// Sets how far a transferred amount may deviate from the order total and still settle the order.
    /// The default is zero, i.e. the amounts must match exactly.
    pub fn with_amount_tolerance(mut self, tolerance: Vnd) -> Self {
        self.amount_tolerance = tolerance;
        self
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn amount_tolerance(&self) -> Vnd {
        self.amount_tolerance
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B> OrderFlowApi<B>
where B: PaymentGatewayDatabase
{
    /// Creates a new, unpaid order for the given total.
    pub async fn create_order(&self, total: Vnd) -> Result<Order, PaymentGatewayError> {
        if !total.is_positive() {
            debug!("🔄️📦️ Rejecting order with a total of {total}");
            return Err(PaymentGatewayError::InvalidAmount(total));
        }
        let order = self.db.insert_order(NewOrder::new(total, self.product_name.as_str())).await?;
        info!(
            "🔄️📦️ Order {} created for {total}. Awaiting a transfer with reference {}",
            order.id,
            order.id.reference()
        );
        Ok(order)
    }

    pub async fn fetch_order(&self, order_id: OrderId) -> Result<Option<Order>, PaymentGatewayError> {
        self.db.fetch_order(order_id).await
    }

    pub async fn payment_status(&self, order_id: OrderId) -> Result<Option<PaymentStatus>, PaymentGatewayError> {
        self.db.fetch_payment_status(order_id).await
    }

    /// Handles a bank transaction reported by the payment gateway.
    ///
    /// 1. The transaction is recorded, whatever happens next.
    /// 2. The order reference (`DH<id>`) is extracted from the transfer description.
    /// 3. If that order is unpaid, and the amount received matches its total (within the configured tolerance), the
    ///    order is marked as paid and the `OrderPaid` hook is triggered.
    ///
    /// Outgoing transfers have no incoming amount, and so never pay for an order.
    ///
    /// This is [`Self::record_transaction`] followed by [`Self::reconcile_transaction`]. Call those separately to tell
    /// a failure to record the transaction apart from a failure to settle the order.
    pub async fn process_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<ReconciliationResult, PaymentGatewayError> {
        let transaction = self.record_transaction(transaction).await?;
        self.reconcile_transaction(transaction).await
    }

    /// Stores a bank transaction, without trying to match it to an order.
    pub async fn record_transaction(&self, transaction: NewTransaction) -> Result<Transaction, PaymentGatewayError> {
        let transaction = self.db.insert_transaction(transaction).await?;
        trace!("🔄️💰️ Transaction #{} saved", transaction.id);
        Ok(transaction)
    }

    /// Settles the order quoted by a recorded transaction, if there is one and the amount matches.
    pub async fn reconcile_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<ReconciliationResult, PaymentGatewayError> {
        trace!("🔄️💰️ Looking for an order reference in transaction #{}", transaction.id);
        let Some(order_id) = extract_order_id(&transaction.transaction_content) else {
            info!(
                "🔄️💰️ Transaction #{} does not reference an order. Content: '{}'",
                transaction.id, transaction.transaction_content
            );
            return Ok(ReconciliationResult::NoOrderReference { transaction });
        };
        let amount = transaction.amount_in;
        let settled = self.db.settle_order(order_id, transaction.id, amount, self.amount_tolerance).await?;
        match settled {
            Some((order, transaction)) => {
                info!("🔄️💰️ Order {order_id} has been paid with transaction #{}", transaction.id);
                self.call_order_paid_hook(&order, &transaction).await;
                Ok(ReconciliationResult::Paid { order, transaction })
            },
            None => {
                warn!(
                    "🔄️💰️ Transaction #{} of {amount} references order {order_id}, but there is no unpaid order for that \
                     amount",
                    transaction.id
                );
                Ok(ReconciliationResult::OrderNotPayable { order_id, transaction })
            },
        }
    }

    async fn call_order_paid_hook(&self, order: &Order, transaction: &Transaction) {
        for emitter in &self.producers.order_paid_producer {
            debug!("🔄️📦️ Notifying order paid hook subscribers");
            let event = OrderPaidEvent::new(order.clone(), transaction.clone());
            emitter.publish_event(event).await;
        }
    }
}
