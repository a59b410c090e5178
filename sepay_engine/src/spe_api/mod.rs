//! # SePay payment engine public API
//!
//! [`order_flow_api`] is the primary API for creating orders, answering payment status queries, and reconciling the
//! bank transactions reported by the SePay webhook against the order book.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements
//! [`crate::traits::PaymentGatewayDatabase`]:
//!
//! ```rust,ignore
//! use sepay_engine::{events::EventProducers, OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/sepay_store.db", 5).await?;
//! let api = OrderFlowApi::new(db, EventProducers::default());
//! let order = api.create_order(Vnd::from(3000)).await?;
//! ```
pub mod order_flow_api;
