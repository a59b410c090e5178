//! SePay Payment Engine
//!
//! The SePay Payment Engine lets merchants accept Vietnamese bank transfers as payment for orders. Customers quote a
//! reference code (`DH<order id>`) in the transfer description, and the SePay gateway reports the transfer via a
//! webhook. This library contains the core logic for matching those transfers with orders. It is web-framework
//! agnostic.
//!
//! The library is divided into two main sections:
//! 1. Storage ([`traits`] and, with the `sqlite` feature, [`SqliteDatabase`]). The data types used in the database
//!    are defined in the [`db_types`] module and are public.
//! 2. The payment engine public API ([`OrderFlowApi`]), which creates orders, answers payment status queries and
//!    reconciles bank transactions with orders.
//!
//! The engine also emits events that can be subscribed to (see [`events`]). For example, when a transfer settles
//! an order, an `OrderPaidEvent` is emitted.
pub mod db_types;
pub mod events;
pub mod helpers;
mod spe_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::{db::db_url, SqliteDatabase};
pub use spe_api::order_flow_api::{OrderFlowApi, DEFAULT_PRODUCT_NAME};
pub use traits::{PaymentGatewayDatabase, PaymentGatewayError, ReconciliationResult};
