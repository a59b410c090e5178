//! #  Database backend contracts.
//!
//! The payment engine does not talk to a database directly. Instead, it relies on a backend implementing
//! [`PaymentGatewayDatabase`], which stores orders and bank transactions and performs the atomic
//! "settle this order with this transfer" step.
//!
//! [`crate::SqliteDatabase`] is the production backend. The server tests use a mock.
mod data_objects;
mod payment_gateway_database;

pub use data_objects::ReconciliationResult;
pub use payment_gateway_database::{PaymentGatewayDatabase, PaymentGatewayError};
