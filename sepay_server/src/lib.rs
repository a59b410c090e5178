//! # SPG server
//! This module hosts the server code for the SePay payment gateway. It is responsible for:
//! * Creating orders, and serving the payment page that tells customers how to pay for them.
//! * Listening for incoming webhook requests from SePay, recording the bank transactions they report and marking
//!   orders as paid when a transfer quotes the order reference.
//! * Answering payment status queries from the payment page.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/`: The order form.
//! * `/order/{id}`: The payment page for an order.
//! * `/api/orders`: Creates a new order.
//! * `/api/orders/{id}`: Fetches an order.
//! * `/api/check-payment-status`: Returns the payment status of an order.
//! * `/api/sepay-webhook`: The webhook route for receiving transaction notifications from SePay.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod pages;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
