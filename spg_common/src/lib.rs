//! Primitives shared by the SePay payment engine and server.
mod vnd;

pub mod helpers;
pub mod op;
mod secret;

pub use vnd::{Vnd, VndConversionError};
pub use secret::Secret;
