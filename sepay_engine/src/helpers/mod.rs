mod order_reference;

pub use order_reference::{extract_order_id, ORDER_REFERENCE_PREFIX};
