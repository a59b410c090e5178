//! Order references in bank transfer descriptions.
//!
//! Customers are asked to quote `DH<order id>` (e.g. `DH123`) in the description of their bank transfer. Banks
//! routinely decorate the description with their own text, so the reference may appear anywhere in it, e.g.
//! `MBVCB.3278614.DH123.Chuyen tien`.
use std::sync::OnceLock;

use log::trace;
use regex::Regex;

use crate::db_types::OrderId;

pub const ORDER_REFERENCE_PREFIX: &str = "DH";

fn order_reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // ASCII digits only. Unicode `\d` also matches e.g. Arabic-Indic digits
        Regex::new(&format!(r"{ORDER_REFERENCE_PREFIX}([0-9]+)")).expect("The order reference pattern is a valid regex")
    })
}

/// Extracts the order id from the first `DH<digits>` occurrence in `content`.
///
/// Only the first occurrence is considered. `None` is returned if there is no reference, or if the digits do not
/// describe a valid order id (zero, or too large to be an id).
pub fn extract_order_id(content: &str) -> Option<OrderId> {
    let digits = order_reference_regex().captures(content)?.get(1)?.as_str();
    let result = digits.parse::<i64>().ok().filter(|id| *id > 0).map(OrderId::from);
    trace!("🔍️ Order reference in '{content}': {result:?}");
    result
}
