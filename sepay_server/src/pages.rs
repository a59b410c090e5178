//! Server-rendered HTML pages: the order form and the payment page.
//!
//! Pages are plain HTML templates with `{{placeholder}}` markers. Every value is HTML-escaped before it is inserted.
use std::collections::HashMap;

use log::warn;
use sepay_engine::db_types::Order;

use crate::config::PaymentPageConfig;

const LAYOUT: &str = include_str!("./templates/layout.html");
const INDEX: &str = include_str!("./templates/index.html");
const ORDER: &str = include_str!("./templates/order.html");
const NOT_FOUND: &str = include_str!("./templates/not_found.html");

const PAGE_TITLE: &str = "SePay Demo";
const QR_CODE_BASE_URL: &str = "https://qr.sepay.vn/img";
const BANK_LOGO_BASE_URL: &str = "https://qr.sepay.vn/assets/img/banklogo";

/// The amount the order form is pre-filled with.
pub const DEFAULT_ORDER_TOTAL: i64 = 3000;

pub fn render_index() -> String {
    let body = fill_template(INDEX, &[("default_total", DEFAULT_ORDER_TOTAL.to_string())]);
    render_layout(PAGE_TITLE, &body)
}

pub fn render_not_found() -> String {
    render_layout(PAGE_TITLE, NOT_FOUND)
}

pub fn render_order_page(order: &Order, config: &PaymentPageConfig) -> String {
    let (paid_display, unpaid_display) = if order.is_paid() { ("block", "none") } else { ("none", "block") };
    let body = fill_template(ORDER, &[
        ("order_id", order.id.value().to_string()),
        ("reference", order.id.reference()),
        ("product_name", order.name.clone()),
        ("amount", order.total.to_string()),
        ("payment_status", order.payment_status.to_string()),
        ("paid_display", paid_display.to_string()),
        ("unpaid_display", unpaid_display.to_string()),
        ("qr_code_url", qr_code_url(order, config)),
        ("bank_logo_url", bank_logo_url(&config.bank_code)),
        ("bank_code", config.bank_code.clone()),
        ("account_name", config.account_name.clone()),
        ("account_number", config.account_number.clone()),
        ("poll_interval_ms", config.poll_interval.as_millis().to_string()),
    ]);
    render_layout(&format!("{PAGE_TITLE} | {}", order.id.reference()), &body)
}

/// The SePay QR code image for a transfer that pays the given order.
pub fn qr_code_url(order: &Order, config: &PaymentPageConfig) -> String {
    format!(
        "{QR_CODE_BASE_URL}?bank={}&acc={}&template=compact&amount={}&des={}",
        urlencoding::encode(&config.bank_code),
        urlencoding::encode(&config.account_number),
        order.total.value(),
        urlencoding::encode(&order.id.reference())
    )
}

pub fn bank_logo_url(bank_code: &str) -> String {
    format!("{BANK_LOGO_BASE_URL}/{}.png", urlencoding::encode(bank_code))
}

fn render_layout(title: &str, body: &str) -> String {
    let mut values = HashMap::new();
    values.insert("title", escape_html(title));
    values.insert("body", body.to_string());
    substitute(LAYOUT, &values)
}

/// Replaces every `{{key}}` in `template` with the HTML-escaped value for `key`.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let values = values.iter().map(|(k, v)| (*k, escape_html(v))).collect::<HashMap<_, _>>();
    substitute(template, &values)
}

// Single pass, so that substituted values are never themselves treated as placeholders.
fn substitute(template: &str, values: &HashMap<&str, String>) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            result.push_str(&rest[start..]);
            return result;
        };
        let key = after[..end].trim();
        match values.get(key) {
            Some(value) => result.push_str(value),
            None => warn!("💻️ No value for template placeholder '{key}'"),
        }
        rest = &after[end + 2..];
    }
    result.push_str(rest);
    result
}

pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            c => result.push(c),
        }
    }
    result
}
