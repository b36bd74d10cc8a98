// Formatting helpers shared by the review summary and the invoice document

use chrono::{Local, NaiveDate};
use uuid::Uuid;

/// Upper bound (exclusive) for the numeric part of an invoice number.
const INVOICE_NUMBER_SPACE: u128 = 1_000_000;

/// Formats a price as US currency: leading `$`, thousands separators and
/// two decimal places (`1234.5` -> `$1,234.50`).
pub fn format_price(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, dec_part)
}

/// Plain `$` + fixed two decimals, no grouping. Used by the detail table,
/// which does not go through the currency formatter.
pub fn format_fixed_price(value: f64) -> String {
    format!("${:.2}", value)
}

/// Short numeric date in US order (`3/7/2025`).
pub fn format_invoice_date(date: &NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `INV-<0..999999>`. Not unique: invoices are one-off documents that are
/// never stored or reconciled.
pub fn generate_invoice_number() -> String {
    let value = Uuid::new_v4().as_u128() % INVOICE_NUMBER_SPACE;
    format!("INV-{}", value)
}
