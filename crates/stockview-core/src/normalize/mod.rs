//! Coercion of heterogeneous ledger values into numbers and ISO dates.

pub mod dates;
pub mod numbers;
pub mod patterns;

pub use dates::{
    normalize_to_iso_date, normalize_to_iso_date_or, parse_flexible_date, parse_flexible_day,
    serial_to_datetime, to_iso,
};
pub use numbers::{
    amount_or_zero, decimal_to_quantity, format_rupiah, number_from_f64, parse_integer,
    to_number, value_to_number,
};
