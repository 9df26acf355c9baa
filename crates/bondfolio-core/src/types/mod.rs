//! Domain types for portfolio analytics.
//!
//! - [`Date`]: Calendar date with day and month arithmetic
//! - [`CurrencyCode`]: Three-letter currency code
//! - [`Row`]: Ordered, named columns of [`FieldValue`]s

mod currency;
mod date;
mod row;

pub use currency::CurrencyCode;
pub use date::Date;
pub use row::{FieldValue, Row};
