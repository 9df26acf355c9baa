//! # Bondfolio Core
//!
//! Core types shared by every crate of the Bondfolio portfolio engine.
//!
//! - **Types**: [`Date`](types::Date), [`CurrencyCode`](types::CurrencyCode),
//!   and the ordered [`Row`](types::Row) used for tabular instrument records
//! - **Errors**: [`CoreError`](error::CoreError) for invalid dates, currency
//!   codes and field values
//!
//! ## Example
//!
//! ```rust
//! use bondfolio_core::prelude::*;
//!
//! let maturity = Date::from_ymd(2030, 1, 15).unwrap();
//! let today = Date::from_ymd(2025, 1, 15).unwrap();
//! assert_eq!(maturity - today, 1826);
//!
//! let usd = CurrencyCode::new("usd").unwrap();
//! assert_eq!(usd.as_str(), "USD");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::types::{CurrencyCode, Date, FieldValue, Row};
}
