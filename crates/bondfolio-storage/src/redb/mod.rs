//! Single-file instrument cache on [redb](https://crates.io/crates/redb).
//!
//! Instruments and currency rates live in two tables keyed by string, each
//! value a JSON [`Envelope`](crate::Envelope).

mod storage;

pub use storage::RedbStorage;
