//! # Bondfolio Ext File
//!
//! File-based collaborators for the Bondfolio engine.
//!
//! This crate provides the default implementations used by the CLI:
//! - CSV portfolio source (identifier, lot count)
//! - Decoder for Moscow Exchange ISS JSON documents
//! - Market data source over a directory of saved ISS documents
//! - CSV benchmark curve source
//!
//! Nothing here talks to the network. Documents are fetched by whatever
//! tool the user prefers and saved under their ISS names.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod curves;
mod iss;
mod iss_source;
mod portfolio;

pub use curves::*;
pub use iss::*;
pub use iss_source::*;
pub use portfolio::*;
