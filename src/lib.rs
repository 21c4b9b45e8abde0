//! ProXPL editor tooling.
//!
//! The indexing itself lives in the `proxpl-index` crate; this crate keeps
//! open documents in a salsa database so each document revision is indexed at
//! most once, and hosts the language server and command-line front end.

pub mod database;
pub mod report;

pub use database::{Document, ProxDatabase, symbol_table};
