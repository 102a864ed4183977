//! A single trading account kept as an append-only transaction log.
//!
//! Balances, holdings and valuations are never stored; they are replayed from
//! the log as of any timestamp. [`domain`] holds the ledger, [`common`] the
//! value objects and errors, [`io`] the CSV formats, [`worker`] and [`app`] the
//! batch driver.

pub mod app;
pub mod common;
pub mod domain;
pub mod io;
pub mod worker;
