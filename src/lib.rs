//! Storage layer for a peer-recognition point exchange.
//!
//! One async contract ([`db::drivers::Driver`]) over four backends -
//! `mongodb`, `firestore`, and the in-memory/flat-file `array`/`file` pair -
//! selected by [`db::drivers::connect`] from configuration. Chat-platform
//! integration, command parsing and reply formatting all live upstream of
//! this crate and consume the contract as-is.

pub mod db;
pub mod util;

pub use db::drivers::{Driver, DriverKind, connect};
pub use db::{StoreError, StoreResult};
