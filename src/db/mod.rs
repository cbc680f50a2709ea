//! History store: the append-only record of question/answer exchanges.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite)
//! - `actor.rs`: the single-writer actor that owns the pool

pub mod actor;
pub mod models;
pub mod schema;

pub use actor::{DbActorHandle, spawn};
pub use models::{DbExchange, ExchangeCreate, ExchangeMetadata, HistoryPage, HistoryStats};
pub use schema::SQLITE_INIT;

/// Largest number of exchanges a single listing returns.
pub const MAX_PAGE_SIZE: u32 = 100;
