//! SQLite backend for the Strand series store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. A series call is evaluated
//! entirely on that thread, synchronously, against one connection.

mod encode;
mod schema;
mod source;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
