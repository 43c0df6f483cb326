//! Core types and evaluation logic for the Strand series engine.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! defines the observation model, request validation, fixed-point math, the
//! primitive accessor and composition engine, and the traits that storage
//! backends implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod composite;
pub mod config;
pub mod error;
pub mod fixed;
pub mod primitive;
pub mod query;
pub mod registry;
pub mod series;
pub mod source;
pub mod store;

pub use error::{Error, ErrorKind, Result};
