//! Core types and trait definitions for the Tend habit tracker.
//!
//! Domain model, completion tracking, calendar math, boundary validation
//! and the store traits. Deliberately free of HTTP and database
//! dependencies; every other crate in the workspace builds on this one.

// Store traits use native `async fn`-style futures (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod calendar;
pub mod dates;
pub mod error;
pub mod habit;
pub mod store;
pub mod tracker;
pub mod user;

pub use error::{Error, Result};
