//! PokeAPI access layer
//!
//! Wraps reqwest with a cache-first fetch path shared by every endpoint the
//! application uses.

mod client;

pub use client::{ApiClient, ApiError};
