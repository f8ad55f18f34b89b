//! Response caching for the PokeAPI client
//!
//! This module provides an in-memory cache of raw response bodies keyed by
//! request URL. A background reaper task removes entries once they are older
//! than the configured interval, keeping repeat lookups fast while bounding
//! how stale served data can get.

mod store;

pub use store::Cache;
