//! Caching strategies for intercepted requests.
//!
//! The engine applies cache-first or network-first handling per resource
//! class, derives content-addressed keys for POST bodies, and synthesizes
//! the degraded fallbacks when both network and cache fail.

mod engine;
mod key;
mod policy;
mod response;

pub use engine::CacheStrategyEngine;
pub use key::derive_cache_key;
pub use policy::{PolicyConfig, StrategyKind};
pub use response::{MapResponse, ServedFrom};
