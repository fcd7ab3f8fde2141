//! Graph query-result schema
//!
//! This module defines the loosely-shaped records the graph layer returns and
//! the adapter that turns them into typed, immutable candidates.

mod adapter;
mod record;

pub use adapter::*;
pub use record::*;
