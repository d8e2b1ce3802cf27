//! Analysis modules.
//!
//! Declarative aggregations over loaded orders.

pub mod aggregator;

pub use aggregator::*;
