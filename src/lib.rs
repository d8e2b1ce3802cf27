//! Declarative sales aggregation over order exports.
//!
//! The [`domain`] module holds the validated order model, [`analysis`] the
//! aggregations over it, and the remaining modules wire those into the
//! `sales-aggregator` command-line tool.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod domain;
pub mod ingest;
pub mod models;
pub mod report;
pub mod scanner;
pub mod source;
