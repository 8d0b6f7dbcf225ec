//! Query and pipeline construction for derived place views.
//!
//! # Responsibility
//! - Build stage lists as values so ordering rules are testable without a
//!   store.
//! - Build the geospatial nearness filter.
//!
//! # Invariants
//! - Builders are pure; nothing here touches the store.

pub mod aggregation;
pub mod proximity;
