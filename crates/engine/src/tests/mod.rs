//! Shared test doubles and end-to-end pipeline scenarios.

pub mod support;
