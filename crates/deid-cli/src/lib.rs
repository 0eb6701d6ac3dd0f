//! CLI library components for deid.

pub mod logging;
