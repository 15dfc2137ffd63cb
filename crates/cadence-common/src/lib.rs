//! Common utilities for the Cadence expression engine.
//!
//! This crate provides shared infrastructure used by the engine and the CLI:
//! - **Warning System** - deduplicated colored terminal output for recoverable problems
//! - **URL Helpers** - relative URL resolution and the HTTPS-only policy

pub mod url;
pub mod warning;
