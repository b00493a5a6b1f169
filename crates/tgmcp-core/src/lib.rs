//! Core domain + application logic for the Telegram history MCP server.
//!
//! This crate is intentionally transport-agnostic. The MTProto client lives
//! behind ports (traits) implemented in the `tgmcp-telegram` adapter crate.

pub mod config;
pub mod domain;
pub mod errors;
pub mod history;
pub mod logging;
pub mod peer;
pub mod ports;
pub mod tool;
pub mod utils;

pub use errors::{Error, Result};
