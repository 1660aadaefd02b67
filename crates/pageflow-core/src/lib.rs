//! Core pagination state machine for chat-bot message pagination.
//!
//! This crate is intentionally messenger-agnostic. Sending/editing messages,
//! waiting for inbound events, and fetching content live behind ports (traits)
//! implemented in adapter crates.

pub mod config;
pub mod controls;
pub mod domain;
pub mod errors;
pub mod jump;
pub mod logging;
pub mod nav;
pub mod pages;
pub mod ports;
pub mod render;
pub mod session;

pub use errors::{Error, Result};
