//! # Widget Common Library
//!
//! Shared bootstrap code for the widget test player:
//! - TOML configuration discovery and loading
//! - Tracing subscriber setup
//! - Common error type

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
