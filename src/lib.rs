//! jarcat - browser cookie export for the command line
//!
//! This crate reads a desktop browser's cookie store, reassembles the
//! Cookie header a request to a URL would carry, and exports it as a
//! text report, JSON payload, raw header, or Netscape cookie file. The
//! JSON payload can also be POSTed straight to a collector endpoint.

pub mod cli;
pub mod config;
pub mod cookie;
pub mod error;
pub mod exit_code;
pub mod export;
pub mod http;
pub mod i18n;
pub mod logging;
pub mod output;
pub mod store;
pub mod utils;

pub use error::{JarcatError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
