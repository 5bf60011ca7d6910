//! # Fight Development Tools
//!
//! Command-line tools for development:
//! - Duel configuration validation
//! - Headless scenario runner

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod scenario;
pub mod validate;
