//! Activity sessions CLI library.
//!
//! This crate provides the CLI interface and the fetch, compute, submit
//! pipeline around `sessions-core`.

mod cli;
pub mod commands;
mod config;
mod error;
pub mod pipeline;
pub mod render;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::ErrorCategory;
