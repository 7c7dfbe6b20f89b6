//! Launch a desktop container and tear it down on interrupt.
//!
//! `deskpod` finds a reachable Docker-compatible engine, pulls a configured
//! image and runs it with four fixed published ports and one read-write bind
//! mount. It then waits until the container exits or the operator interrupts,
//! and always stops and removes the container before returning.
//!
//! # Modules
//!
//! - [`api`]: Session orchestration used by the binary and embedders
//! - [`config`]: Configuration system with layered precedence (CLI > env > file > defaults)
//! - [`engine`]: Engine endpoint resolution, connection and container lifecycle
//! - [`error`]: Semantic error types for the application

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
