//! Unit tests for deskpod configuration types.
//!
//! - [`helpers`] - Shared fixtures and helper functions
//! - [`types_tests`] - `AppConfig` parsing and redaction tests
//! - [`layer_precedence_tests`] - `MergeComposer` layer precedence tests

mod helpers;
