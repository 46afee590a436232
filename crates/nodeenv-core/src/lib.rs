//! nodeenv core: node selector algebra, API object shapes, and the error surface.
//!
//! This crate holds everything the admission layer needs that does not depend
//! on a runtime or transport: the label-selector parser, conflict detection and
//! merge over node selectors, the pod/namespace views decoded from admission
//! requests, and the shared error type.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `NodeEnvError`/`Result` so a malformed
//! selector on a namespace can never take the admission service down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod api;
pub mod error;
pub mod selector;

/// Shared result type.
pub use error::{NodeEnvError, Result, StatusReason};
pub use selector::NodeSelector;
