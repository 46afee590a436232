//! nodeenv admission library entry.
//!
//! This crate wires the admission framework surface, the namespace cache, the
//! pod node environment plugin, and the webhook transport into one service.
//! It is consumed by the binary (`main.rs`) and by integration tests.

pub mod admission;
pub mod app_state;
pub mod cache;
pub mod client;
pub mod config;
pub mod obs;
pub mod ops;
pub mod plugin;
pub mod policy;
pub mod router;
pub mod transport;
