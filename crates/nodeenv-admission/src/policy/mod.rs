//! Policy layer: namespace policy resolution and the pod admission decision.
//!
//! Pure with respect to the request: every call re-reads the namespace cache
//! and derives its answer from that snapshot alone.

pub mod engine;
pub mod resolver;

pub use engine::{decide, AdmissionOutcome, PodRequest};
pub use resolver::{resolve, NamespacePolicy};
