//! Webhook transport (`admission.k8s.io/v1` AdmissionReview over HTTP).
//!
//! Decodes each review once into `Attributes`, runs the admission chain for
//! the endpoint's phase, and encodes the verdict (plus a JSONPatch for
//! mutations) back into a review response.

pub mod review;
pub mod webhook;
