//! Top-level facade crate for nodeenv.
//!
//! Re-exports the core types and the admission library so users can depend on a single crate.

pub mod core {
    pub use nodeenv_core::*;
}

pub mod admission {
    pub use nodeenv_admission::*;
}
