//! Public facade crate for `crawlsim`.
//!
//! This crate intentionally contains no IO or policy-specific logic. It
//! re-exports the backend-agnostic types/traits from `crawlsim-core`.

pub use crawlsim_core::*;
