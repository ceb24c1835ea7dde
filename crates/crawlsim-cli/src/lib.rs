//! `crawlsim` crate (library surface).
//!
//! The primary entrypoint for end users is the `crawlsim` binary. This
//! library module exists to support embedding and to provide a stable way
//! to reuse core types without depending on internal crate layout.

pub mod config;

pub use crawlsim_core as core;
