//! Libris application library
//!
//! The book catalogue module and the process lifecycle that wires it to the
//! document store and the HTTP server.

pub mod bootstrap;
pub mod modules;

/// Re-export commonly used types
pub use modules::*;
