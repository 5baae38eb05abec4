//! Domain layer - Request models and port definitions
//!
//! This module defines the values exchanged with callers and the traits
//! (ports) that adapters implement, following hexagonal architecture
//! principles.

pub mod models;
pub mod ports;

pub use models::*;
pub use ports::*;
