//! API Module
//!
//! REST surface over the provisioner.

pub mod server;
pub mod rest;

pub use server::*;
pub use rest::*;
