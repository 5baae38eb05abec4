//! Naming Module
//!
//! Turns (tenant, group, resource) into canonical object names.

pub mod resolver;

pub use resolver::*;
