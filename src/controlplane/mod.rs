//! Control Plane Module
//!
//! Adapters, controllers and the REST surface that sit around the
//! provisioning core.

pub mod api;
pub mod cluster;
pub mod controllers;
pub mod provisioner;
pub mod templates;

pub use api::*;
pub use cluster::*;
pub use controllers::*;
pub use provisioner::*;
pub use templates::*;
