//! Floating IP Controller CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the DigitalOcean floating IP controller.

pub mod floating_ip_binding;

pub use floating_ip_binding::*;
