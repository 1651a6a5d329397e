//! Inbound adapters driving the domain.
//!
//! - **cli**: the `portal-admin` command surface

pub mod cli;
