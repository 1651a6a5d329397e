//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **rest**: reqwest gateways for the portal backend's resources
//! - **storage**: object-storage adapter for payment receipts
//! - **journal**: filesystem journal for submission checkpoints
//!
//! Adapters translate between domain types and wire or file
//! representations. They contain no business logic.

pub mod journal;
pub mod rest;
pub mod storage;
