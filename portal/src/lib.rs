//! Client core for the enrollment portal backend.
//!
//! The crate is split along hexagonal lines: [`domain`] owns entities, the
//! enrollment sagas, the academic state calculator, and the ports they drive;
//! [`outbound`] holds the REST, object-storage, and journal adapters; and
//! [`inbound`] exposes the operator command surface.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
