//! # Registry Module
//!
//! The endpoint registry has a two-phase lifecycle: a [`RegistryBuilder`] is
//! open during the single-threaded registration phase, and [`seal`] converts
//! it into an immutable [`EndpointRegistry`] shared for the serving lifetime.
//! The sealed registry has no mutating methods, so registration during active
//! serving is unrepresentable rather than merely discouraged.
//!
//! Endpoints are stored under the composite key `METHOD:canonical-signature`.
//! Registering a second endpoint with the same key is rejected with
//! [`RegistrationError::DuplicateEndpoint`]; registration order is preserved
//! so that the resolver's tie-break between overlapping (but not identical)
//! shapes is deterministic.
//!
//! [`seal`]: RegistryBuilder::seal

mod core;

pub use core::{EndpointRegistry, RegistrationError, RegistryBuilder};
