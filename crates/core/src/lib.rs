//! Domain primitives for the bizdesk backend.
//!
//! This crate has no internal dependencies so the derivation rules can be
//! shared by the storage layer, the HTTP layer and any preview tooling.

pub mod derivation;
pub mod error;
pub mod roles;
pub mod types;
