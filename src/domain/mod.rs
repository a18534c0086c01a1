//! Domain layer for the Pathway progression core
//!
//! This module contains the domain models, errors and port traits.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
