//! Adapters implementing the domain ports.

pub mod notify;
pub mod sqlite;
