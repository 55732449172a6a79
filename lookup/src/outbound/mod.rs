//! Outbound adapters: the HTTP directory session and request signing.

pub mod directory;
pub mod signing;
