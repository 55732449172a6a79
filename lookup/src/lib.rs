//! Directory user lookup library modules.

pub mod cli;
pub mod config;
pub mod domain;
pub mod outbound;
