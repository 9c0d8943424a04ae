//! # Contentoire Core
//!
//! The domain layer of the Contentoire backend.
//! Post lifecycle rules, calendar aggregation and the ports that
//! infrastructure must implement. No database or network code lives here.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
