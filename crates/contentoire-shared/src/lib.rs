//! # Contentoire Shared
//!
//! Wire types shared by the server and its clients.
//! Field names follow the mobile apps' JSON (camelCase), except the legacy
//! login payload which keeps the PHP backend's snake_case.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
