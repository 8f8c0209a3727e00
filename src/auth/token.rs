//! Token payloads returned by provider exchanges.

pub mod result;
pub mod secret;
