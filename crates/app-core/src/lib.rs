//! Shared infrastructure for the quizdeck services: configuration, errors,
//! extractors, token issuance, secret sealing, sessions and the identity
//! provider client.

pub mod config;
pub mod crypto;
pub mod error;
pub mod extractors;
pub mod jwt;
pub mod middleware;
pub mod oauth;
pub mod rejection;
pub mod response;
pub mod session;
pub mod time;
