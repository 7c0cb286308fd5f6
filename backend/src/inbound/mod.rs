//! Inbound adapters translating external requests into domain service calls.
//!
//! The REST surface lives under [`http`].

pub mod http;
