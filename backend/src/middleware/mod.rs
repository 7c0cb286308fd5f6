//! Request middleware.
//!
//! [`Trace`] scopes every request to a [`crate::domain::TraceId`], adopting a
//! well-formed inbound `trace-id` header so callers can correlate their own
//! logs with ours.

pub mod trace;

pub use trace::Trace;
