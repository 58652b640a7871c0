//! # Middleware
//!
//! Request counting. Tracing and CORS come from `tower-http` and are
//! attached in [`crate::app`].

pub mod metrics;
