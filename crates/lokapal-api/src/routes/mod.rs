//! # API Route Modules
//!
//! - [`polls`]: chapter poll state and vote submission.

pub mod polls;
