//! HTTP middleware.
//!
//! Execution order (outermost → innermost):
//! 1. `tower_http` trace span
//! 2. Access logger: method, path, status, latency

pub mod audit;
