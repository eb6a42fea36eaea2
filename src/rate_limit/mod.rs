//! Admission control.
//!
//! One `RateLimiter` per surface; they never share state.

pub mod limiter;
pub mod middleware;

pub use limiter::{Admission, RateLimiter};
pub use middleware::{client_key, enforce_rate_limit};
