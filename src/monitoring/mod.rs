//! Request logging and service introspection.

pub mod handlers;
pub mod request_log;

pub use handlers::{record_request, routes, REQUEST_ID_HEADER};
pub use request_log::{LogEntry, RequestLog, RequestStats};
