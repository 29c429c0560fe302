pub mod cors;
pub mod error_detail;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
