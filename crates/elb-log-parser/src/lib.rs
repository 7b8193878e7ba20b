//! ALB access-log parsing and normalization.
//!
//! Turns one raw load-balancer log line into a typed [`NormalizedRecord`]:
//! quote-aware tokenizing, lenient numeric coercion, UTC → US Eastern
//! timestamp conversion, request-line decomposition and coarse user-agent
//! classification. Malformed lines are rejected with a logged event, never
//! a panic.

pub mod assembler;
pub mod coerce;
pub mod error;
pub mod request;
pub mod timestamp;
pub mod tokenizer;
pub mod types;
pub mod user_agent;

// Re-export key types for convenience
pub use assembler::{parse_line, parse_lines, try_parse_line};
pub use error::{ParseError, ParseResult};
pub use types::{NormalizedRecord, ParseStats, UNKNOWN};
