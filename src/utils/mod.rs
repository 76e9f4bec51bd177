//! Utility modules supporting the fetch pipeline.
//!
//! - [`HttpClient`]: shared `reqwest` client with a user agent and timeouts
//! - [`truncate_with_ellipsis`]: width-aware truncation for table output
//! - [`is_terminal`]: whether stdout is a TTY

mod display;
mod http;

pub use display::{is_terminal, truncate_with_ellipsis};
pub use http::{HttpClient, DEFAULT_TIMEOUT};
