//! HTTP protocol layer module
//!
//! Body types, caching validators, range parsing, content types and response
//! builders shared by the middleware layers and the asset responder.

pub mod body;
pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use body::{RequestBody, ResponseBody};
pub use range::parse_range_header;
pub use response::{
    build_304_response, build_401_response, build_405_response, build_416_response,
    build_500_response, build_redirect_response,
};
