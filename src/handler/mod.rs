//! Request handler module
//!
//! Routing dispatch plus the two terminal handlers behind it: the WebDAV
//! engine and the web UI asset responder.

pub mod router;
pub mod static_files;
pub mod webdav;

pub use router::{normalize_prefix, ProtocolRouter};
pub use static_files::StaticAssets;
pub use webdav::WebDav;
