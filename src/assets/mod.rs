//! Web UI asset bundles.
//!
//! An [`AssetBundle`] is a read-only map from a relative, slash-separated path
//! (`index.html`, `assets/app.js`) to file contents and modification time. It
//! is populated before the server starts and never changes afterwards.

mod embedded;
mod memory;

pub use embedded::EmbeddedBundle;
pub use memory::MemoryBundle;

use hyper::body::Bytes;
use std::sync::Arc;
use std::time::SystemTime;

/// Entry document of the single-page application.
pub const SHELL_DOCUMENT: &str = "index.html";

/// Immutable content store the static responder serves from.
pub trait AssetBundle: Send + Sync + 'static {
    /// Contents of `path`, or `None` when absent.
    fn read(&self, path: &str) -> Option<Bytes>;

    /// Modification time of `path`; `None` when absent or unknown.
    fn modified(&self, path: &str) -> Option<SystemTime>;

    /// Human-readable origin of the bundle, for the startup banner.
    fn describe(&self) -> String;
}

pub type SharedBundle = Arc<dyn AssetBundle>;
