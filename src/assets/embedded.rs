use super::AssetBundle;
use hyper::body::Bytes;
use rust_embed::RustEmbed;
use std::borrow::Cow;
use std::time::{Duration, SystemTime};

#[derive(RustEmbed)]
#[folder = "webui/dist/"]
struct WebUi;

/// Web UI compiled into the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedBundle;

impl AssetBundle for EmbeddedBundle {
    fn read(&self, path: &str) -> Option<Bytes> {
        let file = WebUi::get(path)?;
        Some(match file.data {
            Cow::Borrowed(data) => Bytes::from_static(data),
            Cow::Owned(data) => Bytes::from(data),
        })
    }

    fn modified(&self, path: &str) -> Option<SystemTime> {
        let secs = WebUi::get(path)?.metadata.last_modified()?;
        Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    fn describe(&self) -> String {
        format!("embedded ({} files)", WebUi::iter().count())
    }
}
