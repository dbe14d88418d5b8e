//! Origin filtering for inbound editor messages

use tracing::debug;
use url::Url;

use crate::{Error, Result};

/// Accepts messages only from the editor's own origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginFilter {
    origin: String,
}

impl OriginFilter {
    /// Derive the accepted origin from the editor source URL
    pub fn from_editor_url(editor_url: &str) -> Result<Self> {
        let url = Url::parse(editor_url)
            .map_err(|e| Error::Config(format!("Invalid editor URL {:?}: {}", editor_url, e)))?;
        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(Error::Config(format!("Editor URL {:?} has an opaque origin", editor_url)));
        }
        Ok(Self {
            origin: origin.ascii_serialization(),
        })
    }

    /// The accepted origin, e.g. `https://www.photopea.com`
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Whether a message event's origin matches the editor
    pub fn accepts(&self, origin: &str) -> bool {
        let accepted = Url::parse(origin)
            .map(|url| {
                let candidate = url.origin();
                candidate.is_tuple() && candidate.ascii_serialization() == self.origin
            })
            .unwrap_or(false);
        if !accepted {
            debug!("Ignoring message from foreign origin {:?}", origin);
        }
        accepted
    }
}
