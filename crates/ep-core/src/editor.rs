//! Editor launch URLs
//!
//! The editor reads an optional JSON launch configuration from the URL
//! fragment (`https://editor.example/#{"files":[...]}`), so the source URL
//! alone is enough to reproduce a session's starting state.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Launch configuration embedded in the editor URL fragment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorLaunchConfig {
    /// Documents to open on startup, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    /// Fonts, brushes, and other assets to preload
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<serde_json::Value>,
    /// Script run once the files are loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<serde_json::Value>,
}

impl EditorLaunchConfig {
    /// Configuration that opens the given images
    pub fn with_files(files: Vec<String>) -> Self {
        Self {
            files,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Build the editor URL for `base` carrying this configuration.
    ///
    /// Any fragment already on `base` is replaced; an empty configuration
    /// yields the bare base URL.
    pub fn build_url(&self, base: &str) -> Result<String> {
        let mut url = parse_editor_url(base)?;
        url.set_fragment(None);
        if !self.is_empty() {
            let json = serde_json::to_string(self)?;
            url.set_fragment(Some(&urlencoding::encode(&json)));
        }
        Ok(url.into())
    }

    /// Split an editor URL into its base and launch configuration.
    ///
    /// A missing or malformed fragment yields `None` for the configuration.
    pub fn parse_url(editor_url: &str) -> Result<(String, Option<Self>)> {
        let mut url = parse_editor_url(editor_url)?;
        let config = url
            .fragment()
            .and_then(|fragment| urlencoding::decode(fragment).ok())
            .and_then(|json| serde_json::from_str::<Self>(&json).ok());
        url.set_fragment(None);
        Ok((url.into(), config))
    }
}

fn parse_editor_url(value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| Error::Config(format!("Invalid editor URL {:?}: {}", value, e)))
}
