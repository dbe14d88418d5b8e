//! Previewable resources for binary payloads
//!
//! The registry is the process-local analogue of browser object URLs: every
//! binary or blob payload gets a handle that stays valid until released.

use std::sync::Arc;

use dashmap::DashMap;
use mime::Mime;
use tracing::debug;

/// In-memory content that can be displayed or downloaded
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewResource {
    pub bytes: Vec<u8>,
    pub media_type: Mime,
    /// Short label used in download names (`uint8array`, `blob`, ...)
    pub label: String,
}

impl PreviewResource {
    /// Build a resource, sniffing the media type from the content
    pub fn sniffed(bytes: Vec<u8>, label: &str) -> Self {
        let media_type = sniff_media_type(&bytes);
        Self {
            bytes,
            media_type,
            label: label.to_lowercase(),
        }
    }

    /// Build a resource with a declared media type, falling back to sniffing
    /// when the declaration is missing or unparsable
    pub fn declared(bytes: Vec<u8>, media_type: Option<&str>, label: &str) -> Self {
        match media_type.and_then(|m| m.trim().parse::<Mime>().ok()) {
            Some(media_type) => Self {
                bytes,
                media_type,
                label: label.to_lowercase(),
            },
            None => Self::sniffed(bytes, label),
        }
    }

    /// Suggested file name for downloads
    pub fn file_name(&self, handle: &str) -> String {
        let suffix: String = handle
            .trim_start_matches(HANDLE_PREFIX)
            .chars()
            .take(8)
            .collect();
        format!("{}-{}.{}", self.label, suffix, extension_for(&self.media_type))
    }
}

const HANDLE_PREFIX: &str = "preview-";

/// Identify common editor output formats by their leading bytes
pub fn sniff_media_type(bytes: &[u8]) -> Mime {
    let guess = if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else if bytes.starts_with(b"8BPS") {
        "image/vnd.adobe.photoshop"
    } else if bytes.starts_with(b"%PDF-") {
        "application/pdf"
    } else if looks_like_svg(bytes) {
        "image/svg+xml"
    } else {
        return mime::APPLICATION_OCTET_STREAM;
    };
    guess.parse().unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

fn extension_for(media_type: &Mime) -> &'static str {
    match (media_type.type_().as_str(), media_type.subtype().as_str()) {
        ("image", "png") => "png",
        ("image", "jpeg") => "jpg",
        ("image", "gif") => "gif",
        ("image", "webp") => "webp",
        ("image", "svg") => "svg",
        ("image", "bmp") => "bmp",
        ("image", "vnd.adobe.photoshop") => "psd",
        ("application", "pdf") => "pdf",
        ("text", "plain") => "txt",
        ("application", "json") => "json",
        _ => "bin",
    }
}

/// Thread-safe table of live preview handles
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    entries: DashMap<String, Arc<PreviewResource>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource and return its handle
    pub fn register(&self, resource: PreviewResource) -> String {
        let handle = format!("{}{}", HANDLE_PREFIX, uuid::Uuid::new_v4().simple());
        debug!(
            "Registered preview {} ({} bytes, {})",
            handle,
            resource.bytes.len(),
            resource.media_type
        );
        self.entries.insert(handle.clone(), Arc::new(resource));
        handle
    }

    pub fn get(&self, handle: &str) -> Option<Arc<PreviewResource>> {
        self.entries.get(handle).map(|r| Arc::clone(r.value()))
    }

    /// Release a handle. Returns whether it was live.
    pub fn release(&self, handle: &str) -> bool {
        let released = self.entries.remove(handle).is_some();
        if released {
            debug!("Released preview {}", handle);
        }
        released
    }

    /// Release several handles, returning how many were live
    pub fn release_all<'a>(&self, handles: impl IntoIterator<Item = &'a str>) -> usize {
        handles.into_iter().filter(|h| self.release(h)).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_sniff_media_type() {
        assert_eq!(sniff_media_type(PNG_HEADER), mime::IMAGE_PNG);
        assert_eq!(sniff_media_type(&[0xff, 0xd8, 0xff, 0xe0]), mime::IMAGE_JPEG);
        assert_eq!(sniff_media_type(b"GIF89a..."), mime::IMAGE_GIF);
        assert_eq!(sniff_media_type(b"RIFF\0\0\0\0WEBPVP8 ").essence_str(), "image/webp");
        assert_eq!(sniff_media_type(b"8BPS\0\x01").essence_str(), "image/vnd.adobe.photoshop");
        assert_eq!(sniff_media_type(b"  <svg xmlns=\"\"/>"), mime::IMAGE_SVG);
        assert_eq!(sniff_media_type(&[]), mime::APPLICATION_OCTET_STREAM);
        assert_eq!(sniff_media_type(&[1, 2, 3]), mime::APPLICATION_OCTET_STREAM);
    }

    #[test]
    fn test_declared_media_type() {
        let declared = PreviewResource::declared(vec![1, 2], Some("image/png"), "Blob");
        assert_eq!(declared.media_type, mime::IMAGE_PNG);
        assert_eq!(declared.label, "blob");

        let fallback = PreviewResource::declared(PNG_HEADER.to_vec(), Some(""), "Blob");
        assert_eq!(fallback.media_type, mime::IMAGE_PNG);
    }

    #[test]
    fn test_file_name() {
        let resource = PreviewResource::sniffed(PNG_HEADER.to_vec(), "ArrayBuffer");
        assert_eq!(resource.file_name("preview-0123456789abcdef"), "arraybuffer-01234567.png");

        let psd = PreviewResource::sniffed(b"8BPS".to_vec(), "Uint8Array");
        assert!(psd.file_name("preview-aa").ends_with(".psd"));
    }

    #[test]
    fn test_register_and_release() {
        let registry = PreviewRegistry::new();
        let a = registry.register(PreviewResource::sniffed(vec![1], "blob"));
        let b = registry.register(PreviewResource::sniffed(vec![2], "blob"));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(&a).unwrap().bytes, vec![1]);

        assert!(registry.release(&a));
        assert!(!registry.release(&a));
        assert!(registry.get(&a).is_none());

        assert_eq!(registry.release_all([b.as_str(), "preview-missing"]), 1);
        assert!(registry.is_empty());
    }
}
