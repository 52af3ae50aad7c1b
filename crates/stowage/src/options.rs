//! Upload options

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Canned access control for a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acl {
    /// Owner-only access
    Private,
    /// World-readable access
    PublicRead,
    /// Backend-defined ACL name, passed through verbatim
    Custom(String),
}

impl Acl {
    /// The value sent to the backend
    pub fn as_str(&self) -> &str {
        match self {
            Acl::Private => "private",
            Acl::PublicRead => "public-read",
            Acl::Custom(value) => value,
        }
    }
}

/// Per-call upload configuration
///
/// Constructed fresh for every `put`, populated with the chained setters
/// (last write wins), and consumed by the call. Backends ignore fields they
/// cannot express; the local driver stores content and nothing else.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub acl: Option<Acl>,
    pub mime_type: Option<String>,
    pub content_disposition: Option<String>,
    /// Overrides the driver's configured bucket for this upload only
    pub bucket: Option<String>,
    pub cache_control: Option<String>,
    pub content_encoding: Option<String>,
    pub content_language: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    pub metadata: HashMap<String, String>,
    pub server_side_encryption: Option<String>,
    pub storage_class: Option<String>,
}

impl PutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_acl(mut self, acl: Acl) -> Self {
        self.acl = Some(acl);
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_content_disposition(mut self, disposition: impl Into<String>) -> Self {
        self.content_disposition = Some(disposition.into());
        self
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = Some(cache_control.into());
        self
    }

    pub fn with_content_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.content_encoding = Some(encoding.into());
        self
    }

    pub fn with_content_language(mut self, language: impl Into<String>) -> Self {
        self.content_language = Some(language.into());
        self
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_server_side_encryption(mut self, encryption: impl Into<String>) -> Self {
        self.server_side_encryption = Some(encryption.into());
        self
    }

    pub fn with_storage_class(mut self, class: impl Into<String>) -> Self {
        self.storage_class = Some(class.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acl_values() {
        assert_eq!(Acl::Private.as_str(), "private");
        assert_eq!(Acl::PublicRead.as_str(), "public-read");
        assert_eq!(Acl::Custom("bucket-owner-full-control".to_string()).as_str(), "bucket-owner-full-control");
    }

    #[test]
    fn test_builder_sets_fields() {
        let mut metadata = HashMap::new();
        metadata.insert("owner".to_string(), "avatars".to_string());

        let options = PutOptions::new()
            .with_acl(Acl::PublicRead)
            .with_mime_type("image/png")
            .with_cache_control("max-age=86400")
            .with_metadata(metadata);

        assert_eq!(options.acl, Some(Acl::PublicRead));
        assert_eq!(options.mime_type.as_deref(), Some("image/png"));
        assert_eq!(options.cache_control.as_deref(), Some("max-age=86400"));
        assert_eq!(options.metadata.get("owner").map(String::as_str), Some("avatars"));
        assert!(options.bucket.is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let options = PutOptions::new()
            .with_mime_type("text/plain")
            .with_mime_type("application/json");

        assert_eq!(options.mime_type.as_deref(), Some("application/json"));
    }
}
