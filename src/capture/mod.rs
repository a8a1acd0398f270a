//! Document intake
//!
//! Accepts the payload uploaded by a capture client (camera frame, gallery
//! file or PDF picker) as either a `data:` URI or bare base64, validates it
//! and classifies it as JPEG or PDF for the extraction gateway. No receipt
//! content is inspected at this stage; any decodable image is accepted.

use crate::core::error::AppError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::Regex;
use std::sync::OnceLock;

/// Kind of document forwarded to the vision model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Jpeg,
    Pdf,
}

impl DocumentKind {
    /// MIME type sent alongside the inline document
    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentKind::Jpeg => "image/jpeg",
            DocumentKind::Pdf => "application/pdf",
        }
    }

    /// Parse the caller-supplied kind hint ("image" | "pdf")
    pub fn parse_hint(s: &str) -> Option<DocumentKind> {
        match s {
            "image" | "jpeg" => Some(DocumentKind::Jpeg),
            "pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }
}

fn data_uri_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^data:(image/[a-z]+|application/pdf);base64,")
            .expect("data URI regex is valid")
    })
}

/// A validated base64 document ready for the extraction gateway
#[derive(Debug, Clone)]
pub struct DocumentPayload {
    pub kind: DocumentKind,
    /// Base64 body with any `data:` URI prefix stripped
    pub base64: String,
    pub decoded_len: usize,
}

impl DocumentPayload {
    /// Decoded size ceiling. Camera frames come in well under this; it
    /// exists to bound memory for multi-page PDF uploads.
    pub const MAX_DECODED_BYTES: usize = 20 * 1024 * 1024;

    /// Parse and validate an uploaded document.
    ///
    /// `kind_hint` is honored only when the decoded bytes carry no
    /// recognizable magic number; JPEG and PDF signatures always win.
    /// Everything without a PDF signature or hint is forwarded as JPEG,
    /// matching what capture clients produce.
    pub fn parse(input: &str, kind_hint: Option<DocumentKind>) -> Result<Self, AppError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AppError::input("document is required"));
        }

        let body = match data_uri_prefix().find(trimmed) {
            Some(prefix) => &trimmed[prefix.end()..],
            None => trimmed,
        };

        let decoded = BASE64
            .decode(body)
            .map_err(|e| AppError::input(format!("document is not valid base64: {}", e)))?;

        if decoded.is_empty() {
            return Err(AppError::input("document is empty"));
        }
        if decoded.len() > Self::MAX_DECODED_BYTES {
            return Err(AppError::input(format!(
                "document exceeds the {} MB limit",
                Self::MAX_DECODED_BYTES / (1024 * 1024)
            )));
        }

        let kind = Self::sniff(&decoded).or(kind_hint).unwrap_or(DocumentKind::Jpeg);

        Ok(Self {
            kind,
            base64: body.to_string(),
            decoded_len: decoded.len(),
        })
    }

    fn sniff(bytes: &[u8]) -> Option<DocumentKind> {
        if bytes.starts_with(&[0xFF, 0xD8]) {
            Some(DocumentKind::Jpeg)
        } else if bytes.starts_with(b"%PDF") {
            Some(DocumentKind::Pdf)
        } else {
            None
        }
    }
}
