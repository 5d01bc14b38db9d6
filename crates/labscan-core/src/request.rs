// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan request parsing and validation.
//
// Requests arrive as loose JSON arguments from the caller's transport layer:
// `{"source": "pdf" | "images", "uri": "...", "imageUris": ["...", ...]}`.
// Parsing is deliberately tolerant of extra keys and of non-string entries in
// `imageUris` (they are skipped), but a missing or unrecognized `source` or a
// missing `uri` rejects the request before any session starts.

use std::path::PathBuf;

use serde::Deserialize;

/// What kind of page source the scan reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanSource {
    /// A multi-page PDF document rasterized page by page.
    Pdf,
    /// A set of discrete photo/image files.
    Images,
}

impl ScanSource {
    /// Parse the wire string, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "images" => Some(Self::Images),
            _ => None,
        }
    }
}

/// Raw argument shape as sent over the wire.
#[derive(Debug, Deserialize)]
struct RawScanArgs {
    source: String,
    uri: String,
    #[serde(default, rename = "imageUris")]
    image_uris: Vec<serde_json::Value>,
}

/// A validated request to scan one document or image set.
///
/// Immutable once constructed; a new request is built per `start` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub source: ScanSource,
    /// Identifier of the document, or of the first image when `image_uris`
    /// is empty.
    pub uri: String,
    /// Ordered image identifiers; consulted only for [`ScanSource::Images`].
    pub image_uris: Vec<String>,
}

impl ScanRequest {
    /// Parse and validate caller-supplied arguments.
    ///
    /// Returns `None` when `source` does not resolve or `uri` is missing —
    /// the caller reports this as an `invalid_request` error event.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let raw: RawScanArgs = serde_json::from_value(value.clone()).ok()?;
        let source = ScanSource::parse(&raw.source)?;
        let image_uris = raw
            .image_uris
            .into_iter()
            .filter_map(|entry| entry.as_str().map(str::to_string))
            .collect();
        Some(Self {
            source,
            uri: raw.uri,
            image_uris,
        })
    }

    /// Filesystem path of the primary document.
    pub fn primary_file_path(&self) -> PathBuf {
        parse_file_path(&self.uri)
    }

    /// Resolved, ordered image paths for an image scan.
    ///
    /// Falls back to a single-element sequence containing the primary `uri`
    /// when `image_uris` is empty.  Empty identifiers are dropped, so a
    /// request with no usable location resolves to an empty sequence (which
    /// the session reports as a fatal "No images supplied" error).
    pub fn image_paths(&self) -> Vec<PathBuf> {
        let targets: &[String] = if self.image_uris.is_empty() {
            std::slice::from_ref(&self.uri)
        } else {
            &self.image_uris
        };
        targets
            .iter()
            .filter(|uri| !uri.is_empty())
            .map(|uri| parse_file_path(uri))
            .collect()
    }
}

/// Strip a `file://` scheme prefix, leaving bare paths untouched.
fn parse_file_path(value: &str) -> PathBuf {
    PathBuf::from(value.strip_prefix("file://").unwrap_or(value))
}
