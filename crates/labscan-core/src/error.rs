// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for LabScan.

use thiserror::Error;

/// Top-level error type for all LabScan operations.
#[derive(Debug, Error)]
pub enum LabscanError {
    // -- Request errors --
    /// The start arguments could not be parsed into a [`crate::ScanRequest`].
    #[error("{0}")]
    InvalidRequest(String),

    // -- Document errors --
    #[error("document open failed: {0}")]
    DocumentOpen(String),

    #[error("page rendering failed: {0}")]
    PageRender(String),

    /// The resolved image sequence for an image scan was empty.
    /// The message is part of the event contract — do not reword.
    #[error("No images supplied")]
    NoImages,

    // -- Extraction errors --
    #[error("text extraction failed: {0}")]
    Extraction(String),

    // -- Ambient --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LabscanError {
    /// Stable error code carried by terminal `error` events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            _ => "scan_failed",
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LabscanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_maps_to_its_own_code() {
        let err = LabscanError::InvalidRequest("Invalid scan arguments".into());
        assert_eq!(err.code(), "invalid_request");
        assert_eq!(err.to_string(), "Invalid scan arguments");
    }

    #[test]
    fn all_other_failures_map_to_scan_failed() {
        assert_eq!(LabscanError::NoImages.code(), "scan_failed");
        assert_eq!(
            LabscanError::Extraction("engine crashed".into()).code(),
            "scan_failed"
        );
        assert_eq!(
            LabscanError::DocumentOpen("missing".into()).code(),
            "scan_failed"
        );
    }

    #[test]
    fn no_images_message_is_exact() {
        assert_eq!(LabscanError::NoImages.to_string(), "No images supplied");
    }
}
