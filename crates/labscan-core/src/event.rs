// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan event model — the stream contract between a scan session and its
// listener.  Each event is a closed tagged variant serialized with a `type`
// discriminator, giving compile-time exhaustiveness over the event kinds the
// original channel delivered as loose maps.

use serde::{Deserialize, Serialize};

use crate::error::LabscanError;

/// One event on a scan session's output stream.
///
/// Wire shape: `{"type": "progress" | "structured" | "complete" | "error", ...}`
/// with camelCase field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScanEvent {
    /// A page/image unit is about to be (PDF) or has been (images) processed.
    #[serde(rename_all = "camelCase")]
    Progress { page: u32, total_pages: u32 },

    /// Recognized text and parsed biomarkers for one page/image unit.
    #[serde(rename_all = "camelCase")]
    Structured {
        page: u32,
        total_pages: u32,
        payload: ScanPayload,
    },

    /// The session exhausted its page sequence without failure.
    Complete,

    /// The session aborted.  `code` is `invalid_request` or `scan_failed`.
    Error { code: String, message: String },
}

impl ScanEvent {
    /// Terminal error event for a failed session or rejected request.
    pub fn failure(err: &LabscanError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Per-unit payload carried by [`ScanEvent::Structured`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanPayload {
    /// The full recognized text for the unit, line breaks preserved.
    pub raw_text: String,
    /// Parsed biomarker records in source line order.
    pub biomarkers: Vec<BiomarkerRecord>,
}

/// A single measurement parsed from one line of report text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiomarkerRecord {
    /// Trimmed, non-empty analyte name.
    pub name: String,
    /// The numeric literal exactly as it appeared in the text (no `,`→`.`
    /// normalization applied).
    pub value: String,
    /// Sanitized unit text, present only when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Lower bound of the detected reference range.  Always present together
    /// with `reference_max` or not at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_min: Option<String>,
    /// Upper bound of the detected reference range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_max: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn progress_wire_shape() {
        let event = ScanEvent::Progress {
            page: 2,
            total_pages: 5,
        };
        assert_eq!(
            serde_json::to_value(&event).expect("serialize"),
            json!({"type": "progress", "page": 2, "totalPages": 5})
        );
    }

    #[test]
    fn complete_wire_shape() {
        let event = ScanEvent::Complete;
        assert_eq!(
            serde_json::to_value(&event).expect("serialize"),
            json!({"type": "complete"})
        );
    }

    #[test]
    fn error_wire_shape() {
        let event = ScanEvent::failure(&LabscanError::NoImages);
        assert_eq!(
            serde_json::to_value(&event).expect("serialize"),
            json!({"type": "error", "code": "scan_failed", "message": "No images supplied"})
        );
    }

    #[test]
    fn structured_wire_shape_omits_absent_optionals() {
        let event = ScanEvent::Structured {
            page: 1,
            total_pages: 1,
            payload: ScanPayload {
                raw_text: "Glucose 95 mg/dL".into(),
                biomarkers: vec![BiomarkerRecord {
                    name: "Glucose".into(),
                    value: "95".into(),
                    unit: Some("mg/dL".into()),
                    reference_min: None,
                    reference_max: None,
                }],
            },
        };
        assert_eq!(
            serde_json::to_value(&event).expect("serialize"),
            json!({
                "type": "structured",
                "page": 1,
                "totalPages": 1,
                "payload": {
                    "rawText": "Glucose 95 mg/dL",
                    "biomarkers": [
                        {"name": "Glucose", "value": "95", "unit": "mg/dL"}
                    ]
                }
            })
        );
    }

    #[test]
    fn events_round_trip_through_json() {
        let event = ScanEvent::Error {
            code: "scan_failed".into(),
            message: "boom".into(),
        };
        let json = serde_json::to_string(&event).expect("serialize");
        let back: ScanEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, event);
    }
}
