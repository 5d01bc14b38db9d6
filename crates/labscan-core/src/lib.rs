// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// LabScan — Core types and error definitions shared across all crates.

pub mod error;
pub mod event;
pub mod request;

pub use error::LabscanError;
pub use event::{BiomarkerRecord, ScanEvent, ScanPayload};
pub use request::{ScanRequest, ScanSource};
