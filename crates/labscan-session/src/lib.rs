// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// LabScan session core — the scan session state machine, the single-flight
// scan manager, and the biomarker text parser.
//
// One scan runs at a time.  A session pulls page/image units from its
// request, invokes the text-extraction collaborator per unit, parses
// biomarkers from the recognized text, and emits an ordered event stream.
// Cancellation is cooperative and silent: a cancelled session produces no
// terminal event.

pub mod config;
pub mod manager;
pub mod parser;
pub mod session;

#[cfg(test)]
pub(crate) mod mocks;

pub use config::ScanConfig;
pub use manager::ScanManager;
pub use parser::parse_biomarkers;
pub use session::Collaborators;
