// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan session configuration.

use serde::{Deserialize, Serialize};

/// Tunables for scan sessions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Linear upscale factor applied when rasterizing PDF pages before
    /// recognition.  Rendering at native resolution measurably hurts OCR
    /// accuracy on lab reports.
    pub render_scale: f32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { render_scale: 2.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_upscales_pages_twofold() {
        assert_eq!(ScanConfig::default().render_scale, 2.0);
    }
}
