// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filesystem image loader backed by the `image` crate.

use std::path::Path;

use tracing::{debug, warn};

use crate::source::{ImageLoader, RasterImage};

/// Decodes image files from the local filesystem.
///
/// Format detection is delegated to the `image` crate (JPEG, PNG, TIFF, WebP,
/// and friends).  A file that is missing or fails to decode is reported as
/// `None` — the scan session treats that as a skippable unit, not a session
/// failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImageLoader;

impl ImageLoader for FileImageLoader {
    fn load(&self, location: &Path) -> Option<RasterImage> {
        match image::open(location) {
            Ok(decoded) => {
                debug!(
                    path = %location.display(),
                    width = decoded.width(),
                    height = decoded.height(),
                    "image decoded"
                );
                Some(decoded)
            }
            Err(err) => {
                warn!(path = %location.display(), %err, "image decode failed, skipping unit");
                None
            }
        }
    }
}
