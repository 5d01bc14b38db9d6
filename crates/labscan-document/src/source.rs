// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator traits consumed by the scan session core.
//
// These mirror the external interfaces a scan session needs: a document
// source that renders pages to bitmaps, an image loader for discrete photo
// files, and an asynchronous text extractor.  Production implementations
// live in this crate; tests supply scripted fakes.

use std::path::Path;

use async_trait::async_trait;
use image::DynamicImage;
use labscan_core::error::Result;

/// A decoded/rendered bitmap handed to the text extractor.
pub type RasterImage = DynamicImage;

/// Opens a multi-page document and exposes its pages for rasterization.
pub trait PageRenderer: Send + Sync {
    /// Open the document at `location`.
    ///
    /// Failure here is fatal for the session (reported as `scan_failed`).
    fn open(&self, location: &Path) -> Result<Box<dyn DocumentPages>>;
}

/// An open document handle.  Dropped (releasing any native resources) when
/// the session finishes with it, on every exit path.
pub trait DocumentPages: Send {
    /// Total number of pages in the document.
    fn page_count(&self) -> usize;

    /// Rasterize page `index` (0-based) at the given linear scale factor.
    fn render_page(&mut self, index: usize, scale: f32) -> Result<RasterImage>;
}

/// Decodes a single image file.
pub trait ImageLoader: Send + Sync {
    /// Load and decode the image at `location`.
    ///
    /// `None` signals a non-fatal decode failure: the session skips the unit
    /// and continues with the next one.
    fn load(&self, location: &Path) -> Option<RasterImage>;
}

/// Recognizes text in a raster image.
///
/// Implementations may complete asynchronously; the session awaits the result
/// under a cancellation guard, so a late result after cancellation is simply
/// discarded.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract all text from `image`, lines separated by newlines.
    ///
    /// Failure here is fatal for the whole session.
    async fn recognize(&self, image: &RasterImage) -> Result<String>;
}
