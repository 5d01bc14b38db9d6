// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// LabScan document collaborators — the boundary between the scan session core
// and the machinery that actually opens documents, decodes images, and runs
// optical character recognition.
//
// The session core depends only on the traits in [`source`]; the concrete
// implementations here are swappable (and the heavy ones are feature-gated).

pub mod image_loader;
pub mod source;

#[cfg(feature = "pdfium")]
pub mod pdf;

#[cfg(feature = "ocr")]
pub mod ocr;

pub use image_loader::FileImageLoader;
pub use source::{DocumentPages, ImageLoader, PageRenderer, RasterImage, TextExtractor};

#[cfg(feature = "pdfium")]
pub use pdf::PdfiumPageRenderer;

#[cfg(feature = "ocr")]
pub use ocr::{OcrConfig, OcrTextExtractor};
