// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scripted collaborator fakes shared by the session and manager tests.
//
// Rasters produced here carry a numeric tag in their pixel width so the
// scripted extractor can tell which page/image it was handed without any
// real decoding taking place.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;
use labscan_core::error::{LabscanError, Result};
use labscan_core::ScanEvent;
use labscan_document::{DocumentPages, ImageLoader, PageRenderer, RasterImage, TextExtractor};
use tokio::sync::{mpsc, Notify};

use crate::session::Collaborators;

/// Build a 1px-tall raster whose width encodes `tag`.
pub(crate) fn tagged_raster(tag: u32) -> RasterImage {
    DynamicImage::ImageRgb8(image::RgbImage::new(tag, 1))
}

fn raster_tag(image: &RasterImage) -> u32 {
    image.width()
}

/// Page renderer yielding `page_count` pages tagged `1..=page_count`.
#[derive(Default)]
pub(crate) struct ScriptedRenderer {
    pub page_count: usize,
    /// When set, `open` fails with this message.
    pub fail_open: Option<String>,
    /// When set, rendering this 0-based page index fails.
    pub fail_render_at: Option<usize>,
}

impl PageRenderer for ScriptedRenderer {
    fn open(&self, _location: &Path) -> Result<Box<dyn DocumentPages>> {
        if let Some(message) = &self.fail_open {
            return Err(LabscanError::DocumentOpen(message.clone()));
        }
        Ok(Box::new(ScriptedPages {
            page_count: self.page_count,
            fail_render_at: self.fail_render_at,
        }))
    }
}

struct ScriptedPages {
    page_count: usize,
    fail_render_at: Option<usize>,
}

impl DocumentPages for ScriptedPages {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn render_page(&mut self, index: usize, _scale: f32) -> Result<RasterImage> {
        if self.fail_render_at == Some(index) {
            return Err(LabscanError::PageRender(format!("page {index} unrenderable")));
        }
        Ok(tagged_raster(index as u32 + 1))
    }
}

/// Image loader mapping file names to raster tags; unknown names decode-fail.
#[derive(Default)]
pub(crate) struct ScriptedLoader {
    pub tags: HashMap<String, u32>,
}

impl ScriptedLoader {
    pub(crate) fn with(entries: &[(&str, u32)]) -> Self {
        Self {
            tags: entries
                .iter()
                .map(|(name, tag)| (name.to_string(), *tag))
                .collect(),
        }
    }
}

impl ImageLoader for ScriptedLoader {
    fn load(&self, location: &Path) -> Option<RasterImage> {
        let name = location.file_name()?.to_str()?;
        self.tags.get(name).map(|tag| tagged_raster(*tag))
    }
}

/// Extractor returning scripted text per raster tag.
#[derive(Default)]
pub(crate) struct ScriptedExtractor {
    pub texts: HashMap<u32, String>,
    /// Recognition of this tag fails (fatal for the session).
    pub fail_on: Option<u32>,
    /// Recognition of this tag never completes (for cancellation tests).
    pub hang_on: Option<u32>,
    /// Recognition of this tag blocks until the gate is notified, then
    /// completes normally.
    pub hold: Option<(u32, Arc<Notify>)>,
}

impl ScriptedExtractor {
    pub(crate) fn with(entries: &[(u32, &str)]) -> Self {
        Self {
            texts: entries
                .iter()
                .map(|(tag, text)| (*tag, text.to_string()))
                .collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl TextExtractor for ScriptedExtractor {
    async fn recognize(&self, image: &RasterImage) -> Result<String> {
        let tag = raster_tag(image);
        if self.hang_on == Some(tag) {
            std::future::pending::<()>().await;
            unreachable!("pending future resolved");
        }
        if let Some((held, gate)) = &self.hold {
            if *held == tag {
                gate.notified().await;
            }
        }
        if self.fail_on == Some(tag) {
            return Err(LabscanError::Extraction("recognizer exploded".into()));
        }
        Ok(self.texts.get(&tag).cloned().unwrap_or_default())
    }
}

pub(crate) fn collaborators(
    renderer: ScriptedRenderer,
    loader: ScriptedLoader,
    extractor: ScriptedExtractor,
) -> Collaborators {
    Collaborators {
        renderer: Arc::new(renderer),
        loader: Arc::new(loader),
        extractor: Arc::new(extractor),
    }
}

/// Receive events until a terminal `Complete`/`Error` arrives or the channel
/// closes, returning everything observed.
pub(crate) async fn drain_until_terminal(
    rx: &mut mpsc::UnboundedReceiver<ScanEvent>,
) -> Vec<ScanEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        let terminal = matches!(event, ScanEvent::Complete | ScanEvent::Error { .. });
        events.push(event);
        if terminal {
            break;
        }
    }
    events
}

/// Install a test subscriber once so `RUST_LOG=debug cargo test` shows spans.
pub(crate) fn init_test_tracing() {
    static TRACING: std::sync::Once = std::sync::Once::new();
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
