// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan session — one run of the page-iteration loop for a single request.
//
// A session moves Idle → Running → Terminated and is never reused; the
// manager creates a fresh session per `start_scan`.  Work units (pages or
// images) are processed strictly sequentially, so events reach the listener
// in loop order.  Cancellation is observed cooperatively at a checkpoint
// before each unit and again while awaiting the (possibly slow) extractor;
// a cancelled session stops without emitting any terminal event.

use std::sync::{Arc, Mutex};

use labscan_core::error::Result;
use labscan_core::{LabscanError, ScanEvent, ScanPayload, ScanRequest, ScanSource};
use labscan_document::{ImageLoader, PageRenderer, RasterImage, TextExtractor};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::config::ScanConfig;
use crate::parser::parse_biomarkers;

/// The external collaborators a session drives.
///
/// Cheaply cloneable (Arc-wrapped) so the manager can hand a copy to every
/// session it spawns.
#[derive(Clone)]
pub struct Collaborators {
    pub renderer: Arc<dyn PageRenderer>,
    pub loader: Arc<dyn ImageLoader>,
    pub extractor: Arc<dyn TextExtractor>,
}

/// Shared slot holding the currently attached listener.
///
/// Sessions resolve the listener at each emission instead of capturing a
/// sender at spawn time, so replacing the listener while a session is running
/// reroutes its remaining events to the new one.
#[derive(Clone, Default)]
pub(crate) struct ListenerSlot {
    tx: Arc<Mutex<Option<mpsc::UnboundedSender<ScanEvent>>>>,
}

impl ListenerSlot {
    pub(crate) fn replace(&self, tx: mpsc::UnboundedSender<ScanEvent>) {
        *self.tx.lock().expect("listener slot lock poisoned") = Some(tx);
    }

    pub(crate) fn clear(&self) {
        *self.tx.lock().expect("listener slot lock poisoned") = None;
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.tx.lock().expect("listener slot lock poisoned").is_some()
    }

    pub(crate) fn send(&self, event: ScanEvent) {
        // The listener may have detached; a dropped event is fine then.
        if let Some(tx) = &*self.tx.lock().expect("listener slot lock poisoned") {
            let _ = tx.send(event);
        }
    }
}

/// Event output gated on the session's cancellation token: once the session
/// is cancelled nothing further is delivered for it, even if an event was
/// produced by work already in flight.
struct EventSink {
    listener: ListenerSlot,
    token: CancellationToken,
}

impl EventSink {
    fn emit(&self, event: ScanEvent) {
        if self.token.is_cancelled() {
            return;
        }
        self.listener.send(event);
    }
}

pub(crate) struct ScanSession {
    id: Uuid,
    request: ScanRequest,
    config: ScanConfig,
    collaborators: Collaborators,
    sink: EventSink,
    token: CancellationToken,
}

impl ScanSession {
    pub(crate) fn new(
        request: ScanRequest,
        config: ScanConfig,
        collaborators: Collaborators,
        listener: ListenerSlot,
        token: CancellationToken,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            config,
            collaborators,
            sink: EventSink {
                listener,
                token: token.clone(),
            },
            token,
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    /// Run the session to its terminal state.
    ///
    /// Emits `Complete` on natural exhaustion, `Error` on the first fatal
    /// failure, and nothing at all when cancelled.
    #[instrument(skip_all, fields(session = %self.id, source = ?self.request.source))]
    pub(crate) async fn run(self) {
        info!("scan session started");

        let outcome = match self.request.source {
            ScanSource::Pdf => self.process_pdf().await,
            ScanSource::Images => self.process_images().await,
        };

        // Cancellation wins over whatever the loop was about to report.
        if self.token.is_cancelled() {
            debug!("session cancelled, no terminal event");
            return;
        }

        match outcome {
            Ok(()) => {
                info!("scan session complete");
                self.sink.emit(ScanEvent::Complete);
            }
            Err(err) => {
                error!(%err, "scan session failed");
                self.sink.emit(ScanEvent::failure(&err));
            }
        }
    }

    /// PDF path: progress is announced before the page is rendered, then the
    /// upscaled raster goes to the extractor.
    async fn process_pdf(&self) -> Result<()> {
        let path = self.request.primary_file_path();
        let mut pages = self.collaborators.renderer.open(&path)?;
        let total = pages.page_count();
        debug!(pages = total, "document opened");

        for index in 0..total {
            if self.token.is_cancelled() {
                return Ok(());
            }
            self.sink.emit(ScanEvent::Progress {
                page: index as u32 + 1,
                total_pages: total as u32,
            });

            // Raster lifetime is this iteration; dropped on every exit path.
            let raster = pages.render_page(index, self.config.render_scale)?;
            let Some(text) = self.recognize_guarded(&raster).await? else {
                return Ok(());
            };
            self.emit_structured(index as u32 + 1, total as u32, text);
        }
        Ok(())
    }

    /// Images path: a decode failure skips the unit silently, and progress is
    /// only announced for units that actually decoded.
    async fn process_images(&self) -> Result<()> {
        let paths = self.request.image_paths();
        if paths.is_empty() {
            return Err(LabscanError::NoImages);
        }
        let total = paths.len();

        for (index, path) in paths.iter().enumerate() {
            if self.token.is_cancelled() {
                return Ok(());
            }
            let Some(raster) = self.collaborators.loader.load(path) else {
                debug!(path = %path.display(), "undecodable image skipped");
                continue;
            };
            let Some(text) = self.recognize_guarded(&raster).await? else {
                return Ok(());
            };
            self.sink.emit(ScanEvent::Progress {
                page: index as u32 + 1,
                total_pages: total as u32,
            });
            self.emit_structured(index as u32 + 1, total as u32, text);
        }
        Ok(())
    }

    /// Await extraction under the cancellation token.
    ///
    /// `Ok(None)` means the session was cancelled while the extractor was
    /// running; the in-flight future is dropped and its result discarded.
    async fn recognize_guarded(&self, raster: &RasterImage) -> Result<Option<String>> {
        tokio::select! {
            _ = self.token.cancelled() => Ok(None),
            result = self.collaborators.extractor.recognize(raster) => result.map(Some),
        }
    }

    fn emit_structured(&self, page: u32, total_pages: u32, raw_text: String) {
        let biomarkers = parse_biomarkers(&raw_text);
        debug!(page, biomarkers = biomarkers.len(), "unit recognized");
        self.sink.emit(ScanEvent::Structured {
            page,
            total_pages,
            payload: ScanPayload {
                raw_text,
                biomarkers,
            },
        });
    }
}
