// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR text extractor backed by the `ocrs` crate, a pure-Rust OCR engine
// running neural network models via `rten`.
//
// Only available when the `ocr` feature is enabled.  The engine needs two
// model files (`text-detection.rten`, `text-recognition.rten`); the default
// location is the ocrs cache directory (`$XDG_CACHE_HOME/ocrs`, typically
// `~/.cache/ocrs`), populated by running `ocrs-cli` once.
//
// Note: compile `ocrs`/`rten` in release mode — debug builds are 10-100x
// slower, which matters when a session runs a page per recognition call.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use labscan_core::error::{LabscanError, Result};
use ocrs::{ImageSource as OcrsImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use rten::Model;
use tracing::{debug, info, instrument};

use crate::source::{RasterImage, TextExtractor};

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Default directory for cached OCR model files (XDG base directory spec).
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Model file locations for constructing an [`OcrTextExtractor`].
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    /// Config pointing at a directory containing both model files under
    /// their well-known names.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Verify that both model files exist before attempting the (slow) load.
    pub fn validate(&self) -> Result<()> {
        for path in [&self.detection_model_path, &self.recognition_model_path] {
            if !path.exists() {
                return Err(LabscanError::Extraction(format!(
                    "OCR model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Text extractor wrapping a shared `ocrs` engine.
///
/// Engine construction loads the models and is the expensive step; the
/// extractor is then reused across pages and sessions.  Recognition itself
/// is CPU-bound and runs on the blocking thread pool so the session loop's
/// cancellation checkpoints stay responsive.
pub struct OcrTextExtractor {
    engine: Arc<OcrsEngine>,
}

impl OcrTextExtractor {
    /// Load models from `config` and initialise the engine.
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: OcrConfig) -> Result<Self> {
        config.validate()?;

        let detection_model = Model::load_file(&config.detection_model_path).map_err(|err| {
            LabscanError::Extraction(format!(
                "failed to load detection model from {}: {err}",
                config.detection_model_path.display()
            ))
        })?;
        let recognition_model = Model::load_file(&config.recognition_model_path).map_err(|err| {
            LabscanError::Extraction(format!(
                "failed to load recognition model from {}: {err}",
                config.recognition_model_path.display()
            ))
        })?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| LabscanError::Extraction(format!("failed to initialise OCR engine: {err}")))?;

        info!("OCR engine initialised");
        Ok(Self {
            engine: Arc::new(engine),
        })
    }

    /// Initialise from the default model cache directory.
    pub fn with_defaults() -> Result<Self> {
        Self::new(OcrConfig::default())
    }
}

#[async_trait]
impl TextExtractor for OcrTextExtractor {
    async fn recognize(&self, image: &RasterImage) -> Result<String> {
        // ocrs wants RGB8; convert up front so the blocking task owns its input.
        let rgb = image.to_rgb8();
        let engine = Arc::clone(&self.engine);

        let text = tokio::task::spawn_blocking(move || {
            let (width, height) = rgb.dimensions();
            let source = OcrsImageSource::from_bytes(rgb.as_raw(), (width, height))
                .map_err(|err| LabscanError::Extraction(format!("bad image source: {err}")))?;
            let input = engine
                .prepare_input(source)
                .map_err(|err| LabscanError::Extraction(format!("OCR preprocessing failed: {err}")))?;
            engine
                .get_text(&input)
                .map_err(|err| LabscanError::Extraction(format!("OCR recognition failed: {err}")))
        })
        .await
        .map_err(|err| LabscanError::Extraction(format!("recognition task failed: {err}")))??;

        debug!(
            line_count = text.lines().count(),
            char_count = text.len(),
            "OCR recognition complete"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_well_known_filenames() {
        let config = OcrConfig::default();
        assert!(
            config
                .detection_model_path
                .to_string_lossy()
                .ends_with(DETECTION_MODEL_FILENAME)
        );
        assert!(
            config
                .recognition_model_path
                .to_string_lossy()
                .ends_with(RECOGNITION_MODEL_FILENAME)
        );
    }

    #[test]
    fn validate_fails_for_missing_models() {
        let config = OcrConfig::from_dir("/nonexistent/ocr-models");
        assert!(config.validate().is_err());
    }
}
