//! OCR extraction: turn a captured frame into recognized text tokens.

use crate::types::{RecognizedToken, Screenshot};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, warn};

pub mod stub;
pub mod tesseract;

pub use stub::StubOcr;
pub use tesseract::TesseractOcr;

/// Errors that can occur while running OCR.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR engine not installed: {0}")]
    EngineMissing(String),

    #[error("OCR engine failed: {0}")]
    EngineFailed(String),

    #[error("could not prepare image for OCR: {0}")]
    ImagePreparation(String),
}

/// Result type for OCR operations.
pub type OcrResult<T> = Result<T, OcrError>;

/// OCR engine trait for text recognition with bounding boxes.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Extract recognized tokens from an image file.
    async fn extract_tokens(&self, image_path: &Path) -> OcrResult<Vec<RecognizedToken>>;

    /// Get the name of the OCR engine.
    fn name(&self) -> &str;
}

/// Join token texts in reading order.
pub fn join_tokens(tokens: &[RecognizedToken]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Select the OCR engine for the probed environment. Falls back to the
/// stub when the real engine cannot be constructed.
pub fn create_ocr_engine(has_ocr: bool, binary: &str, language: &str) -> Box<dyn OcrEngine> {
    if has_ocr {
        match TesseractOcr::new(binary, language) {
            Ok(engine) => return Box::new(engine),
            Err(e) => warn!("{e}"),
        }
    }
    Box::new(StubOcr::new())
}

/// OCR extractor service over an engine. Engine failures never escape:
/// they are logged and reported as an empty token list.
pub struct Extractor {
    engine: Box<dyn OcrEngine>,
}

impl Extractor {
    pub fn new(engine: Box<dyn OcrEngine>) -> Self {
        Self { engine }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Extract tokens from an in-memory screenshot. The frame is staged
    /// through a temporary PNG because the engines operate on files.
    pub async fn extract_tokens(&self, screenshot: &Screenshot) -> Vec<RecognizedToken> {
        let path = match self.stage_frame(screenshot) {
            Ok(path) => path,
            Err(e) => {
                error!("OCR skipped: {e}");
                return Vec::new();
            }
        };

        let tokens = self.extract_tokens_from_path(&path).await;
        if let Err(e) = std::fs::remove_file(&path) {
            debug!("could not remove staged frame {}: {e}", path.display());
        }
        tokens
    }

    /// Extract tokens from an image file already on disk.
    pub async fn extract_tokens_from_path(&self, path: &Path) -> Vec<RecognizedToken> {
        match self.engine.extract_tokens(path).await {
            Ok(tokens) => {
                debug!(
                    "{} recognized {} tokens in {}",
                    self.engine.name(),
                    tokens.len(),
                    path.display()
                );
                tokens
            }
            Err(e) => {
                error!("OCR failed on {}: {e}", path.display());
                Vec::new()
            }
        }
    }

    /// Recognized text joined in reading order.
    pub async fn extract_text(&self, screenshot: &Screenshot) -> String {
        join_tokens(&self.extract_tokens(screenshot).await)
    }

    fn stage_frame(&self, screenshot: &Screenshot) -> OcrResult<PathBuf> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let path = std::env::temp_dir().join(format!("scry_ocr_{timestamp}.png"));
        screenshot
            .image
            .save(&path)
            .map_err(|e| OcrError::ImagePreparation(e.to_string()))?;
        Ok(path)
    }
}
