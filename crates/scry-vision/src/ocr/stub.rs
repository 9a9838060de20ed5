use super::{OcrEngine, OcrResult};
use crate::types::{RecognizedToken, Region};
use async_trait::async_trait;
use std::path::Path;
use tracing::warn;

/// Stub OCR engine substituted when no real engine is installed.
/// Returns a fixed token set so matching logic stays demonstrable.
pub struct StubOcr;

impl StubOcr {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StubOcr {
    fn default() -> Self {
        Self::new()
    }
}

/// The deterministic tokens the stub recognizes on every frame.
pub fn sample_tokens() -> Vec<RecognizedToken> {
    vec![
        RecognizedToken::new("Пример", Region::new(10, 10, 80, 30), 0.90),
        RecognizedToken::new("текста", Region::new(100, 10, 80, 30), 0.85),
        RecognizedToken::new("на", Region::new(200, 10, 80, 30), 0.95),
        RecognizedToken::new("экране", Region::new(300, 10, 80, 30), 0.80),
    ]
}

#[async_trait]
impl OcrEngine for StubOcr {
    async fn extract_tokens(&self, _image_path: &Path) -> OcrResult<Vec<RecognizedToken>> {
        warn!("OCR engine unavailable, returning placeholder tokens");
        Ok(sample_tokens())
    }

    fn name(&self) -> &str {
        "stub"
    }
}
