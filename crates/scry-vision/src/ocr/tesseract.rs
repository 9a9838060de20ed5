use super::{OcrEngine, OcrError, OcrResult};
use crate::types::{RecognizedToken, Region};
use async_trait::async_trait;
use std::path::Path;

/// Tesseract OCR via the command-line interface with TSV output.
pub struct TesseractOcr {
    binary: String,
    language: String,
}

impl TesseractOcr {
    /// Create the engine, verifying the binary is on PATH.
    pub fn new(binary: &str, language: &str) -> OcrResult<Self> {
        let check = std::process::Command::new("which").arg(binary).output();

        match check {
            Ok(output) if output.status.success() => Ok(Self {
                binary: binary.to_string(),
                language: language.to_string(),
            }),
            _ => Err(OcrError::EngineMissing(format!(
                "'{binary}' not found on PATH. To install tesseract:\n  \
                 macOS:   brew install tesseract tesseract-lang\n  \
                 Linux:   sudo apt-get install tesseract-ocr tesseract-ocr-rus (Ubuntu/Debian)\n  \
                 Windows: https://github.com/UB-Mannheim/tesseract/wiki"
            ))),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn extract_tokens(&self, image_path: &Path) -> OcrResult<Vec<RecognizedToken>> {
        let output = std::process::Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("tsv")
            .output()
            .map_err(|e| OcrError::EngineFailed(format!("failed to run {}: {e}", self.binary)))?;

        if !output.status.success() {
            return Err(OcrError::EngineFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(parse_tsv(&String::from_utf8_lossy(&output.stdout)))
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

/// Parse tesseract TSV output into tokens.
///
/// Columns: level, page_num, block_num, par_num, line_num, word_num,
/// left, top, width, height, conf, text. Structural rows carry conf -1
/// and no text; both they and whitespace-only fragments are dropped.
/// Words scored 0 are still tokens; thresholding is the locator's job.
/// Confidence arrives on a 0-100 scale and is normalized to 0-1.
fn parse_tsv(tsv: &str) -> Vec<RecognizedToken> {
    let mut tokens = Vec::new();

    for line in tsv.lines().skip(1) {
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 12 {
            continue;
        }

        if let (Ok(x), Ok(y), Ok(w), Ok(h), Ok(conf)) = (
            parts[6].parse::<i32>(),
            parts[7].parse::<i32>(),
            parts[8].parse::<u32>(),
            parts[9].parse::<u32>(),
            parts[10].parse::<f32>(),
        ) {
            let text = parts[11].trim();
            if !text.is_empty() && conf >= 0.0 {
                tokens.push(RecognizedToken::new(
                    text,
                    Region::new(x, y, w, h),
                    conf / 100.0,
                ));
            }
        }
    }

    tokens
}
