//! Screen vision for scry: capture a frame, recognize the text on it,
//! and locate the element a caller is asking about.

pub mod capture;
pub mod locator;
pub mod normalize;
pub mod ocr;
pub mod types;
pub mod window;

pub use capture::{
    create_screen_capture, CaptureError, CaptureResult, CapturedScreen, Capturer, ScreenCapture,
    StubCapture,
};
pub use locator::{locate, DEFAULT_CONFIDENCE_THRESHOLD};
pub use normalize::{normalize, sanitize_filename};
pub use ocr::{
    create_ocr_engine, join_tokens, Extractor, OcrEngine, OcrError, OcrResult, StubOcr,
    TesseractOcr,
};
pub use types::{ElementMap, RecognizedToken, Region, Screenshot, WindowInfo};
pub use window::{create_window_query, StubWindowQuery, WindowQuery};
