use image::DynamicImage;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io::Cursor;

use crate::normalize::normalize;

/// A rectangular region on the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// X coordinate of the top-left corner
    pub x: i32,
    /// Y coordinate of the top-left corner
    pub y: i32,
    /// Width of the region
    pub width: u32,
    /// Height of the region
    pub height: u32,
}

impl Region {
    /// Create a new region.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if this region is valid (has positive dimensions).
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Get the center point of this region.
    pub fn center(&self) -> (i32, i32) {
        (
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// One OCR-recognized word or phrase fragment with its bounding box.
///
/// Confidence is normalized to 0.0-1.0 regardless of what the underlying
/// engine reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedToken {
    pub text: String,
    pub region: Region,
    pub confidence: f32,
}

impl RecognizedToken {
    pub fn new(text: impl Into<String>, region: Region, confidence: f32) -> Self {
        Self {
            text: text.into(),
            region,
            confidence,
        }
    }
}

/// Information about a window on screen.
#[derive(Debug, Clone)]
pub struct WindowInfo {
    /// Window ID (platform-specific)
    pub id: u64,
    /// Window title
    pub title: String,
    /// Owning application name
    pub app_name: String,
    /// Window region (position and size)
    pub region: Region,
    /// Whether the window is minimized
    pub is_minimized: bool,
}

/// A captured screenshot.
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// The captured image
    pub image: DynamicImage,
    /// Region that was captured, in screen coordinates
    pub region: Region,
    /// Timestamp of capture (Unix milliseconds)
    pub timestamp: i64,
    /// Source of the capture (monitor name, window title, etc.)
    pub source: String,
}

impl Screenshot {
    pub fn new(image: DynamicImage, region: Region, source: impl Into<String>) -> Self {
        Self {
            image,
            region,
            timestamp: chrono::Utc::now().timestamp_millis(),
            source: source.into(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encode the frame as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buffer = Cursor::new(Vec::new());
        self.image.write_to(&mut buffer, image::ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }

    /// Encode the frame as a base64 PNG string for embedding in JSON.
    pub fn to_base64_png(&self) -> Result<String, image::ImageError> {
        let bytes = self.to_png_bytes()?;
        Ok(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            &bytes,
        ))
    }
}

/// Mapping from normalized label text to a representative center point.
///
/// Duplicate labels overwrite the stored point but keep their original
/// position in iteration order, so lookups that scan entries see them in
/// first-insertion order. This mirrors how the interface cache files are
/// written and must not be "fixed" to confidence-based selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementMap {
    entries: Vec<(String, (i32, i32))>,
}

impl ElementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from recognized tokens: every non-empty token
    /// contributes its center under its normalized text, last write wins.
    pub fn from_tokens(tokens: &[RecognizedToken]) -> Self {
        let mut map = Self::new();
        for token in tokens {
            if token.text.trim().is_empty() {
                continue;
            }
            let label = normalize(&token.text);
            if label.is_empty() {
                continue;
            }
            map.insert(label, token.region.center());
        }
        map
    }

    /// Insert a label. An existing label keeps its position in iteration
    /// order; only the point is replaced.
    pub fn insert(&mut self, label: String, point: (i32, i32)) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == label) {
            entry.1 = point;
        } else {
            self.entries.push((label, point));
        }
    }

    /// Exact lookup by label.
    pub fn get(&self, label: &str) -> Option<(i32, i32)> {
        self.entries
            .iter()
            .find(|(k, _)| k == label)
            .map(|(_, p)| *p)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, (i32, i32))> {
        self.entries.iter().map(|(k, p)| (k.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels in insertion order, for logging.
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }
}

// Serialized as a flat JSON object { "label": [x, y], ... } to stay
// readable and compatible with hand-edited cache files.
impl Serialize for ElementMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, point) in &self.entries {
            map.serialize_entry(label, point)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ElementMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MapVisitor;

        impl<'de> Visitor<'de> for MapVisitor {
            type Value = ElementMap;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of labels to [x, y] pairs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = ElementMap::new();
                while let Some((label, point)) = access.next_entry::<String, (i32, i32)>()? {
                    map.insert(label, point);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(MapVisitor)
    }
}
