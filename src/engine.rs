use crate::error::PipelineError;
use image::DynamicImage;
use serde::Serialize;

/// A 2D integer point in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box, inclusive of `left`/`top`, exclusive of `right`/`bottom`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }
}

/// One recognized text region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Region outline, clockwise from the top-left corner
    pub polygon: Vec<Point>,
    pub text: String,
    pub confidence: Option<f32>,
}

impl Detection {
    pub fn new(polygon: Vec<Point>, text: impl Into<String>, confidence: Option<f32>) -> Self {
        Self {
            polygon,
            text: text.into(),
            confidence,
        }
    }

    /// Build a four-corner polygon from an axis-aligned box
    pub fn from_box(
        left: i32,
        top: i32,
        right: i32,
        bottom: i32,
        text: impl Into<String>,
        confidence: Option<f32>,
    ) -> Self {
        let polygon = vec![
            Point::new(left, top),
            Point::new(right, top),
            Point::new(right, bottom),
            Point::new(left, bottom),
        ];
        Self::new(polygon, text, confidence)
    }

    /// Smallest axis-aligned box enclosing the polygon
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.polygon.first()?;
        let init = BoundingBox {
            left: first.x,
            top: first.y,
            right: first.x,
            bottom: first.y,
        };
        Some(self.polygon.iter().fold(init, |b, p| BoundingBox {
            left: b.left.min(p.x),
            top: b.top.min(p.y),
            right: b.right.max(p.x),
            bottom: b.bottom.max(p.y),
        }))
    }
}

/// Trait that all OCR engines must implement
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs", "leptess")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Detect and recognize text regions, in the engine's reading order
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, PipelineError>;

    /// Get supported languages
    fn supported_languages(&self) -> Vec<String>;

    /// Whether the engine can recognize Cyrillic text
    fn reads_primary_script(&self) -> bool;
}

/// Join detection texts with single spaces, preserving engine order
pub fn extract_text(detections: &[Detection]) -> String {
    detections
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
