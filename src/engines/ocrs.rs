//! OCRS engine implementation
//!
//! Pure Rust OCR engine using the ocrs library. No system dependencies required.
//! Downloads neural network models automatically on first use. Recognizes the
//! Latin alphabet only.

use super::models::{cache_root, ensure_downloaded};
use crate::engine::{Detection, OcrEngine};
use crate::error::PipelineError;
use image::DynamicImage;
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams};
use rten::Model;

/// Default model URLs from the ocrs project
const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

/// OCR Engine wrapping the ocrs library
pub struct OcrsEngine {
    engine: OcrsOcrEngine,
}

impl OcrsEngine {
    /// Create a new engine, downloading models if needed
    pub fn new() -> Result<Self, PipelineError> {
        tracing::info!("Initializing ocrs OCR engine...");

        let model_dir = cache_root().join("ocrs");
        let detection_model_path =
            ensure_downloaded(DETECTION_MODEL_URL, &model_dir, "text-detection.rten")?;
        let recognition_model_path =
            ensure_downloaded(RECOGNITION_MODEL_URL, &model_dir, "text-recognition.rten")?;

        let detection_model = Model::load_file(&detection_model_path).map_err(|e| {
            PipelineError::InitializationError(format!("Failed to load detection model: {}", e))
        })?;
        let recognition_model = Model::load_file(&recognition_model_path).map_err(|e| {
            PipelineError::InitializationError(format!(
                "Failed to load recognition model: {}",
                e
            ))
        })?;

        let engine = OcrsOcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| {
            PipelineError::InitializationError(format!("Failed to create OCR engine: {}", e))
        })?;

        tracing::info!("ocrs engine initialized successfully");

        Ok(Self { engine })
    }
}

impl OcrEngine for OcrsEngine {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    fn description(&self) -> &'static str {
        "Pure Rust OCR engine - fast, no system dependencies required, Latin only"
    }

    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, PipelineError> {
        // HWC RGB is what ImageSource::from_bytes expects
        let rgb_img = image.to_rgb8();
        let dimensions = rgb_img.dimensions();

        let img_source = ImageSource::from_bytes(rgb_img.as_raw(), dimensions).map_err(|e| {
            PipelineError::OcrError(format!("Failed to create image source: {}", e))
        })?;

        let ocr_input = self
            .engine
            .prepare_input(img_source)
            .map_err(|e| PipelineError::OcrError(format!("Failed to prepare input: {}", e)))?;

        let word_rects = self
            .engine
            .detect_words(&ocr_input)
            .map_err(|e| PipelineError::OcrError(format!("Failed to detect words: {}", e)))?;

        let line_rects = self.engine.find_text_lines(&ocr_input, &word_rects);

        let line_texts = self
            .engine
            .recognize_text(&ocr_input, &line_rects)
            .map_err(|e| PipelineError::OcrError(format!("Failed to recognize text: {}", e)))?;

        let detections = line_rects
            .iter()
            .zip(line_texts.iter())
            .filter_map(|(rects, line)| {
                let line = line.as_ref()?;
                let text = line
                    .words()
                    .map(|word| word.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                if text.trim().is_empty() {
                    return None;
                }

                let corners = rects.iter().flat_map(|r| r.corners());
                let (mut left, mut top) = (f32::MAX, f32::MAX);
                let (mut right, mut bottom) = (f32::MIN, f32::MIN);
                for c in corners {
                    left = left.min(c.x);
                    top = top.min(c.y);
                    right = right.max(c.x);
                    bottom = bottom.max(c.y);
                }
                if left > right {
                    return None;
                }

                Some(Detection::from_box(
                    left.floor() as i32,
                    top.floor() as i32,
                    right.ceil() as i32,
                    bottom.ceil() as i32,
                    text,
                    None,
                ))
            })
            .collect();

        Ok(detections)
    }

    fn supported_languages(&self) -> Vec<String> {
        // ocrs currently only supports English/Latin alphabet
        vec!["eng".to_string()]
    }

    fn reads_primary_script(&self) -> bool {
        false
    }
}
