//! Leptess/Tesseract engine implementation
//!
//! Tesseract-based OCR engine, configured with every language in the
//! `OCR_LANGUAGES` string (Cyrillic and Latin by default). Uses the
//! tesseract-static crate for static linking and downloads tessdata on first
//! use. Words are grouped into paragraph-level detections from Tesseract's
//! TSV output.

use super::models::{cache_root, ensure_downloaded};
use crate::config::Config;
use crate::engine::{Detection, OcrEngine};
use crate::error::PipelineError;
use image::DynamicImage;
use std::path::PathBuf;
use tesseract_static::tesseract::Tesseract;

/// TSV row level for a paragraph
const LEVEL_PARAGRAPH: u32 = 3;
/// TSV row level for a word
const LEVEL_WORD: u32 = 5;

/// Tesseract OCR Engine
pub struct LeptessEngine {
    /// Path to tessdata directory
    tessdata_path: String,
    /// Tesseract language string, e.g. "rus+eng"
    languages: String,
    language_codes: Vec<String>,
}

impl LeptessEngine {
    /// Create a new Tesseract-based OCR engine
    pub fn new(config: &Config) -> Result<Self, PipelineError> {
        let language_codes = config.language_codes();
        if language_codes.is_empty() {
            return Err(PipelineError::InitializationError(
                "No OCR languages configured".to_string(),
            ));
        }
        let languages = language_codes.join("+");

        let tessdata_path = match &config.tessdata_path {
            Some(path) => path.clone(),
            None => ensure_tessdata_available(&language_codes)?,
        };

        // Validate that tessdata is accessible by doing a test initialization
        let test_tess = Tesseract::new(Some(&tessdata_path), Some(&languages)).map_err(|e| {
            PipelineError::InitializationError(format!("Failed to initialize Tesseract: {}", e))
        })?;
        drop(test_tess);

        tracing::info!(
            "Leptess engine initialized (tessdata: {}, languages: {})",
            tessdata_path,
            languages
        );

        Ok(Self {
            tessdata_path,
            languages,
            language_codes,
        })
    }
}

impl OcrEngine for LeptessEngine {
    fn name(&self) -> &'static str {
        "leptess"
    }

    fn description(&self) -> &'static str {
        "Tesseract OCR engine - multilingual, paragraph-level regions"
    }

    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, PipelineError> {
        let rgb_img = image.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        // BMP is always supported by leptonica
        let mut bmp_data = Vec::new();
        rgb_img
            .write_to(&mut std::io::Cursor::new(&mut bmp_data), image::ImageFormat::Bmp)
            .map_err(|e| PipelineError::OcrError(format!("Failed to convert to BMP: {}", e)))?;

        tracing::debug!(
            "Processing image: {}x{}, BMP size: {} bytes",
            width,
            height,
            bmp_data.len()
        );

        let mut tess = Tesseract::new(Some(&self.tessdata_path), Some(&self.languages))
            .map_err(|e| PipelineError::OcrError(format!("Failed to create Tesseract: {}", e)))?;

        tess = tess.set_image_from_mem(&bmp_data).map_err(|e| {
            PipelineError::OcrError(format!(
                "Failed to set image ({}x{}, {} bytes): {}",
                width,
                height,
                bmp_data.len(),
                e
            ))
        })?;

        tess = tess
            .recognize()
            .map_err(|e| PipelineError::OcrError(format!("Failed to recognize text: {}", e)))?;

        let tsv = tess
            .get_tsv_text(0)
            .map_err(|e| PipelineError::OcrError(format!("Failed to get TSV output: {}", e)))?;

        Ok(paragraphs_from_tsv(&tsv))
    }

    fn supported_languages(&self) -> Vec<String> {
        self.language_codes.clone()
    }

    fn reads_primary_script(&self) -> bool {
        self.language_codes.iter().any(|l| l == "rus")
    }
}

#[derive(Debug)]
struct Paragraph {
    key: (u32, u32),
    bbox: Option<(i32, i32, i32, i32)>,
    words: Vec<String>,
    confidences: Vec<f32>,
}

/// Group Tesseract TSV word rows into paragraph detections, in output order
///
/// Columns: level, page_num, block_num, par_num, line_num, word_num,
/// left, top, width, height, conf, text.
fn paragraphs_from_tsv(tsv: &str) -> Vec<Detection> {
    let mut paragraphs: Vec<Paragraph> = Vec::new();

    for line in tsv.lines() {
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 11 {
            continue;
        }
        let Ok(level) = cols[0].parse::<u32>() else {
            // Header row
            continue;
        };
        let (Ok(block), Ok(par)) = (cols[2].parse::<u32>(), cols[3].parse::<u32>()) else {
            continue;
        };
        let key = (block, par);

        let geometry = (
            cols[6].parse::<i32>(),
            cols[7].parse::<i32>(),
            cols[8].parse::<i32>(),
            cols[9].parse::<i32>(),
        );
        let (Ok(left), Ok(top), Ok(w), Ok(h)) = geometry else {
            continue;
        };

        let index = match paragraphs.iter().position(|p| p.key == key) {
            Some(i) => i,
            None => {
                paragraphs.push(Paragraph {
                    key,
                    bbox: None,
                    words: Vec::new(),
                    confidences: Vec::new(),
                });
                paragraphs.len() - 1
            }
        };
        let paragraph = &mut paragraphs[index];

        match level {
            LEVEL_PARAGRAPH => paragraph.bbox = Some((left, top, left + w, top + h)),
            LEVEL_WORD => {
                let text = cols.get(11).map(|t| t.trim()).unwrap_or_default();
                let conf = cols[10].parse::<f32>().unwrap_or(-1.0);
                if text.is_empty() || conf < 0.0 {
                    continue;
                }
                paragraph.words.push(text.to_string());
                paragraph.confidences.push(conf / 100.0);
                if paragraph.bbox.is_none() {
                    paragraph.bbox = Some((left, top, left + w, top + h));
                }
            }
            _ => {}
        }
    }

    paragraphs
        .into_iter()
        .filter(|p| !p.words.is_empty())
        .filter_map(|p| {
            let (left, top, right, bottom) = p.bbox?;
            let confidence = p.confidences.iter().sum::<f32>() / p.confidences.len() as f32;
            Some(Detection::from_box(
                left,
                top,
                right,
                bottom,
                p.words.join(" "),
                Some(confidence),
            ))
        })
        .collect()
}

/// Ensure tessdata for every language is available, downloading if needed
fn ensure_tessdata_available(languages: &[String]) -> Result<String, PipelineError> {
    let cache_dir: PathBuf = cache_root().join("tessdata");

    for language in languages {
        let traineddata_file = format!("{}.traineddata", language);
        ensure_downloaded(&tessdata_url(language), &cache_dir, &traineddata_file)?;
    }

    // Tesseract expects the directory, not the file
    cache_dir
        .to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| PipelineError::InitializationError("Invalid tessdata path".to_string()))
}

/// Get tessdata download URL for a language
fn tessdata_url(language: &str) -> String {
    // Use tessdata_fast for smaller, faster downloads
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    )
}
