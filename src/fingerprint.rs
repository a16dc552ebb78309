//! Average-hash fingerprints for duplicate suppression.
//!
//! The image is reduced to an 8x8 grayscale grid; each cell contributes one
//! bit, set when the cell is brighter than the grid mean. Bits are packed
//! row-major, most significant first, and rendered as 16 lowercase hex digits.

use crate::error::PipelineError;
use image::{imageops::FilterType, DynamicImage, GrayImage, ImageReader};
use std::path::Path;

/// Side length of the hashing grid
pub const GRID_SIZE: u32 = 8;

/// Number of hex digits in a fingerprint
pub const FINGERPRINT_LEN: usize = (GRID_SIZE * GRID_SIZE / 4) as usize;

/// Decode an image by content, not by file extension
pub fn load_image(path: &Path) -> Result<DynamicImage, PipelineError> {
    ImageReader::open(path)
        .map_err(|e| PipelineError::ReadError(format!("{}: {}", path.display(), e)))?
        .with_guessed_format()
        .map_err(|e| PipelineError::ReadError(format!("{}: {}", path.display(), e)))?
        .decode()
        .map_err(|e| PipelineError::ReadError(format!("{}: {}", path.display(), e)))
}

/// Fingerprint the image stored at `path`
pub fn fingerprint(path: &Path) -> Result<String, PipelineError> {
    let image = load_image(path)?;
    fingerprint_image(&image)
}

/// Fingerprint an already decoded image
pub fn fingerprint_image(image: &DynamicImage) -> Result<String, PipelineError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(PipelineError::HashError(format!(
            "image has no pixels ({}x{})",
            image.width(),
            image.height()
        )));
    }

    let grid = downsample(image);
    Ok(format!("{:0width$x}", mask(&grid), width = FINGERPRINT_LEN))
}

/// Exact-equality duplicate test
pub fn matches(a: &str, b: &str) -> bool {
    a == b
}

fn downsample(image: &DynamicImage) -> GrayImage {
    let gray = image.to_luma8();
    image::imageops::resize(&gray, GRID_SIZE, GRID_SIZE, FilterType::Triangle)
}

fn mask(grid: &GrayImage) -> u64 {
    let cells = grid.as_raw();
    let total: u64 = cells.iter().map(|&v| v as u64).sum();
    let mean = total as f64 / cells.len() as f64;

    cells
        .iter()
        .fold(0u64, |acc, &v| (acc << 1) | u64::from(v as f64 > mean))
}
