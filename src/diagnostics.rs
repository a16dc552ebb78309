use crate::engine::Detection;
use crate::error::PipelineError;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const BOX_THICKNESS: i32 = 2;

/// Name of the annotated copy of `source` inside `scratch_dir`
pub fn annotated_path(scratch_dir: &Path, source: &Path) -> Result<PathBuf, PipelineError> {
    let base = source.file_name().ok_or_else(|| {
        PipelineError::DiagnosticWriteError(format!("{:?} has no file name", source))
    })?;
    Ok(scratch_dir.join(format!("selected_{}", base.to_string_lossy())))
}

/// Draw every detection's bounding box onto a copy of the image
pub fn draw_detections(image: &DynamicImage, detections: &[Detection]) -> RgbImage {
    let mut canvas = image.to_rgb8();

    for bbox in detections.iter().filter_map(Detection::bounding_box) {
        for inset in 0..BOX_THICKNESS {
            let width = bbox.width() as i32 - 2 * inset;
            let height = bbox.height() as i32 - 2 * inset;
            if width <= 0 || height <= 0 {
                break;
            }
            let rect = Rect::at(bbox.left + inset, bbox.top + inset)
                .of_size(width as u32, height as u32);
            draw_hollow_rect_mut(&mut canvas, rect, BOX_COLOR);
        }
    }

    canvas
}

/// Save the annotated copy, returning where it was written
pub fn write_annotated(
    image: &DynamicImage,
    detections: &[Detection],
    source: &Path,
    scratch_dir: &Path,
) -> Result<PathBuf, PipelineError> {
    let output_path = annotated_path(scratch_dir, source)?;
    draw_detections(image, detections)
        .save(&output_path)
        .map_err(|e| {
            PipelineError::DiagnosticWriteError(format!("{}: {}", output_path.display(), e))
        })?;
    tracing::debug!(
        "Wrote annotated image with {} boxes to {:?}",
        detections.len(),
        output_path
    );
    Ok(output_path)
}
