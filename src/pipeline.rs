//! Per-image orchestration.
//!
//! `Pipeline` owns the process-wide context: the OCR engine, both spelling
//! dictionaries, the vocabulary and the linguistic model. It is built once and
//! only read afterwards, so one instance can be shared behind an `Arc`.
//!
//! Stage order is fixed: fingerprint, OCR, diagnostic image, clean, correct,
//! analyze. Failures skip the image; only a failed diagnostic write escapes.

use crate::analysis::{Analyzer, EntityBuckets, RuleModel};
use crate::clean::clean;
use crate::config::Config;
use crate::diagnostics;
use crate::engine::{extract_text, OcrEngine};
use crate::engines;
use crate::error::PipelineError;
use crate::fingerprint::{self, fingerprint_image, load_image};
use crate::spelling::{HunspellDictionary, SpellCorrector};
use crate::vocabulary::Vocabulary;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Annotated output for one image
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub fingerprint: String,
    /// Normalized text followed by the entity summary
    pub annotated_text: String,
    pub entities: EntityBuckets,
    pub success: bool,
}

/// What happened to one image
#[derive(Debug)]
pub enum Outcome {
    Annotated(PipelineResult),
    /// The image was skipped; the caller moves on to the next one
    Skipped(PipelineError),
}

impl Outcome {
    pub fn into_result(self) -> Option<PipelineResult> {
        match self {
            Outcome::Annotated(result) => Some(result),
            Outcome::Skipped(_) => None,
        }
    }
}

pub struct Pipeline {
    engine: Arc<dyn OcrEngine>,
    corrector: SpellCorrector,
    analyzer: Analyzer,
    scratch_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        engine: Arc<dyn OcrEngine>,
        corrector: SpellCorrector,
        analyzer: Analyzer,
        scratch_dir: impl Into<PathBuf>,
    ) -> Result<Self, PipelineError> {
        let scratch_dir = scratch_dir.into();
        std::fs::create_dir_all(&scratch_dir).map_err(|e| {
            PipelineError::InitializationError(format!(
                "Failed to create scratch directory {:?}: {}",
                scratch_dir, e
            ))
        })?;

        Ok(Self {
            engine,
            corrector,
            analyzer,
            scratch_dir,
        })
    }

    /// Load every resource named in the configuration
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let vocabulary = Arc::new(Vocabulary::load(&config.vocabulary_path)?);
        let primary = HunspellDictionary::load(&config.primary_dictionary)?;
        let secondary = HunspellDictionary::load(&config.secondary_dictionary)?;
        let corrector = SpellCorrector::new(Arc::new(primary), Arc::new(secondary), vocabulary.clone());
        let analyzer = Analyzer::new(Arc::new(RuleModel::new()), vocabulary);
        let engine = engines::create(config)?;

        tracing::info!(
            "Pipeline ready (engine: {}, analysis: {}, scratch: {:?})",
            engine.name(),
            analyzer.model_name(),
            config.scratch_dir
        );

        Self::new(engine, corrector, analyzer, &config.scratch_dir)
    }

    pub fn engine(&self) -> &dyn OcrEngine {
        self.engine.as_ref()
    }

    /// Run every stage for one image
    ///
    /// Returns `Err` only when the diagnostic image cannot be written. Every
    /// other failure is logged and reported as [`Outcome::Skipped`].
    pub fn process(&self, path: &Path) -> Result<Outcome, PipelineError> {
        match self.run_stages(path) {
            Ok(result) => Ok(Outcome::Annotated(result)),
            Err(e) if e.is_fatal() => {
                tracing::error!(path = %path.display(), code = e.kind(), "{}", e);
                Err(e)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), code = e.kind(), "Skipping image: {}", e);
                Ok(Outcome::Skipped(e))
            }
        }
    }

    fn run_stages(&self, path: &Path) -> Result<PipelineResult, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::NotFoundError(path.to_path_buf()));
        }

        let image = load_image(path)?;
        let fingerprint = fingerprint_image(&image)?;

        let detections = self.engine.detect(&image)?;
        let text = extract_text(&detections);
        tracing::debug!(
            path = %path.display(),
            detections = detections.len(),
            chars = text.chars().count(),
            "OCR complete"
        );

        diagnostics::write_annotated(&image, &detections, path, &self.scratch_dir)?;

        let cleaned = self.clean(&text);
        let corrected = self.correct(&cleaned);
        let analysis = self.analyzer.analyze(&corrected);

        Ok(PipelineResult {
            fingerprint,
            annotated_text: analysis.annotated_text(),
            entities: analysis.buckets,
            success: true,
        })
    }

    pub fn clean(&self, text: &str) -> String {
        clean(text)
    }

    pub fn correct(&self, text: &str) -> String {
        self.corrector.correct(text)
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Exact-equality duplicate check; an unreadable image is never a duplicate
    pub fn is_duplicate(&self, path: &Path, known_fingerprint: &str) -> bool {
        match fingerprint::fingerprint(path) {
            Ok(current) => fingerprint::matches(&current, known_fingerprint),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Cannot verify duplicate: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::FailingModel;
    use crate::engine::Detection;
    use crate::spelling::tests::MapDictionary;
    use image::{DynamicImage, Rgb, RgbImage};

    struct StubEngine(Vec<Detection>);

    impl OcrEngine for StubEngine {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn description(&self) -> &'static str {
            "fixed detections"
        }

        fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>, PipelineError> {
            Ok(self.0.clone())
        }

        fn supported_languages(&self) -> Vec<String> {
            vec!["rus".into(), "eng".into()]
        }

        fn reads_primary_script(&self) -> bool {
            true
        }
    }

    fn pipeline_with(
        detections: Vec<Detection>,
        analyzer: Analyzer,
        scratch: &Path,
    ) -> Pipeline {
        let vocabulary = Arc::new(Vocabulary::default());
        let corrector = SpellCorrector::new(
            Arc::new(MapDictionary::new(&[], &[("превет", &["привет"])])),
            Arc::new(MapDictionary::new(&[], &[])),
            vocabulary,
        );
        Pipeline::new(Arc::new(StubEngine(detections)), corrector, analyzer, scratch).unwrap()
    }

    fn save_image(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(40, 40, Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_analysis_failure_keeps_corrected_text() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = Analyzer::new(Arc::new(FailingModel), Arc::new(Vocabulary::default()));
        let pipeline = pipeline_with(
            vec![Detection::from_box(0, 0, 10, 10, "превет ,", None)],
            analyzer,
            &dir.path().join("scratch"),
        );
        let image = save_image(dir.path(), "a.png");

        let result = pipeline.process(&image).unwrap().into_result().unwrap();
        assert!(result.success);
        assert!(result.annotated_text.starts_with("привет ,\n"));
        assert!(result.entities.is_empty());
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = Analyzer::new(Arc::new(RuleModel::new()), Arc::new(Vocabulary::default()));
        let pipeline = pipeline_with(vec![], analyzer, dir.path());

        match pipeline.process(&dir.path().join("missing.png")).unwrap() {
            Outcome::Skipped(PipelineError::NotFoundError(_)) => {}
            other => panic!("expected not-found skip, got {:?}", other),
        }
    }

    #[test]
    fn test_unwritable_scratch_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch");
        let analyzer = Analyzer::new(Arc::new(RuleModel::new()), Arc::new(Vocabulary::default()));
        let pipeline = pipeline_with(vec![], analyzer, &scratch);
        std::fs::remove_dir_all(&scratch).unwrap();

        let image = save_image(dir.path(), "a.png");
        assert!(matches!(
            pipeline.process(&image),
            Err(PipelineError::DiagnosticWriteError(_))
        ));
    }

    #[test]
    fn test_is_duplicate_is_false_for_unreadable_images() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = Analyzer::new(Arc::new(RuleModel::new()), Arc::new(Vocabulary::default()));
        let pipeline = pipeline_with(vec![], analyzer, dir.path());
        let broken = dir.path().join("broken.png");
        std::fs::write(&broken, b"junk").unwrap();

        assert!(!pipeline.is_duplicate(&broken, "0000000000000000"));

        let image = save_image(dir.path(), "white.png");
        assert!(pipeline.is_duplicate(&image, "0000000000000000"));
    }
}
