use image::{DynamicImage, Rgb, RgbImage};
use screenshot_annotator::analysis::{
    Document, EntityKind, Relation, RuleModel, Span, Token, Upos,
};
use screenshot_annotator::fingerprint;
use screenshot_annotator::{
    Analyzer, Detection, LinguisticModel, OcrEngine, Outcome, Pipeline, PipelineError,
    PipelineResult, SpellCorrector, SpellDictionary, Vocabulary,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Engine returning the same detections for every image
struct ScriptedEngine(Vec<Detection>);

impl OcrEngine for ScriptedEngine {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn description(&self) -> &'static str {
        "returns fixed detections"
    }

    fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>, PipelineError> {
        Ok(self.0.clone())
    }

    fn supported_languages(&self) -> Vec<String> {
        vec!["rus".to_string(), "eng".to_string()]
    }

    fn reads_primary_script(&self) -> bool {
        true
    }
}

struct BrokenEngine;

impl OcrEngine for BrokenEngine {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn description(&self) -> &'static str {
        "always fails"
    }

    fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>, PipelineError> {
        Err(PipelineError::OcrError("recognizer unavailable".to_string()))
    }

    fn supported_languages(&self) -> Vec<String> {
        vec![]
    }

    fn reads_primary_script(&self) -> bool {
        false
    }
}

/// Dictionary accepting every word
struct AcceptAll;

impl SpellDictionary for AcceptAll {
    fn check(&self, _word: &str) -> bool {
        true
    }

    fn suggest(&self, _word: &str) -> Vec<String> {
        vec![]
    }
}

/// Model producing one subject token and one person span
struct ParsedModel;

impl LinguisticModel for ParsedModel {
    fn name(&self) -> &'static str {
        "parsed"
    }

    fn annotate(&self, text: &str) -> Result<Document, PipelineError> {
        let mut tokens = Vec::new();
        let mut offset = 0;
        for (i, word) in text.split(' ').enumerate() {
            tokens.push(Token {
                text: word.to_string(),
                start: offset,
                end: offset + word.len(),
                pos: if i == 0 { Upos::Propn } else { Upos::Verb },
                rel: Some(Relation::from_label(if i == 0 { "nsubj" } else { "root" })),
                lemma: None,
            });
            offset += word.len() + 1;
        }
        let first = tokens[0].clone();
        Ok(Document {
            spans: vec![Span {
                kind: EntityKind::Person,
                text: first.text.clone(),
                start: first.start,
                end: first.end,
                normal: None,
            }],
            tokens,
        })
    }
}

struct Fixture {
    dir: TempDir,
    scratch: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch");
        Self { dir, scratch }
    }

    fn pipeline(&self, engine: impl OcrEngine + 'static) -> Pipeline {
        self.pipeline_with_model(engine, RuleModel::new())
    }

    fn pipeline_with_model(
        &self,
        engine: impl OcrEngine + 'static,
        model: impl LinguisticModel + 'static,
    ) -> Pipeline {
        let vocabulary = Arc::new(Vocabulary::default());
        let corrector =
            SpellCorrector::new(Arc::new(AcceptAll), Arc::new(AcceptAll), vocabulary.clone());
        let analyzer = Analyzer::new(Arc::new(model), vocabulary);
        Pipeline::new(Arc::new(engine), corrector, analyzer, &self.scratch).unwrap()
    }

    /// Half-black, half-white screenshot
    fn screenshot(&self, name: &str) -> PathBuf {
        let img = RgbImage::from_fn(64, 32, |x, _| {
            if x < 32 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let path = self.dir.path().join(name);
        img.save(&path).unwrap();
        path
    }
}

fn line(text: &str) -> Detection {
    Detection::from_box(2, 2, 60, 14, text, Some(0.9))
}

fn annotated(pipeline: &Pipeline, path: &Path) -> PipelineResult {
    match pipeline.process(path).unwrap() {
        Outcome::Annotated(result) => result,
        Outcome::Skipped(e) => panic!("image was skipped: {}", e),
    }
}

#[test]
fn test_misrecognized_token_is_repaired_end_to_end() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(ScriptedEngine(vec![line("Проверьте сгг")]));
    let path = fixture.screenshot("net.png");

    let result = annotated(&pipeline, &path);
    assert!(result.success);
    assert!(result.annotated_text.starts_with("Проверьте сеть\n"));
}

#[test]
fn test_image_without_text_still_produces_result() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(ScriptedEngine(vec![]));
    let path = fixture.screenshot("blank.png");

    let result = annotated(&pipeline, &path);
    assert_eq!(
        result.annotated_text,
        "\nМорфологический анализ: Объекты: ; Субъекты: ; Имена: ; Даты: ."
    );
    assert!(result.entities.is_empty());
    assert_eq!(result.fingerprint.len(), 16);
}

#[test]
fn test_corrupt_file_is_skipped_with_read_error() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(ScriptedEngine(vec![line("текст")]));
    let path = fixture.dir.path().join("corrupt.png");
    std::fs::write(&path, b"this is not an image").unwrap();

    assert!(matches!(
        fingerprint::fingerprint(&path),
        Err(PipelineError::ReadError(_))
    ));
    assert!(matches!(
        pipeline.process(&path).unwrap(),
        Outcome::Skipped(PipelineError::ReadError(_))
    ));
}

#[test]
fn test_ocr_failure_is_skipped() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(BrokenEngine);
    let path = fixture.screenshot("shot.png");

    assert!(matches!(
        pipeline.process(&path).unwrap(),
        Outcome::Skipped(PipelineError::OcrError(_))
    ));
}

#[test]
fn test_byte_identical_copy_is_duplicate() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(ScriptedEngine(vec![line("отчёт")]));
    let first = fixture.screenshot("first.png");
    let second = fixture.dir.path().join("second.png");
    std::fs::copy(&first, &second).unwrap();

    let result = annotated(&pipeline, &first);
    assert_eq!(fingerprint::fingerprint(&second).unwrap(), result.fingerprint);
    assert!(pipeline.is_duplicate(&second, &result.fingerprint));
}

#[test]
fn test_diagnostic_image_is_written_to_scratch() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(ScriptedEngine(vec![line("окно")]));
    let path = fixture.screenshot("window.png");

    annotated(&pipeline, &path);
    let diagnostic = fixture.scratch.join("selected_window.png");
    let saved = image::open(&diagnostic).unwrap().to_rgb8();
    assert_eq!(*saved.get_pixel(2, 2), Rgb([0, 255, 0]));
}

#[test]
fn test_diagnostic_write_failure_escapes() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(ScriptedEngine(vec![line("окно")]));
    let path = fixture.screenshot("window.png");
    std::fs::remove_dir_all(&fixture.scratch).unwrap();

    assert!(matches!(
        pipeline.process(&path),
        Err(PipelineError::DiagnosticWriteError(_))
    ));
}

#[test]
fn test_subjects_and_names_come_from_the_model() {
    let fixture = Fixture::new();
    let pipeline =
        fixture.pipeline_with_model(ScriptedEngine(vec![line("Мария пишет")]), ParsedModel);
    let path = fixture.screenshot("chat.png");

    let result = annotated(&pipeline, &path);
    assert_eq!(result.entities.subjects, vec!["Мария"]);
    assert_eq!(result.entities.names, vec!["Мария"]);
    assert_eq!(
        result.annotated_text,
        "Мария пишет\nМорфологический анализ: Объекты: ; Субъекты: Мария; Имена: Мария; Даты: ."
    );
}

#[test]
fn test_rule_model_buckets_dates_and_organizations() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(ScriptedEngine(vec![
        line("Счёт от ООО \"Ромашка\""),
        line("оплатить до 12 мая 2024 года"),
    ]));
    let path = fixture.screenshot("invoice.png");

    let result = annotated(&pipeline, &path);
    assert_eq!(result.entities.subjects, vec!["ООО \"Ромашка\""]);
    assert_eq!(result.entities.dates, vec!["12 мая 2024 года"]);
}
