//! Linguistic analysis: segmentation, tagging, parsing and named entities.
//!
//! A [`LinguisticModel`] turns text into a [`Document`]. The [`Analyzer`]
//! lemmatizes tokens and normalizes spans against the vocabulary, derives the
//! punctuation-free normalized text, and fills the [`EntityBuckets`]. Model
//! failures never escape: the analyzer falls back to the input text.

mod buckets;
mod morphology;
pub mod rules;

pub use buckets::{EntityBuckets, SUMMARY_HEADING};
pub use rules::RuleModel;

use crate::error::PipelineError;
use crate::spelling::Script;
use crate::vocabulary::Vocabulary;
use rust_stemmers::{Algorithm, Stemmer};
use serde::Serialize;
use std::sync::Arc;

/// Universal Dependencies part-of-speech tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Upos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

impl Upos {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "ADJ" => Self::Adj,
            "ADP" => Self::Adp,
            "ADV" => Self::Adv,
            "AUX" => Self::Aux,
            "CCONJ" => Self::Cconj,
            "DET" => Self::Det,
            "INTJ" => Self::Intj,
            "NOUN" => Self::Noun,
            "NUM" => Self::Num,
            "PART" => Self::Part,
            "PRON" => Self::Pron,
            "PROPN" => Self::Propn,
            "PUNCT" => Self::Punct,
            "SCONJ" => Self::Sconj,
            "SYM" | "SYMB" => Self::Sym,
            "VERB" => Self::Verb,
            _ => Self::X,
        }
    }

    /// Tags excluded from the normalized text
    pub fn is_punctuation(&self) -> bool {
        matches!(self, Self::Punct | Self::Sym)
    }
}

/// Dependency relation of a token to its head
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Relation {
    /// `nsubj`
    NominalSubject,
    /// `obj`
    DirectObject,
    /// `obl`
    Oblique,
    Other(String),
}

impl Relation {
    pub fn from_label(label: &str) -> Self {
        match label {
            "nsubj" => Self::NominalSubject,
            "obj" => Self::DirectObject,
            "obl" => Self::Oblique,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    Person,
    Location,
    Organization,
    Date,
}

impl EntityKind {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "PER" => Some(Self::Person),
            "LOC" => Some(Self::Location),
            "ORG" => Some(Self::Organization),
            "DATE" => Some(Self::Date),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub text: String,
    /// Byte offsets into the analyzed text
    pub start: usize,
    pub end: usize,
    pub pos: Upos,
    pub rel: Option<Relation>,
    pub lemma: Option<String>,
}

/// A named-entity span
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Span {
    pub kind: EntityKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub normal: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub tokens: Vec<Token>,
    pub spans: Vec<Span>,
}

/// Segmentation, morphology, syntax and NER in one call
pub trait LinguisticModel: Send + Sync {
    fn name(&self) -> &'static str;

    fn annotate(&self, text: &str) -> Result<Document, PipelineError>;
}

/// Output of the analysis stage
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Token surface forms without punctuation, space-joined
    pub normalized: String,
    pub buckets: EntityBuckets,
    /// Annotated document, including lemmas
    pub document: Document,
    /// Set when the model failed and `normalized` is the unchanged input
    pub degraded: bool,
}

impl Analysis {
    fn degraded(text: &str) -> Self {
        Self {
            normalized: text.to_string(),
            degraded: true,
            ..Self::default()
        }
    }

    /// Normalized text followed by the entity summary
    pub fn annotated_text(&self) -> String {
        format!("{}{}", self.normalized, self.buckets.summary())
    }
}

pub struct Analyzer {
    model: Arc<dyn LinguisticModel>,
    vocabulary: Arc<Vocabulary>,
    primary_stemmer: Stemmer,
    secondary_stemmer: Stemmer,
}

impl Analyzer {
    pub fn new(model: Arc<dyn LinguisticModel>, vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            model,
            vocabulary,
            primary_stemmer: Stemmer::create(Algorithm::Russian),
            secondary_stemmer: Stemmer::create(Algorithm::English),
        }
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    pub fn analyze(&self, text: &str) -> Analysis {
        match self.try_analyze(text) {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!(
                    model = self.model.name(),
                    code = e.kind(),
                    "Text analysis failed, keeping input text: {}",
                    e
                );
                Analysis::degraded(text)
            }
        }
    }

    fn try_analyze(&self, text: &str) -> Result<Analysis, PipelineError> {
        if text.trim().is_empty() {
            return Ok(Analysis::default());
        }

        let mut document = self.model.annotate(text)?;

        for token in &mut document.tokens {
            if token.lemma.is_none() && !token.pos.is_punctuation() {
                token.lemma = Some(self.lemmatize(&token.text));
            }
        }
        for span in &mut document.spans {
            span.normal = Some(self.normalize_span(&span.text));
        }

        let normalized = document
            .tokens
            .iter()
            .filter(|t| !t.pos.is_punctuation())
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let buckets = EntityBuckets::from_document(&document);

        tracing::debug!(
            tokens = document.tokens.len(),
            spans = document.spans.len(),
            "Analyzed text"
        );

        Ok(Analysis {
            normalized,
            buckets,
            document,
            degraded: false,
        })
    }

    /// Vocabulary form when known, Snowball stem otherwise
    fn lemmatize(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        if self.vocabulary.contains(&lower) {
            return lower;
        }
        let stemmer = match Script::of(&lower) {
            Script::Primary => &self.primary_stemmer,
            Script::Secondary => &self.secondary_stemmer,
        };
        stemmer.stem(&lower).into_owned()
    }

    /// Normal form of every word in a span; quotes and brackets are dropped
    fn normalize_span(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|word| !word.is_empty())
            .map(|word| self.lemmatize(word))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Model returning a fixed document
    pub struct FixedModel(pub Document);

    impl LinguisticModel for FixedModel {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn annotate(&self, _text: &str) -> Result<Document, PipelineError> {
            Ok(self.0.clone())
        }
    }

    pub struct FailingModel;

    impl LinguisticModel for FailingModel {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn annotate(&self, _text: &str) -> Result<Document, PipelineError> {
            Err(PipelineError::AnalysisError("model crashed".into()))
        }
    }

    fn token(text: &str, pos: Upos, rel: Option<&str>) -> Token {
        Token {
            text: text.to_string(),
            start: 0,
            end: text.len(),
            pos,
            rel: rel.map(Relation::from_label),
            lemma: None,
        }
    }

    fn sample_document() -> Document {
        Document {
            tokens: vec![
                token("Анна", Upos::Propn, Some("nsubj")),
                token("отправила", Upos::Verb, Some("root")),
                token("документы", Upos::Noun, Some("obj")),
                token(",", Upos::Punct, Some("punct")),
                token("%", Upos::Sym, None),
                token("Bitrix", Upos::Propn, Some("obl")),
            ],
            spans: vec![Span {
                kind: EntityKind::Person,
                text: "Анна".to_string(),
                start: 0,
                end: "Анна".len(),
                normal: None,
            }],
        }
    }

    fn analyzer(model: impl LinguisticModel + 'static) -> Analyzer {
        Analyzer::new(
            Arc::new(model),
            Arc::new(Vocabulary::from_lines("отправила\n")),
        )
    }

    #[test]
    fn test_normalized_text_drops_punctuation_and_symbols() {
        let analysis = analyzer(FixedModel(sample_document())).analyze("ignored");
        assert_eq!(analysis.normalized, "Анна отправила документы Bitrix");
        assert!(!analysis.degraded);
    }

    #[test]
    fn test_subjects_and_person_spans_are_bucketed() {
        let analysis = analyzer(FixedModel(sample_document())).analyze("ignored");
        assert_eq!(analysis.buckets.names, vec!["Анна"]);
        assert_eq!(analysis.buckets.subjects, vec!["Анна"]);
        assert_eq!(analysis.buckets.objects, vec!["документы", "Bitrix"]);
    }

    #[test]
    fn test_lemmas_are_computed_but_buckets_use_surface_text() {
        let analysis = analyzer(FixedModel(sample_document())).analyze("ignored");
        let lemmas: Vec<_> = analysis
            .document
            .tokens
            .iter()
            .map(|t| t.lemma.clone())
            .collect();
        assert_eq!(lemmas[1].as_deref(), Some("отправила"));
        assert_eq!(lemmas[2].as_deref(), Some("документ"));
        assert_eq!(lemmas[3], None);
        assert_eq!(analysis.buckets.objects[0], "документы");
    }

    #[test]
    fn test_span_normal_forms_use_vocabulary_then_stems() {
        let doc = Document {
            tokens: vec![],
            spans: vec![Span {
                kind: EntityKind::Organization,
                text: "«Ромашка» Systems".to_string(),
                start: 0,
                end: 0,
                normal: None,
            }],
        };
        let analyzer = Analyzer::new(
            Arc::new(FixedModel(doc)),
            Arc::new(Vocabulary::from_lines("ромашка\n")),
        );
        let analysis = analyzer.analyze("ignored");
        let span = &analysis.document.spans[0];
        assert_eq!(span.normal.as_deref(), Some("ромашка system"));
        assert_eq!(analysis.buckets.subjects, vec!["«Ромашка» Systems"]);
    }

    #[test]
    fn test_model_failure_degrades_to_input() {
        let analysis = analyzer(FailingModel).analyze("исходный текст");
        assert!(analysis.degraded);
        assert_eq!(analysis.normalized, "исходный текст");
        assert!(analysis.buckets.is_empty());
    }

    #[test]
    fn test_empty_text_skips_model() {
        let analysis = analyzer(FailingModel).analyze("");
        assert!(!analysis.degraded);
        assert_eq!(analysis.normalized, "");
        assert!(analysis.buckets.is_empty());
    }

    #[test]
    fn test_tag_and_label_parsing() {
        assert_eq!(Upos::from_tag("SYMB"), Upos::Sym);
        assert_eq!(Upos::from_tag("unknown"), Upos::X);
        assert_eq!(Relation::from_label("nsubj:pass"), Relation::Other("nsubj:pass".into()));
        assert_eq!(EntityKind::from_label("ORG"), Some(EntityKind::Organization));
        assert_eq!(EntityKind::from_label("MISC"), None);
    }
}
