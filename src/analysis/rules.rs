//! Dictionary-free linguistic model.
//!
//! Tokens come from Unicode word boundaries. Parts of speech come from
//! character classes, capitalization, closed-class lists and inflection
//! endings. Each clause gets a shallow dependency parse around its first verb:
//! ungoverned nominals before a finite verb are subjects, those after it are
//! objects, nominals after a preposition are obliques. Entities are matched
//! with patterns for dates, legal-form organizations, surname-shaped person
//! names and address-marked locations.

use super::morphology::{self, VerbForm, NOMINATIVE_PRONOUNS};
use super::{Document, EntityKind, LinguisticModel, Relation, Span, Token, Upos};
use crate::error::PipelineError;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

const MONTHS: &str = "января|февраля|марта|апреля|мая|июня|июля|августа|сентября|октября|ноября|декабря|\
январь|февраль|март|апрель|май|июнь|июль|август|сентябрь|октябрь|ноябрь|декабрь|\
january|february|march|april|may|june|july|august|september|october|november|december";

// Matched in priority order; later patterns never overlap earlier matches.
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\b\d{1,2}[./]\d{1,2}[./]\d{2,4}\b").unwrap(),
        Regex::new(r"\b(?:0?[1-9]|[12]\d|3[01]) (?:0?[1-9]|1[0-2]) (?:19|20)\d{2}\b").unwrap(),
        Regex::new(&format!(
            r"(?i)\b\d{{1,2}}\s+(?:{MONTHS})\b(?:\s+\d{{4}})?(?:\s+(?:года|г)\b)?"
        ))
        .unwrap(),
        Regex::new(&format!(r"(?i)\b(?:{MONTHS})\s+\d{{1,2}}(?:,?\s+\d{{4}})?\b")).unwrap(),
        Regex::new(&format!(r"(?i)\b(?:{MONTHS})\s+\d{{4}}\b")).unwrap(),
    ]
});

static ORGANIZATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\b(?:ООО|ОАО|ЗАО|ПАО|АО|НКО|ИП)\s+(?:"[^"]+"|[А-ЯЁA-Z][\w-]*(?:\s+[А-ЯЁA-Z][\w-]*)?)|\b[A-Z][\w&]*(?:\s+[A-Z][\w&]*)*\s+(?:LLC|Inc|Ltd|Corp|GmbH)\b"#,
    )
    .unwrap()
});

static PERSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[А-ЯЁ][а-яё]+(?:\s+[А-ЯЁ][а-яё]+){1,2}\b").unwrap());

static SURNAME_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:ов|ев|ёв|ин|ын|ова|ева|ёва|ина|ына|ский|ская|цкий|цкая|вич|вна|чна)$")
        .unwrap()
});

static LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:г|город|ул|улица|пр|проспект|пер|переулок|обл|область|пос|посёлок|село)\s+([А-ЯЁ][а-яё-]+(?:\s+[А-ЯЁ][а-яё-]+)?)",
    )
    .unwrap()
});

const SYMBOLS: &[char] = &[
    '@', '%', '+', '&', '$', '#', '/', '=', '<', '>', '^', '|', '~', '*', '№', '©', '®', '€', '₽',
];

#[derive(Debug, Default)]
pub struct RuleModel;

impl RuleModel {
    pub fn new() -> Self {
        Self
    }

    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut sentence_start = true;

        for (start, segment) in text.split_word_bound_indices() {
            if segment.trim().is_empty() {
                continue;
            }
            let pos = tag(segment, sentence_start);
            sentence_start = matches!(segment, "." | "!" | "?" | "…");
            tokens.push(Token {
                text: segment.to_string(),
                start,
                end: start + segment.len(),
                pos,
                rel: None,
                lemma: None,
            });
        }

        tokens
    }

    fn entities(&self, text: &str) -> Vec<Span> {
        let mut spans: Vec<Span> = Vec::new();

        let mut accept = |kind: EntityKind, start: usize, end: usize| {
            if spans.iter().any(|s| start < s.end && s.start < end) {
                return;
            }
            spans.push(Span {
                kind,
                text: text[start..end].to_string(),
                start,
                end,
                normal: None,
            });
        };

        for pattern in DATE_PATTERNS.iter() {
            for m in pattern.find_iter(text) {
                accept(EntityKind::Date, m.start(), m.end());
            }
        }
        for m in ORGANIZATION.find_iter(text) {
            accept(EntityKind::Organization, m.start(), m.end());
        }
        for m in PERSON.find_iter(text) {
            if m.as_str()
                .split_whitespace()
                .any(|w| SURNAME_SUFFIX.is_match(w))
            {
                accept(EntityKind::Person, m.start(), m.end());
            }
        }
        for caps in LOCATION.captures_iter(text) {
            if let Some(name) = caps.get(1) {
                accept(EntityKind::Location, name.start(), name.end());
            }
        }

        spans.sort_by_key(|s| s.start);
        spans
    }
}

fn tag(segment: &str, sentence_start: bool) -> Upos {
    if segment.chars().all(|c| SYMBOLS.contains(&c)) {
        return Upos::Sym;
    }
    if !segment.chars().any(char::is_alphanumeric) {
        return Upos::Punct;
    }
    if !segment.chars().any(char::is_alphabetic) {
        return Upos::Num;
    }
    if segment.chars().any(char::is_numeric) {
        return Upos::X;
    }

    let lower = segment.to_lowercase();
    if let Some(pos) = morphology::closed_class(&lower) {
        return pos;
    }
    let capitalized = segment.chars().next().is_some_and(char::is_uppercase);
    if capitalized && !sentence_start {
        return Upos::Propn;
    }
    morphology::open_class(&lower)
}

fn is_clause_break(token: &Token) -> bool {
    matches!(token.text.as_str(), "." | "!" | "?" | "…" | ";")
}

/// Attach relations within one clause, headed by its first verb
fn parse_clause(clause: &mut [Token]) {
    let head = clause
        .iter()
        .position(|t| matches!(t.pos, Upos::Verb | Upos::Aux));
    let head_finite = head.is_some_and(|h| {
        clause[h].pos == Upos::Aux
            || morphology::verb_form(&clause[h].text.to_lowercase()) == Some(VerbForm::Finite)
    });

    // `governed`: a preposition is waiting for its nominal.
    // `after_nominal`: the previous content word was a noun, so a bare noun here modifies it.
    let mut governed = false;
    let mut after_nominal = false;
    let mut has_root = head.is_some();
    let mut subject_candidates = Vec::new();

    for i in 0..clause.len() {
        let label = match clause[i].pos {
            Upos::Adp => {
                governed = true;
                after_nominal = false;
                "case"
            }
            Upos::Adj => "amod",
            Upos::Det => "det",
            Upos::Num => "nummod",
            Upos::Noun | Upos::Propn | Upos::Pron => {
                let label = if governed {
                    if head.is_some() {
                        "obl"
                    } else {
                        "nmod"
                    }
                } else if after_nominal {
                    "nmod"
                } else {
                    match head {
                        Some(h) if i < h => {
                            subject_candidates.push(i);
                            "dep"
                        }
                        Some(_) => "obj",
                        None if !has_root => {
                            has_root = true;
                            "root"
                        }
                        None => "dep",
                    }
                };
                governed = false;
                after_nominal = clause[i].pos != Upos::Pron;
                label
            }
            Upos::Verb | Upos::Aux => {
                governed = false;
                after_nominal = false;
                if Some(i) == head {
                    "root"
                } else {
                    "conj"
                }
            }
            Upos::Punct | Upos::Sym => {
                after_nominal = false;
                if clause[i].text == "," {
                    governed = false;
                }
                "punct"
            }
            Upos::Cconj => {
                after_nominal = false;
                "cc"
            }
            Upos::Sconj => {
                after_nominal = false;
                "mark"
            }
            Upos::Adv | Upos::Part => {
                after_nominal = false;
                "advmod"
            }
            _ => {
                after_nominal = false;
                "dep"
            }
        };
        clause[i].rel = Some(Relation::from_label(label));
    }

    // Non-finite heads (infinitives, imperatives) only take pronoun subjects.
    let eligible: Vec<usize> = subject_candidates
        .into_iter()
        .filter(|&i| {
            if clause[i].pos == Upos::Pron {
                morphology::is_listed(NOMINATIVE_PRONOUNS, &clause[i].text.to_lowercase())
            } else {
                head_finite
            }
        })
        .collect();

    // The nominal closest to the verb, plus anything coordinated with it.
    if let Some(&last) = eligible.last() {
        clause[last].rel = Some(Relation::NominalSubject);
        let mut current = last;
        for &earlier in eligible.iter().rev().skip(1) {
            let coordinated = clause[earlier + 1..current]
                .iter()
                .any(|t| t.pos == Upos::Cconj);
            if !coordinated {
                break;
            }
            clause[earlier].rel = Some(Relation::NominalSubject);
            current = earlier;
        }
    }
}

impl LinguisticModel for RuleModel {
    fn name(&self) -> &'static str {
        "rules"
    }

    fn annotate(&self, text: &str) -> Result<Document, PipelineError> {
        let mut tokens = self.tokenize(text);
        for clause in tokens.split_inclusive_mut(is_clause_break) {
            parse_clause(clause);
        }
        Ok(Document {
            tokens,
            spans: self.entities(text),
        })
    }
}
