use super::{Document, EntityKind, Relation};
use serde::Serialize;

pub const SUMMARY_HEADING: &str = "Морфологический анализ: ";

/// Role-based entity collections, in discovery order, duplicates kept
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityBuckets {
    pub names: Vec<String>,
    pub subjects: Vec<String>,
    pub objects: Vec<String>,
    pub dates: Vec<String>,
}

impl EntityBuckets {
    /// Fill buckets from named-entity spans, then from token relations
    pub fn from_document(doc: &Document) -> Self {
        let mut buckets = Self::default();

        for span in &doc.spans {
            let bucket = match span.kind {
                EntityKind::Person => &mut buckets.names,
                EntityKind::Location => &mut buckets.objects,
                EntityKind::Organization => &mut buckets.subjects,
                EntityKind::Date => &mut buckets.dates,
            };
            bucket.push(span.text.clone());
        }

        for token in &doc.tokens {
            match token.rel {
                Some(Relation::NominalSubject) => buckets.subjects.push(token.text.clone()),
                Some(Relation::DirectObject) | Some(Relation::Oblique) => {
                    buckets.objects.push(token.text.clone())
                }
                _ => {}
            }
        }

        buckets
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
            && self.subjects.is_empty()
            && self.objects.is_empty()
            && self.dates.is_empty()
    }

    /// `Объекты: …; Субъекты: …; Имена: …; Даты: ….`
    pub fn render(&self) -> String {
        format!(
            "Объекты: {}; Субъекты: {}; Имена: {}; Даты: {}.",
            self.objects.join(", "),
            self.subjects.join(", "),
            self.names.join(", "),
            self.dates.join(", "),
        )
    }

    /// Trailing summary appended to the analyzed text
    pub fn summary(&self) -> String {
        format!("\n{}{}", SUMMARY_HEADING, self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Span, Token, Upos};

    fn token(text: &str, rel: Option<Relation>) -> Token {
        Token {
            text: text.to_string(),
            start: 0,
            end: text.len(),
            pos: Upos::Noun,
            rel,
            lemma: None,
        }
    }

    fn span(kind: EntityKind, text: &str) -> Span {
        Span {
            kind,
            text: text.to_string(),
            start: 0,
            end: text.len(),
            normal: None,
        }
    }

    #[test]
    fn test_spans_fill_their_buckets() {
        let doc = Document {
            tokens: vec![],
            spans: vec![
                span(EntityKind::Person, "Иван Петров"),
                span(EntityKind::Location, "Москва"),
                span(EntityKind::Organization, "Яндекс"),
                span(EntityKind::Date, "12 мая"),
            ],
        };
        let buckets = EntityBuckets::from_document(&doc);
        assert_eq!(buckets.names, vec!["Иван Петров"]);
        assert_eq!(buckets.objects, vec!["Москва"]);
        assert_eq!(buckets.subjects, vec!["Яндекс"]);
        assert_eq!(buckets.dates, vec!["12 мая"]);
    }

    #[test]
    fn test_spans_come_before_relations_and_duplicates_stay() {
        let doc = Document {
            tokens: vec![
                token("менеджер", Some(Relation::NominalSubject)),
                token("отчёт", Some(Relation::DirectObject)),
                token("почте", Some(Relation::Oblique)),
                token("отправил", Some(Relation::Other("root".into()))),
                token("отчёт", Some(Relation::DirectObject)),
            ],
            spans: vec![span(EntityKind::Location, "Казань")],
        };
        let buckets = EntityBuckets::from_document(&doc);
        assert_eq!(buckets.subjects, vec!["менеджер"]);
        assert_eq!(buckets.objects, vec!["Казань", "отчёт", "почте", "отчёт"]);
    }

    #[test]
    fn test_render_format() {
        let buckets = EntityBuckets {
            names: vec!["Анна".into()],
            subjects: vec!["она".into(), "ООО \"Ромашка\"".into()],
            objects: vec![],
            dates: vec!["1 мая".into()],
        };
        assert_eq!(
            buckets.render(),
            "Объекты: ; Субъекты: она, ООО \"Ромашка\"; Имена: Анна; Даты: 1 мая."
        );
    }

    #[test]
    fn test_empty_summary() {
        let buckets = EntityBuckets::default();
        assert!(buckets.is_empty());
        assert_eq!(
            buckets.summary(),
            "\nМорфологический анализ: Объекты: ; Субъекты: ; Имена: ; Даты: ."
        );
    }
}
