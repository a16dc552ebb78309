//! Lexicon-free part-of-speech guessing.
//!
//! Closed-class words come from fixed lists. Open-class words are classified
//! by Russian inflection endings, checked verb first, then adjective, with
//! noun as the fallback. Latin words get a handful of English suffix rules.

use super::Upos;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbForm {
    Finite,
    Infinitive,
    Imperative,
}

const ADPOSITIONS: &[&str] = &[
    "в", "во", "на", "по", "с", "со", "к", "ко", "от", "до", "из", "за", "под", "над", "о",
    "об", "обо", "при", "про", "для", "без", "через", "у", "между", "перед", "после", "около",
    "in", "on", "at", "to", "from", "by", "with", "for", "of", "about", "into",
];

const PRONOUNS: &[&str] = &[
    "я", "ты", "он", "она", "оно", "мы", "вы", "они", "меня", "тебя", "его", "её", "ее", "нас",
    "вас", "их", "мне", "тебе", "ему", "ей", "нам", "вам", "им", "ним", "нему", "ней", "кто",
    "что", "это", "себя", "себе", "i", "you", "he", "she", "it", "we", "they", "me", "him",
    "her", "us", "them",
];

/// Pronouns that can head a subject
pub const NOMINATIVE_PRONOUNS: &[&str] = &[
    "я", "ты", "он", "она", "оно", "мы", "вы", "они", "кто", "i", "you", "he", "she", "it",
    "we", "they",
];

const COORDINATORS: &[&str] = &["и", "а", "но", "или", "либо", "and", "or", "but"];

const SUBORDINATORS: &[&str] = &[
    "если", "когда", "чтобы", "потому", "хотя", "пока", "because", "if", "when", "while",
    "although",
];

const PARTICLES: &[&str] = &[
    "не", "ни", "бы", "ли", "же", "ведь", "вот", "нет", "да", "пожалуйста", "not",
];

const AUXILIARIES: &[&str] = &[
    "быть", "был", "была", "было", "были", "буду", "будет", "будем", "будут", "есть", "is",
    "are", "was", "were", "be", "been", "am", "will",
];

const DETERMINERS: &[&str] = &[
    "этот", "эта", "эти", "этого", "этой", "этом", "эту", "тот", "та", "те", "того", "той",
    "весь", "вся", "всё", "все", "всех", "мой", "моя", "моё", "мои", "наш", "наша", "наше",
    "наши", "ваш", "ваша", "ваше", "ваши", "свой", "своя", "своё", "свои", "каждый", "каждая",
    "the", "a", "an", "this", "these", "those", "my", "your", "our", "their", "its",
];

const ADVERBS: &[&str] = &[
    "очень", "уже", "ещё", "еще", "сейчас", "здесь", "там", "тоже", "также", "сегодня",
    "завтра", "вчера", "всегда", "никогда", "потом", "теперь", "снова", "только", "можно",
    "нужно", "нельзя", "поэтому", "now", "here", "there", "very", "also", "today", "only",
];

// Nouns whose endings look verbal; inflected forms are covered too.
const NOUN_EXCEPTIONS: &[&str] = &[
    "сеть", "путь", "часть", "власть", "суть", "смерть", "раздел", "отдел", "предел", "канал",
    "сигнал", "журнал", "портал", "материал", "терминал", "интервал", "финал", "оригинал",
    "персонал", "капитал", "вокзал", "запись", "подпись", "надпись", "кредит", "лимит",
    "визит", "депозит", "маршрут", "институт", "атрибут", "минут", "бюджет", "сюжет", "дело",
    "тело", "село", "сила", "начало", "модели", "недели", "цели", "детали",
];

const NOUN_SUFFIXES: &[&str] = &["ость", "ние", "тие"];

const VERB_ENDINGS: &[(&str, VerbForm)] = &[
    ("ться", VerbForm::Infinitive),
    ("ть", VerbForm::Infinitive),
    ("ьте", VerbForm::Imperative),
    ("йте", VerbForm::Imperative),
    ("ите", VerbForm::Imperative),
    ("ется", VerbForm::Finite),
    ("ится", VerbForm::Finite),
    ("ются", VerbForm::Finite),
    ("ятся", VerbForm::Finite),
    ("лся", VerbForm::Finite),
    ("лась", VerbForm::Finite),
    ("лось", VerbForm::Finite),
    ("лись", VerbForm::Finite),
    ("ает", VerbForm::Finite),
    ("яет", VerbForm::Finite),
    ("еет", VerbForm::Finite),
    ("ует", VerbForm::Finite),
    ("аёт", VerbForm::Finite),
    ("оёт", VerbForm::Finite),
    ("жет", VerbForm::Finite),
    ("шет", VerbForm::Finite),
    ("ит", VerbForm::Finite),
    ("ают", VerbForm::Finite),
    ("яют", VerbForm::Finite),
    ("уют", VerbForm::Finite),
    ("еют", VerbForm::Finite),
    ("ят", VerbForm::Finite),
    ("ут", VerbForm::Finite),
    ("ешь", VerbForm::Finite),
    ("ишь", VerbForm::Finite),
    ("аем", VerbForm::Finite),
    ("яем", VerbForm::Finite),
    ("уем", VerbForm::Finite),
    ("аете", VerbForm::Finite),
    ("яете", VerbForm::Finite),
    ("уете", VerbForm::Finite),
    ("ала", VerbForm::Finite),
    ("яла", VerbForm::Finite),
    ("ила", VerbForm::Finite),
    ("ела", VerbForm::Finite),
    ("ыла", VerbForm::Finite),
    ("ула", VerbForm::Finite),
    ("ало", VerbForm::Finite),
    ("яло", VerbForm::Finite),
    ("ило", VerbForm::Finite),
    ("ело", VerbForm::Finite),
    ("ыло", VerbForm::Finite),
    ("уло", VerbForm::Finite),
    ("али", VerbForm::Finite),
    ("яли", VerbForm::Finite),
    ("или", VerbForm::Finite),
    ("ели", VerbForm::Finite),
    ("ыли", VerbForm::Finite),
    ("ули", VerbForm::Finite),
    ("ал", VerbForm::Finite),
    ("ял", VerbForm::Finite),
    ("ил", VerbForm::Finite),
    ("ел", VerbForm::Finite),
    ("ыл", VerbForm::Finite),
    ("ул", VerbForm::Finite),
];

const ADJECTIVE_ENDINGS: &[&str] = &[
    "ого", "его", "ому", "ему", "ыми", "ими", "ый", "ий", "ой", "ая", "яя", "ое", "ее", "ые",
    "ие", "ым", "ых", "их", "ую", "юю",
];

/// Shorter words are too ambiguous to classify by ending
const MIN_INFLECTED_LEN: usize = 4;

pub fn is_listed(words: &[&str], lower: &str) -> bool {
    words.iter().any(|w| *w == lower)
}

/// An exception noun plus at most a three-letter case ending
fn is_noun_exception(lower: &str) -> bool {
    let inflected = NOUN_EXCEPTIONS.iter().any(|noun| {
        lower.strip_prefix(noun).is_some_and(|rest| {
            rest.chars().count() <= 3 && !rest.ends_with("ся") && !rest.ends_with("сь")
        })
    });
    inflected || NOUN_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

/// Tag for a closed-class word, if `lower` is one
pub fn closed_class(lower: &str) -> Option<Upos> {
    let lists: [(&[&str], Upos); 8] = [
        (ADPOSITIONS, Upos::Adp),
        (PRONOUNS, Upos::Pron),
        (COORDINATORS, Upos::Cconj),
        (SUBORDINATORS, Upos::Sconj),
        (PARTICLES, Upos::Part),
        (AUXILIARIES, Upos::Aux),
        (DETERMINERS, Upos::Det),
        (ADVERBS, Upos::Adv),
    ];
    lists
        .iter()
        .find(|(words, _)| is_listed(words, lower))
        .map(|(_, pos)| *pos)
}

/// Tag for an open-class word from its ending
pub fn open_class(lower: &str) -> Upos {
    if lower.chars().all(|c| c.is_ascii_alphabetic()) {
        return english_open_class(lower);
    }
    if is_noun_exception(lower) {
        return Upos::Noun;
    }
    if lower.chars().count() < MIN_INFLECTED_LEN {
        return Upos::Noun;
    }
    if verb_form(lower).is_some() {
        return Upos::Verb;
    }
    if ADJECTIVE_ENDINGS.iter().any(|e| lower.ends_with(e)) {
        return Upos::Adj;
    }
    Upos::Noun
}

fn english_open_class(lower: &str) -> Upos {
    if lower.len() < 5 {
        return Upos::Noun;
    }
    if lower.ends_with("ed") || lower.ends_with("ing") {
        Upos::Verb
    } else if lower.ends_with("ly") {
        Upos::Adv
    } else {
        Upos::Noun
    }
}

/// Verb form guessed from the ending, `None` when the word does not look verbal
pub fn verb_form(lower: &str) -> Option<VerbForm> {
    if is_listed(AUXILIARIES, lower) {
        return Some(VerbForm::Finite);
    }
    if lower.chars().all(|c| c.is_ascii_alphabetic()) {
        return if lower.ends_with("ed") {
            Some(VerbForm::Finite)
        } else if lower.ends_with("ing") {
            Some(VerbForm::Infinitive)
        } else {
            None
        };
    }
    if is_noun_exception(lower) {
        return None;
    }
    VERB_ENDINGS
        .iter()
        .find(|(ending, _)| lower.ends_with(ending))
        .map(|(_, form)| *form)
}
