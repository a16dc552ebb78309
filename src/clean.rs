//! Repair of common OCR noise in recognized screenshot text.
//!
//! `clean` applies a fixed, ordered list of rewrite rules. The rule pass is
//! repeated until the text stops changing, so `clean(clean(x)) == clean(x)`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// A word broken across a line with a hyphen: "сеть- ю" -> "сетью".
static HYPHEN_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w)-\s*(\w)").unwrap());

// Everything outside the allow-list of both scripts, digits and punctuation.
static DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[^A-Za-zА-Яа-яЁё0-9\s\-–—"'.,!?;:@/()&%+]"#).unwrap()
});

// Three or more periods, optionally space-separated.
static ELLIPSIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(?:\s*\.){2,}").unwrap());

static BULLETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[•·∙●◦▪‣]").unwrap());

static PERIOD_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*(\.+)\s*").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// Misrecognitions seen often enough to hard-code, matched as whole words.
static MISTAKES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\bсгг\b", "сеть"),
        (r"(?i)\b[З3]адание\b", "задание"),
        (r"(?i)\bв0\b", "во"),
    ]
    .into_iter()
    .map(|(pattern, fix)| (Regex::new(pattern).unwrap(), fix))
    .collect()
});

const ELLIPSIS_TOKEN: &str = "...";

const MAX_PASSES: usize = 16;

/// Clean OCR output. Pure and total.
pub fn clean(text: &str) -> String {
    let mut current = clean_pass(text);
    for _ in 1..MAX_PASSES {
        let next = clean_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn clean_pass(text: &str) -> String {
    let text = HYPHEN_BREAK.replace_all(text, "${1}${2}");
    let text = DISALLOWED.replace_all(&text, "");
    let text = ELLIPSIS.replace_all(&text, " ... ");
    // Never matches: DISALLOWED already strips every bullet.
    let text = BULLETS.replace_all(&text, "");
    let text = PERIOD_RUN.replace_all(&text, |caps: &Captures| {
        if &caps[1] == ELLIPSIS_TOKEN {
            caps[0].to_string()
        } else {
            " ".to_string()
        }
    });
    let text = WHITESPACE.replace_all(&text, " ");

    let mut text = text.trim().to_string();
    for (pattern, fix) in MISTAKES.iter() {
        text = pattern.replace_all(&text, *fix).into_owned();
    }
    text
}
