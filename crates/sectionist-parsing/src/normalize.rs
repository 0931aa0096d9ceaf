//! Removal of rendering artifacts from extracted text.
//!
//! Page-break residue (pagination markers, print timestamps) is stripped
//! first, then whitespace is collapsed, so blank lines left behind by the
//! removed tokens are collapsed too.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParsingConfig;

static PAGE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Page \d+ of \d+").unwrap());

// Left behind where page breaks used to be.
static TIMESTAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{2}/\d{2}/\d{4} \d{2}:\d{2}\b").unwrap());

static SPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());
static BLANK_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Built-in artifact patterns, applied in this order.
pub(crate) static DEFAULT_ARTIFACT_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| vec![PAGE_NUMBER_RE.clone(), TIMESTAMP_RE.clone()]);

/// Strip pagination markers, timestamps and redundant whitespace.
///
/// Total and idempotent: `clean(&clean(s)) == clean(s)`.
pub fn clean(text: &str) -> String {
    clean_with_config(text, &ParsingConfig::default())
}

/// Config-aware version of [`clean`].
///
/// A single pass can produce a fresh artifact (collapsing `"Page 1  of 2"`
/// yields a page marker), so passes repeat until the text is stable. Every
/// pass that changes the text shortens it, which bounds the loop.
pub fn clean_with_config(text: &str, config: &ParsingConfig) -> String {
    let patterns = config.artifact_patterns.resolve(&DEFAULT_ARTIFACT_PATTERNS);
    let mut current = clean_once(text, &patterns);
    loop {
        let next = clean_once(&current, &patterns);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(text: &str, patterns: &[Regex]) -> String {
    let mut text = text.to_string();
    for re in patterns {
        text = remove_regex(&text, re);
    }
    remove_extra_whitespace(&text)
}

/// Remove `Page N of M` markers.
pub fn remove_page_numbers(text: &str) -> String {
    remove_regex(text, &PAGE_NUMBER_RE)
}

/// Remove `dd/dd/dddd dd:dd` timestamps.
pub fn remove_timestamps(text: &str) -> String {
    remove_regex(text, &TIMESTAMP_RE)
}

/// Collapse space runs to one space, then drop blank lines.
pub fn remove_extra_whitespace(text: &str) -> String {
    let text = SPACE_RUN_RE.replace_all(text, " ");
    BLANK_LINE_RE.replace_all(&text, "\n").into_owned()
}

fn remove_regex(text: &str, re: &Regex) -> String {
    re.replace_all(text, "").into_owned()
}

/// Everything before the first occurrence of `marker`, or all of `text`
/// when the marker is absent.
pub fn truncate_at<'a>(text: &'a str, marker: &str) -> &'a str {
    match text.find(marker) {
        Some(pos) => &text[..pos],
        None => text,
    }
}
