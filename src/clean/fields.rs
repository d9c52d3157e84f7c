// src/clean/fields.rs

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// "day + month word", e.g. the `11 Dec` in `9–11 Dec`. Month words longer
/// than three letters are accepted and cut down to their abbreviation.
static DAY_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})\s+([A-Za-z]{3})[A-Za-z]*\b").unwrap());

const NUMERIC_NOISE: &[char] = &[',', '%', '–', '−'];

/// Coerce a share/size cell to a number: thousands separators, percent
/// signs and dash placeholders (en-dash, minus sign, optionally `?`) are
/// removed before parsing. Anything unparsable is `None`.
pub fn parse_numeric(raw: &str, strip_question_marks: bool) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !NUMERIC_NOISE.contains(c) && !(strip_question_marks && *c == '?'))
        .collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Sample size: numeric coercion rounded to the nearest integer.
pub fn parse_sample_size(raw: &str, strip_question_marks: bool) -> Option<u64> {
    parse_numeric(raw, strip_question_marks)
        .map(f64::round)
        .filter(|v| *v >= 0.0)
        .map(|v| v as u64)
}

/// Keep the part of a pollster cell before the first marker character,
/// which drops citation links like `Forsa[12]` or `Market (Der Standard)`.
pub fn strip_pollster(raw: &str, markers: &[char]) -> String {
    raw.split(|c| markers.contains(&c))
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Conducted date from free-text fieldwork dates: the last `day month`
/// token in `fieldwork`, in the given `year`.
pub fn conducted_date(fieldwork: &str, year: i32) -> Option<NaiveDate> {
    let caps = DAY_MONTH_RE.captures_iter(fieldwork).last()?;
    let day = &caps[1];
    let month = &caps[2];
    NaiveDate::parse_from_str(&format!("{day} {month} {year}"), "%d %b %Y").ok()
}
