// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Biomarker text parser — turns raw OCR output into structured measurement
// records, one line at a time.
//
// The parser is a pure function: no I/O, no state, and identical input
// always yields an identical, order-preserving output list.  Lines are
// matched against a `<name> <number> <remainder>` shape, header/footer
// metadata is suppressed by keyword, a reference range is excised from the
// remainder before the unit text is sanitized, and an acceptance gate
// rejects bare "word number" lines that carry neither a range nor anything
// that looks like a measurement unit.

use labscan_core::BiomarkerRecord;
use once_cell::sync::Lazy;
use regex::Regex;

/// Primary line shape: a name starting with a letter, an optional `:` or `-`
/// separator, a signed decimal number (`.` or `,` separator), and the rest
/// of the line.  The name match is non-greedy so the first number on the
/// line becomes the value.
static VALUE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*([A-Za-z][A-Za-z0-9 .%/µ×^()+'\-]+?)(?:\s*[:\-]\s*)?([+\-]?\d+(?:[.,]\d+)?)(.*)$")
        .expect("value pattern is valid")
});

/// Reference range inside the remainder: two decimal numbers separated by a
/// hyphen or en-dash.
static RANGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([+\-]?\d+(?:[.,]\d+)?)\s*[-–]\s*([+\-]?\d+(?:[.,]\d+)?)")
        .expect("range pattern is valid")
});

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Words that mark a line as report metadata rather than a measurement, even
/// when it happens to look like "label: number".
const METADATA_KEYWORDS: &[&str] = &[
    "patient",
    "bill",
    "collected",
    "report",
    "release",
    "specimen",
    "registration",
    "lab",
    "ref",
    "uhid",
    "doctor",
    "hospital",
    "age",
    "gender",
    "date",
    "method",
    "processing",
    "session",
];

/// Characters (besides letters) that qualify a unit candidate as a real
/// measurement unit.
const MEASUREMENT_SYMBOLS: &str = "%/µxX^";

/// Parse every line of `raw_text` into biomarker records, preserving source
/// line order.  Lines that do not look like measurements are dropped; no
/// deduplication is applied.
pub fn parse_biomarkers(raw_text: &str) -> Vec<BiomarkerRecord> {
    raw_text.lines().filter_map(parse_line).collect()
}

/// Parse a single line, returning `None` when it is not a measurement.
fn parse_line(line: &str) -> Option<BiomarkerRecord> {
    let trimmed = line.trim();
    if trimmed.chars().count() < 3 {
        return None;
    }

    let captures = VALUE_PATTERN.captures(trimmed)?;
    let name = captures.get(1)?.as_str().trim();
    if name.is_empty() {
        return None;
    }

    let lower_name = name.to_lowercase();
    if METADATA_KEYWORDS
        .iter()
        .any(|keyword| lower_name.contains(keyword))
    {
        return None;
    }

    // The original literal is what ends up in the record; normalization is
    // only for the parseability check.
    let value = captures.get(2)?.as_str().trim();
    value.replace(',', ".").parse::<f64>().ok()?;

    let mut remainder = captures
        .get(3)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    let mut reference_min = None;
    let mut reference_max = None;

    // Excise the range before deriving the unit — the unit candidate is
    // whatever text surrounds the matched span.
    if let Some(range) = RANGE_PATTERN.captures(&remainder) {
        reference_min = Some(range.get(1)?.as_str().to_string());
        reference_max = Some(range.get(2)?.as_str().to_string());
        let span = range.get(0)?;
        remainder = format!("{} {}", &remainder[..span.start()], &remainder[span.end()..])
            .trim()
            .to_string();
    }

    let unit = sanitize_unit(&remainder);

    // Acceptance gate: without a range, the unit must be non-empty and
    // contain at least one letter or measurement symbol.  This rejects
    // arbitrary "word number" lines like "Total 42".
    if unit.is_empty() && reference_min.is_none() {
        return None;
    }
    if reference_min.is_none() && !has_measurement_chars(&unit) {
        return None;
    }

    Some(BiomarkerRecord {
        name: name.to_string(),
        value: value.to_string(),
        unit: (!unit.is_empty()).then_some(unit),
        reference_min,
        reference_max,
    })
}

/// Trim stray hyphens and spaces left over from range excision and collapse
/// interior whitespace runs.
fn sanitize_unit(candidate: &str) -> String {
    let trimmed = candidate
        .trim()
        .trim_matches(|c| c == '-' || c == ' ')
        .to_string();
    if trimmed.is_empty() {
        return trimmed;
    }
    WHITESPACE_RUN.replace_all(&trimmed, " ").into_owned()
}

fn has_measurement_chars(unit: &str) -> bool {
    unit.chars()
        .any(|c| c.is_alphabetic() || MEASUREMENT_SYMBOLS.contains(c))
}
