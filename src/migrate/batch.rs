//! Splitting migration scripts into executable batches.
//!
//! SQL tooling conventionally separates batches with a line holding the
//! token `GO`. This module reproduces that contract: a script becomes an
//! ordered sequence of batches, each executable on its own.

use std::str::Lines;
use std::sync::LazyLock;

use regex::Regex;

// The token "GO", optionally trailed by semicolons, whitespace, or a line
// comment. Matched against trimmed lines.
static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^go[\s;]*(--.*)?$").expect("separator pattern is valid"));

/// Splits a migration script into its batches.
///
/// The scan is line by line: blank lines are skipped entirely, a separator
/// line yields the accumulated batch, and end of input flushes a final
/// non-empty batch even without a trailing separator. The returned sequence
/// is lazy and single-pass.
///
/// Known limitation: a separator-shaped line inside a multi-line comment or
/// string literal is still treated as a terminator. Splitting is purely
/// line-based; there is no SQL tokenizer here.
///
/// # Examples
///
/// ```
/// use catchup::split_batches;
///
/// let batches: Vec<String> = split_batches("A;\nGO\nB;\nGO\n").collect();
/// assert_eq!(batches, vec!["A;\n", "B;\n"]);
/// ```
#[must_use]
pub fn split_batches(script: &str) -> Batches<'_> {
    Batches {
        lines: script.lines(),
    }
}

/// Lazy iterator over the batches of one migration script.
pub struct Batches<'a> {
    lines: Lines<'a>,
}

impl Iterator for Batches<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut batch = String::new();
        for line in self.lines.by_ref() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if SEPARATOR.is_match(trimmed) {
                if batch.is_empty() {
                    continue;
                }
                return Some(batch);
            }
            batch.push_str(line);
            batch.push('\n');
        }

        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}
