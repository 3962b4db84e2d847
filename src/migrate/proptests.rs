//! Property-based tests for the script chunker.
//!
//! These tests focus on the invariants of batch splitting: content lines
//! survive in order, and no batch carries blank or separator lines.

use proptest::prelude::*;

use super::batch::split_batches;

// Content lines avoid 'g'/'G' entirely so none can form a separator.
fn content_line_strategy() -> impl Strategy<Value = String> {
    "[a-fh-zA-FH-Z0-9 ;,()=']{1,30}".prop_filter("content must not be blank", |s| {
        !s.trim().is_empty()
    })
}

fn separator_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("GO".to_string()),
        Just("go".to_string()),
        Just("Go".to_string()),
        Just("GO;".to_string()),
        Just("GO;;   ".to_string()),
        Just("  go  ".to_string()),
        Just("GO -- done".to_string()),
        Just("go;; -- trailing note".to_string()),
    ]
}

fn line_strategy() -> impl Strategy<Value = Line> {
    prop_oneof![
        3 => content_line_strategy().prop_map(Line::Content),
        1 => separator_line_strategy().prop_map(Line::Separator),
        1 => Just(Line::Blank),
    ]
}

#[derive(Debug, Clone)]
enum Line {
    Content(String),
    Separator(String),
    Blank,
}

impl Line {
    fn text(&self) -> &str {
        match self {
            Self::Content(text) | Self::Separator(text) => text,
            Self::Blank => "   ",
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Every content line comes back, in order, and nothing else does.
    #[test]
    fn content_lines_survive_in_order(lines in prop::collection::vec(line_strategy(), 0..40)) {
        let script: String = lines
            .iter()
            .map(|line| format!("{}\n", line.text()))
            .collect();

        let expected: Vec<String> = lines
            .iter()
            .filter_map(|line| match line {
                Line::Content(text) => Some(text.clone()),
                _ => None,
            })
            .collect();

        let actual: Vec<String> = split_batches(&script)
            .flat_map(|batch| batch.lines().map(str::to_string).collect::<Vec<_>>())
            .collect();

        prop_assert_eq!(actual, expected);
    }

    // Batches are non-empty, newline-terminated, and free of separators.
    #[test]
    fn batches_are_well_formed(lines in prop::collection::vec(line_strategy(), 0..40)) {
        let script: String = lines
            .iter()
            .map(|line| format!("{}\n", line.text()))
            .collect();

        for batch in split_batches(&script) {
            prop_assert!(!batch.is_empty());
            prop_assert!(batch.ends_with('\n'));
            for line in batch.lines() {
                prop_assert!(!line.trim().is_empty());
                prop_assert!(!line.trim().eq_ignore_ascii_case("go"));
            }
        }
    }

    // A script with no separators is one batch (or none, if all blank).
    #[test]
    fn no_separator_means_at_most_one_batch(
        lines in prop::collection::vec(content_line_strategy(), 0..20)
    ) {
        let script: String = lines.iter().map(|line| format!("{line}\n")).collect();
        let count = split_batches(&script).count();
        if lines.is_empty() {
            prop_assert_eq!(count, 0);
        } else {
            prop_assert_eq!(count, 1);
        }
    }
}
