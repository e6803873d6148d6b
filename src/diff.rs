use crate::text::normalize;

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// Result of comparing the whole typed prefix against the display text
#[derive(Clone, Debug, Copy, Default, PartialEq, Eq)]
pub struct TypingAnalysis {
    pub correct_chars: usize,
    pub errors: usize,
    pub total_typed: usize,
}

impl TypingAnalysis {
    pub fn accuracy(&self) -> u32 {
        accuracy(self.correct_chars, self.total_typed)
    }
}

/// Compare `typed` against `display` position by position.
///
/// Both sides are normalized first. Characters typed past the end of the
/// display text count as errors, so `correct_chars + errors == total_typed`.
pub fn analyze(display: &str, typed: &str) -> TypingAnalysis {
    let display = normalize(display);
    let typed = normalize(typed);
    let display: Vec<char> = display.chars().collect();

    let mut analysis = TypingAnalysis::default();
    for (idx, c) in typed.chars().enumerate() {
        match outcome_at(&display, idx, c) {
            Outcome::Correct => analysis.correct_chars += 1,
            Outcome::Incorrect => analysis.errors += 1,
        }
        analysis.total_typed += 1;
    }

    analysis
}

/// Per-character classification used by renderers
pub fn outcomes(display: &str, typed: &str) -> Vec<Outcome> {
    let display: Vec<char> = normalize(display).chars().collect();
    normalize(typed)
        .chars()
        .enumerate()
        .map(|(idx, c)| outcome_at(&display, idx, c))
        .collect()
}

fn outcome_at(display: &[char], idx: usize, typed: char) -> Outcome {
    match display.get(idx) {
        Some(&expected) if expected == typed => Outcome::Correct,
        _ => Outcome::Incorrect,
    }
}

/// Percentage of correct characters, rounded half-up; 100 when nothing was typed
pub fn accuracy(correct_chars: usize, total_typed: usize) -> u32 {
    if total_typed == 0 {
        return 100;
    }
    ((correct_chars as f64 / total_typed as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_correct() {
        let analysis = analyze("hello world", "hello world");
        assert_eq!(analysis.correct_chars, 11);
        assert_eq!(analysis.errors, 0);
        assert_eq!(analysis.total_typed, 11);
        assert_eq!(analysis.accuracy(), 100);
    }

    #[test]
    fn test_errors_counted_per_position() {
        let analysis = analyze("hello", "hXllo");
        assert_eq!(analysis.correct_chars, 4);
        assert_eq!(analysis.errors, 1);
        assert_eq!(analysis.accuracy(), 80);
    }

    #[test]
    fn test_overflow_counts_as_errors() {
        let analysis = analyze("hi", "hiya");
        assert_eq!(analysis.correct_chars, 2);
        assert_eq!(analysis.errors, 2);
        assert_eq!(analysis.total_typed, 4);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(analyze("", ""), TypingAnalysis::default());
        assert_eq!(analyze("abc", "").accuracy(), 100);

        let analysis = analyze("", "x");
        assert_eq!(analysis.errors, 1);
        assert_eq!(analysis.correct_chars, 0);
    }

    #[test]
    fn test_typed_variants_match_after_normalization() {
        // Typed curly quote and ellipsis against straight display text
        let analysis = analyze("\"ok\"...", "\u{201C}ok\u{201D}\u{2026}");
        assert_eq!(analysis.correct_chars, 7);
        assert_eq!(analysis.errors, 0);
    }

    #[test]
    fn test_decomposed_input_composes_before_compare() {
        let analysis = analyze("caf\u{00E9}", "cafe\u{0301}");
        assert_eq!(analysis.total_typed, 4);
        assert_eq!(analysis.correct_chars, 4);
    }

    #[test]
    fn test_counts_always_sum_to_typed_len() {
        let cases = [
            ("hello", "help me"),
            ("", "abc"),
            ("abc", ""),
            ("床前明月光", "床前明日光啊"),
            ("a\tb\nc", "a b\nc"),
        ];
        for (display, typed) in cases {
            let analysis = analyze(display, typed);
            assert_eq!(
                analysis.correct_chars + analysis.errors,
                normalize(typed).chars().count()
            );
            assert_eq!(analysis.total_typed, normalize(typed).chars().count());
        }
    }

    #[test]
    fn test_outcomes() {
        assert_eq!(
            outcomes("abc", "axcd"),
            vec![
                Outcome::Correct,
                Outcome::Incorrect,
                Outcome::Correct,
                Outcome::Incorrect
            ]
        );
    }

    #[test]
    fn test_accuracy_rounding() {
        assert_eq!(accuracy(0, 0), 100);
        assert_eq!(accuracy(90, 100), 90);
        assert_eq!(accuracy(2, 3), 67);
        assert_eq!(accuracy(1, 3), 33);
        assert_eq!(accuracy(1, 8), 13);
        assert_eq!(accuracy(0, 5), 0);
    }
}
