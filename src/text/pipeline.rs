use crate::settings::{EnglishOptions, TypingMode};
use crate::text::normalizer::normalize;

/// Characters removed from english text when punctuation is ignored
const PUNCTUATION: [char; 9] = ['.', ',', '!', '?', ';', ':', '\'', '"', '-'];

/// Turn raw target text into the display text keystrokes are compared against.
///
/// English option edits run on the raw text first and normalization runs last,
/// so stripping can never undo a substitution.
pub fn process(raw: &str, mode: TypingMode, options: &EnglishOptions) -> String {
    if mode != TypingMode::English {
        return normalize(raw);
    }

    let mut processed = if options.ignore_punctuation {
        raw.chars().filter(|c| !PUNCTUATION.contains(c)).collect()
    } else {
        raw.to_string()
    };

    if !options.case_sensitive {
        processed = processed.to_lowercase();
    }

    normalize(&processed)
}
