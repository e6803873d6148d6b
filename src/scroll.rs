use crate::settings::{TypingMode, TypingSettings};
use crate::supplier::{TextSupplier, APPEND_TEXT_LENGTH};
use crate::text;

/// Remaining untyped characters below which more text is requested
pub const REMAINING_THRESHOLD: usize = 150;

/// Joins appended chunks onto the existing text
pub fn separator(mode: TypingMode) -> char {
    match mode {
        TypingMode::English => ' ',
        _ => '\n',
    }
}

/// Keeps the text buffer ahead of the cursor
#[derive(Debug, Clone, Copy)]
pub struct InfiniteScrollController {
    threshold: usize,
    chunk_length: usize,
}

impl Default for InfiniteScrollController {
    fn default() -> Self {
        Self {
            threshold: REMAINING_THRESHOLD,
            chunk_length: APPEND_TEXT_LENGTH,
        }
    }
}

impl InfiniteScrollController {
    pub fn new(threshold: usize, chunk_length: usize) -> Self {
        Self {
            threshold,
            chunk_length,
        }
    }

    pub fn needs_more(&self, mode: TypingMode, display_len: usize, typed_len: usize) -> bool {
        mode != TypingMode::Custom && display_len.saturating_sub(typed_len) < self.threshold
    }

    /// Request one chunk and append it with the mode's separator.
    ///
    /// Returns the processed length added to the display text, or `None` when
    /// nothing was appended (custom mode or an empty chunk).
    pub fn extend<S: TextSupplier + ?Sized>(
        &self,
        supplier: &mut S,
        settings: &TypingSettings,
        target_text: &mut String,
    ) -> Option<usize> {
        if settings.mode == TypingMode::Custom {
            return None;
        }

        let chunk = supplier.generate_text(
            settings.mode,
            settings.difficulty,
            self.chunk_length,
            settings.text_source(),
        );
        if chunk.is_empty() {
            tracing::debug!(target: "scroll", mode = %settings.mode, "supplier returned no text");
            return None;
        }

        let separator = separator(settings.mode);
        target_text.push(separator);
        target_text.push_str(&chunk);

        let added = text::process(&separator.to_string(), settings.mode, &settings.english_options)
            .chars()
            .count()
            + text::process(&chunk, settings.mode, &settings.english_options)
                .chars()
                .count();
        tracing::debug!(target: "scroll", mode = %settings.mode, added, "appended text");
        Some(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supplier::FixedSupplier;

    #[test]
    fn test_needs_more_below_threshold() {
        let scroll = InfiniteScrollController::default();

        assert!(!scroll.needs_more(TypingMode::English, 500, 350));
        assert!(scroll.needs_more(TypingMode::English, 500, 351));
        assert!(scroll.needs_more(TypingMode::Coder, 10, 0));
        assert!(!scroll.needs_more(TypingMode::Custom, 10, 9));
    }

    #[test]
    fn test_extend_english_uses_space() {
        let scroll = InfiniteScrollController::default();
        let mut supplier = FixedSupplier::new("More Words");
        let settings = TypingSettings::default();
        let mut target = String::from("Hello");

        let added = scroll.extend(&mut supplier, &settings, &mut target);

        assert_eq!(target, "Hello More Words");
        assert_eq!(added, Some(11));
        assert_eq!(supplier.requests[0].min_length, APPEND_TEXT_LENGTH);
    }

    #[test]
    fn test_extend_other_modes_use_newline() {
        let scroll = InfiniteScrollController::default();
        let mut supplier = FixedSupplier::new("print(2)");
        let settings = TypingSettings {
            mode: TypingMode::Coder,
            ..TypingSettings::default()
        };
        let mut target = String::from("print(1)");

        scroll.extend(&mut supplier, &settings, &mut target);
        assert_eq!(target, "print(1)\nprint(2)");
    }

    #[test]
    fn test_extend_custom_is_noop() {
        let scroll = InfiniteScrollController::default();
        let mut supplier = FixedSupplier::new("never");
        let settings = TypingSettings {
            mode: TypingMode::Custom,
            ..TypingSettings::default()
        };
        let mut target = String::from("mine");

        assert_eq!(scroll.extend(&mut supplier, &settings, &mut target), None);
        assert_eq!(target, "mine");
        assert!(supplier.requests.is_empty());
    }

    #[test]
    fn test_extend_with_empty_chunk() {
        let scroll = InfiniteScrollController::default();
        let mut supplier = FixedSupplier::new("");
        let mut target = String::from("abc");

        assert_eq!(scroll.extend(&mut supplier, &TypingSettings::default(), &mut target), None);
        assert_eq!(target, "abc");
    }
}
