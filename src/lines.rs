use crate::settings::TypingMode;

/// Width limit for wrapped english lines, separator space included
pub const ENGLISH_LINE_WIDTH: usize = 55;
/// Width limit for chinese and custom text, one unit per character
pub const CHARACTER_LINE_WIDTH: usize = 35;

/// One logical line of the display text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInfo {
    pub text: String,
    /// Offset (in chars) of the first character within the display text
    pub start_index: usize,
    /// Whether a literal `\n` follows this line in the display text
    pub has_newline: bool,
}

impl LineInfo {
    fn new(text: String, start_index: usize, has_newline: bool) -> Self {
        Self {
            text,
            start_index,
            has_newline,
        }
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Offset one past this line, counting the trailing newline if present
    pub fn end_index(&self) -> usize {
        self.start_index + self.len() + usize::from(self.has_newline)
    }
}

/// The three lines a renderer shows around the cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayWindow {
    pub prev_line: LineInfo,
    pub current_line: LineInfo,
    pub next_line: LineInfo,
}

/// Split display text into logical lines for the given mode.
///
/// Coder text splits on `\n` only. Everything else is wrapped greedily:
/// english packs space-separated words up to [`ENGLISH_LINE_WIDTH`], chinese
/// and custom pack single characters up to [`CHARACTER_LINE_WIDTH`]. A literal
/// newline always ends the current line.
pub fn calculate_all_lines(display_text: &str, mode: TypingMode) -> Vec<LineInfo> {
    if display_text.is_empty() {
        return Vec::new();
    }

    match mode {
        TypingMode::Coder => split_on_newlines(display_text),
        TypingMode::English => wrap_units(&english_units(display_text), ENGLISH_LINE_WIDTH),
        TypingMode::Chinese | TypingMode::Custom => {
            let units: Vec<Unit> = display_text
                .chars()
                .map(|c| match c {
                    '\n' => Unit::Break,
                    c => Unit::Text(c.to_string()),
                })
                .collect();
            wrap_units(&units, CHARACTER_LINE_WIDTH)
        }
    }
}

fn split_on_newlines(display_text: &str) -> Vec<LineInfo> {
    let segments: Vec<&str> = display_text.split('\n').collect();
    let last = segments.len() - 1;

    let mut start_index = 0;
    segments
        .into_iter()
        .enumerate()
        .map(|(idx, segment)| {
            let has_newline = idx < last;
            let line = LineInfo::new(segment.to_string(), start_index, has_newline);
            start_index += segment.chars().count() + usize::from(has_newline);
            line
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
enum Unit {
    Text(String),
    Break,
}

/// Words of each newline-separated segment with the separator space attached,
/// unless the word is followed by a forced break or ends the text.
fn english_units(display_text: &str) -> Vec<Unit> {
    let mut words = Vec::new();
    let segments: Vec<&str> = display_text.split('\n').collect();
    let last = segments.len() - 1;
    for (idx, segment) in segments.iter().enumerate() {
        if !segment.is_empty() {
            words.extend(segment.split(' ').map(|w| Unit::Text(w.to_string())));
        }
        if idx < last {
            words.push(Unit::Break);
        }
    }

    let count = words.len();
    let mut units = Vec::with_capacity(count);
    for idx in 0..count {
        let unit = match &words[idx] {
            Unit::Text(word) => {
                let followed_by_text = idx + 1 < count && words[idx + 1] != Unit::Break;
                if followed_by_text {
                    Unit::Text(format!("{word} "))
                } else {
                    Unit::Text(word.clone())
                }
            }
            Unit::Break => Unit::Break,
        };
        units.push(unit);
    }
    units
}

fn wrap_units(units: &[Unit], max_width: usize) -> Vec<LineInfo> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    let mut char_index = 0;

    for unit in units {
        match unit {
            Unit::Break => {
                lines.push(LineInfo::new(
                    std::mem::take(&mut current),
                    char_index - current_len,
                    true,
                ));
                current_len = 0;
                char_index += 1;
            }
            Unit::Text(text) => {
                let len = text.chars().count();
                if current_len > 0 && current_len + len > max_width {
                    lines.push(LineInfo::new(
                        std::mem::take(&mut current),
                        char_index - current_len,
                        false,
                    ));
                    current_len = 0;
                }
                current.push_str(text);
                current_len += len;
                char_index += len;
            }
        }
    }

    if current_len > 0 {
        lines.push(LineInfo::new(current, char_index - current_len, false));
    }

    lines
}

/// Index of the line holding the cursor at `typed_len`.
///
/// A cursor sitting exactly at the end of a non-terminal line belongs to the
/// next line. Past the end of the text the last line is current.
pub fn current_line_index(lines: &[LineInfo], typed_len: usize) -> usize {
    let last = lines.len().saturating_sub(1);
    for (idx, line) in lines.iter().enumerate() {
        let end = line.end_index();
        if typed_len < end {
            return idx;
        }
        if typed_len == end && idx < last {
            return idx + 1;
        }
    }
    last
}

/// Previous, current and next line around the cursor; empty placeholders
/// stand in at either boundary. O(number of lines).
pub fn get_lines_view(lines: &[LineInfo], typed_len: usize) -> DisplayWindow {
    let current = current_line_index(lines, typed_len);
    let line_at = |idx: Option<usize>| {
        idx.and_then(|i| lines.get(i))
            .cloned()
            .unwrap_or_default()
    };

    DisplayWindow {
        prev_line: line_at(current.checked_sub(1)),
        current_line: line_at(Some(current)),
        next_line: line_at(Some(current + 1)),
    }
}

/// True when `offset` is the first character of any line after the first.
pub fn is_later_line_start(lines: &[LineInfo], offset: usize) -> bool {
    lines
        .iter()
        .find(|line| line.start_index == offset)
        .is_some_and(|line| line.start_index != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[LineInfo]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_coder_splits_on_newlines() {
        let lines = calculate_all_lines("fn main() {\n\tlet x = 1;\n}", TypingMode::Coder);

        assert_eq!(texts(&lines), vec!["fn main() {", "\tlet x = 1;", "}"]);
        assert_eq!(lines[0].start_index, 0);
        assert_eq!(lines[1].start_index, 12);
        assert_eq!(lines[2].start_index, 24);
        assert!(lines[0].has_newline);
        assert!(lines[1].has_newline);
        assert!(!lines[2].has_newline);
    }

    #[test]
    fn test_coder_keeps_empty_segments() {
        let lines = calculate_all_lines("a\n\nb\n", TypingMode::Coder);
        assert_eq!(texts(&lines), vec!["a", "", "b", ""]);
        assert_eq!(
            lines.iter().map(|l| l.start_index).collect::<Vec<_>>(),
            vec![0, 2, 3, 5]
        );
        assert!(!lines[3].has_newline);
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        for mode in [
            TypingMode::English,
            TypingMode::Chinese,
            TypingMode::Coder,
            TypingMode::Custom,
        ] {
            assert!(calculate_all_lines("", mode).is_empty());
        }
    }

    #[test]
    fn test_english_short_text_single_line() {
        let lines = calculate_all_lines("hello world", TypingMode::English);
        assert_eq!(lines, vec![LineInfo::new("hello world".into(), 0, false)]);
    }

    #[test]
    fn test_english_wraps_at_width() {
        // 12 words of "abcd " are 5 chars each: 11 fit into 55, the 12th wraps
        let text = vec!["abcd"; 12].join(" ");
        let lines = calculate_all_lines(&text, TypingMode::English);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 55);
        assert!(lines[0].text.ends_with(' '));
        assert_eq!(lines[1].text, "abcd");
        assert_eq!(lines[1].start_index, 55);
        assert!(!lines[0].has_newline);
    }

    #[test]
    fn test_english_word_exactly_filling_line() {
        // 10 words of "abcd " = 50, then "abcd" (last word, no separator) = 54 fits
        let text = vec!["abcd"; 11].join(" ");
        let lines = calculate_all_lines(&text, TypingMode::English);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 54);
    }

    #[test]
    fn test_english_overlong_word_gets_own_line() {
        let long = "x".repeat(70);
        let text = format!("hi {long} there");
        let lines = calculate_all_lines(&text, TypingMode::English);

        assert_eq!(texts(&lines), vec!["hi ", &format!("{long} "), "there"]);
        assert_eq!(lines[1].start_index, 3);
        assert_eq!(lines[2].start_index, 74);
    }

    #[test]
    fn test_english_newline_forces_break() {
        let lines = calculate_all_lines("one two\nthree", TypingMode::English);

        assert_eq!(texts(&lines), vec!["one two", "three"]);
        assert!(lines[0].has_newline);
        assert_eq!(lines[1].start_index, 8);
        assert!(!lines[1].has_newline);
    }

    #[test]
    fn test_english_blank_line() {
        let lines = calculate_all_lines("a\n\nb", TypingMode::English);
        assert_eq!(texts(&lines), vec!["a", "", "b"]);
        assert_eq!(
            lines.iter().map(|l| l.start_index).collect::<Vec<_>>(),
            vec![0, 2, 3]
        );
    }

    #[test]
    fn test_chinese_wraps_by_character() {
        let text = "字".repeat(40);
        let lines = calculate_all_lines(&text, TypingMode::Chinese);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 35);
        assert_eq!(lines[1].len(), 5);
        assert_eq!(lines[1].start_index, 35);
    }

    #[test]
    fn test_chinese_newline_forces_break() {
        let lines = calculate_all_lines("床前明月光，\n疑是地上霜。", TypingMode::Chinese);
        assert_eq!(texts(&lines), vec!["床前明月光，", "疑是地上霜。"]);
        assert!(lines[0].has_newline);
        assert_eq!(lines[1].start_index, 7);
    }

    #[test]
    fn test_lines_are_contiguous() {
        let text = "The quick brown fox jumps over the lazy dog and keeps running far away.\nNext line here";
        for mode in [TypingMode::English, TypingMode::Custom, TypingMode::Coder] {
            let lines = calculate_all_lines(text, mode);
            for pair in lines.windows(2) {
                assert_eq!(pair[0].end_index(), pair[1].start_index);
            }
            assert_eq!(
                lines.last().map(LineInfo::end_index),
                Some(text.chars().count())
            );
        }
    }

    #[test]
    fn test_view_at_start() {
        let lines = calculate_all_lines("a\nb\nc", TypingMode::Coder);
        let view = get_lines_view(&lines, 0);

        assert_eq!(view.prev_line, LineInfo::default());
        assert_eq!(view.current_line.text, "a");
        assert_eq!(view.next_line.text, "b");
    }

    #[test]
    fn test_view_moves_to_next_line_at_line_end() {
        let lines = calculate_all_lines("ab\ncd\nef", TypingMode::Coder);

        // Typed "ab" but not the newline: still on the first line
        assert_eq!(get_lines_view(&lines, 2).current_line.text, "ab");
        // Typed "ab\n": exactly at the end of line 0, cursor belongs to line 1
        let view = get_lines_view(&lines, 3);
        assert_eq!(view.prev_line.text, "ab");
        assert_eq!(view.current_line.text, "cd");
        assert_eq!(view.current_line.start_index, 3);
        assert_eq!(view.next_line.text, "ef");
    }

    #[test]
    fn test_view_at_end_of_text() {
        let lines = calculate_all_lines("ab\ncd", TypingMode::Coder);
        let view = get_lines_view(&lines, 5);

        assert_eq!(view.prev_line.text, "ab");
        assert_eq!(view.current_line.text, "cd");
        assert_eq!(view.next_line, LineInfo::default());
    }

    #[test]
    fn test_view_without_lines() {
        assert_eq!(get_lines_view(&[], 0), DisplayWindow::default());
    }

    #[test]
    fn test_current_line_contains_cursor() {
        let text = "It was the best of times, it was the worst of times, it was the age of wisdom.\nA\n\nB";
        for mode in [TypingMode::English, TypingMode::Chinese, TypingMode::Coder] {
            let lines = calculate_all_lines(text, mode);
            let len = text.chars().count();
            for typed in 0..=len {
                let idx = current_line_index(&lines, typed);
                let line = &lines[idx];
                let is_last = idx == lines.len() - 1;
                let contains = line.start_index <= typed
                    && (typed < line.end_index() || (is_last && typed == line.end_index()));
                assert!(contains, "mode {mode} offset {typed} not in line {line:?}");
            }
        }
    }

    #[test]
    fn test_is_later_line_start() {
        let lines = calculate_all_lines("ab\ncd", TypingMode::Coder);
        assert!(!is_later_line_start(&lines, 0));
        assert!(!is_later_line_start(&lines, 2));
        assert!(is_later_line_start(&lines, 3));
        assert!(!is_later_line_start(&lines, 4));
    }
}
