use crate::lines::{self, LineInfo};
use crate::session::SessionStatus;
use crate::settings::TypingOptions;

/// Why a keystroke was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Refusal {
    Finished,
    /// Everything in the display text has been typed
    TextExhausted,
    BackspaceDisabled,
    NothingTyped,
    /// Deleting would step back into an already completed line
    LineCompleted,
    Composing,
    UndefinedKey,
}

/// `incoming` is how many chars the keystroke adds once normalized
pub fn check_input(
    status: SessionStatus,
    typed_len: usize,
    incoming: usize,
    display_len: usize,
) -> Result<(), Refusal> {
    if status == SessionStatus::Finished {
        return Err(Refusal::Finished);
    }
    if typed_len + incoming > display_len {
        return Err(Refusal::TextExhausted);
    }
    Ok(())
}

/// Backspace removes one character but never crosses back over the start of
/// a line after the first: lines are completed one at a time.
pub fn check_backspace(
    status: SessionStatus,
    options: &TypingOptions,
    typed_len: usize,
    lines: &[LineInfo],
) -> Result<(), Refusal> {
    if !options.allow_backspace {
        return Err(Refusal::BackspaceDisabled);
    }
    if status == SessionStatus::Finished {
        return Err(Refusal::Finished);
    }
    if typed_len == 0 {
        return Err(Refusal::NothingTyped);
    }
    if lines::is_later_line_start(lines, typed_len) {
        return Err(Refusal::LineCompleted);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::calculate_all_lines;
    use crate::settings::TypingMode;

    const ALLOW: TypingOptions = TypingOptions {
        allow_backspace: true,
    };

    #[test]
    fn test_input_refused_once_finished() {
        assert_eq!(check_input(SessionStatus::Finished, 0, 1, 10), Err(Refusal::Finished));
        assert_eq!(check_input(SessionStatus::Running, 3, 1, 10), Ok(()));
        assert_eq!(check_input(SessionStatus::Idle, 0, 1, 10), Ok(()));
    }

    #[test]
    fn test_input_refused_at_end_of_text() {
        let running = SessionStatus::Running;
        assert_eq!(check_input(running, 10, 1, 10), Err(Refusal::TextExhausted));
        assert_eq!(check_input(SessionStatus::Idle, 0, 1, 0), Err(Refusal::TextExhausted));
        assert_eq!(check_input(running, 9, 1, 10), Ok(()));
    }

    #[test]
    fn test_multi_char_keystroke_must_fit() {
        let running = SessionStatus::Running;
        assert_eq!(check_input(running, 1, 3, 2), Err(Refusal::TextExhausted));
        assert_eq!(check_input(running, 7, 3, 10), Ok(()));
        assert_eq!(check_input(running, 8, 3, 10), Err(Refusal::TextExhausted));
    }

    #[test]
    fn test_backspace_rules() {
        let lines = calculate_all_lines("ab\ncd", TypingMode::Coder);
        let running = SessionStatus::Running;

        assert_eq!(check_backspace(running, &ALLOW, 2, &lines), Ok(()));
        assert_eq!(check_backspace(running, &ALLOW, 4, &lines), Ok(()));
        assert_eq!(check_backspace(running, &ALLOW, 0, &lines), Err(Refusal::NothingTyped));
        assert_eq!(check_backspace(running, &ALLOW, 3, &lines), Err(Refusal::LineCompleted));
        assert_eq!(
            check_backspace(SessionStatus::Finished, &ALLOW, 2, &lines),
            Err(Refusal::Finished)
        );

        let deny = TypingOptions {
            allow_backspace: false,
        };
        assert_eq!(
            check_backspace(running, &deny, 2, &lines),
            Err(Refusal::BackspaceDisabled)
        );
    }

    #[test]
    fn test_refusal_display() {
        assert_eq!(Refusal::LineCompleted.to_string(), "line_completed");
    }
}
