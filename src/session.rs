use crate::clock::Clock;
use crate::composition::{CompositionGate, CompositionState};
use crate::diff::{self, TypingAnalysis};
use crate::lines::{self, DisplayWindow, LineInfo};
use crate::metrics::MetricsCollector;
use crate::scroll::InfiniteScrollController;
use crate::settings::{Difficulty, SettingsPatch, TypingMode, TypingSettings};
use crate::supplier::{TextSupplier, INITIAL_TEXT_LENGTH};
use crate::text;
use crate::time_series::MetricSample;
use crate::typing_policy::{self, Refusal};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Finished,
}

/// A keystroke as the engine understands it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
}

/// The canonical session record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub status: SessionStatus,
    /// Raw generated or custom text
    pub target_text: String,
    /// `target_text` after option processing and normalization
    pub display_text: String,
    /// Length of `display_text` in chars
    pub display_len: usize,
    /// Accepted keystrokes, each normalized as it arrives
    pub typed_text: String,
    /// Length of the normalized typed text, i.e. the cursor offset
    pub typed_len: usize,
    pub correct_chars: usize,
    pub errors: usize,
    pub wpm: u32,
    pub cpm: u32,
    pub lpm: u32,
    pub accuracy: u32,
    pub time_left: u32,
    /// Epoch milliseconds of the first input
    pub start_time: Option<i64>,
    pub cpm_history: Vec<MetricSample>,
    pub last_correct_chars: usize,
    pub lines: Vec<LineInfo>,
    pub last_coder_text: Option<String>,
}

/// What a finished session reports to result-recording collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub cpm: u32,
    pub wpm: u32,
    pub lpm: u32,
    pub accuracy: u32,
    pub errors: usize,
    pub mode: TypingMode,
    pub sub_mode: Option<String>,
    pub difficulty: Difficulty,
    pub duration: u32,
}

/// Kind of mutation an observer is notified about
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SessionChange {
    Initialized,
    Started,
    Input,
    Backspace,
    Appended,
    Tick,
    Finished,
    SettingsChanged,
    Composition,
}

pub type Observer = Box<dyn FnMut(SessionChange, &SessionState)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Drives one practice attempt through idle, running and finished.
///
/// Every operation leaves the state settled: display text, lines and counters
/// agree with each other before observers run.
pub struct TypingSession<S, C> {
    settings: TypingSettings,
    state: SessionState,
    supplier: S,
    clock: C,
    scroll: InfiniteScrollController,
    composition: CompositionGate,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl<S: TextSupplier, C: Clock> TypingSession<S, C> {
    /// Create a session and generate its first text
    pub fn new(settings: TypingSettings, supplier: S, clock: C) -> Self {
        let mut session = Self {
            settings,
            state: SessionState::default(),
            supplier,
            clock,
            scroll: InfiniteScrollController::default(),
            composition: CompositionGate::new(),
            observers: Vec::new(),
            next_subscription: 0,
        };
        session.init_test(false);
        session
    }

    pub fn with_scroll(mut self, scroll: InfiniteScrollController) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn settings(&self) -> &TypingSettings {
        &self.settings
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn supplier(&self) -> &S {
        &self.supplier
    }

    pub fn composition_state(&self) -> CompositionState {
        self.composition.state()
    }

    pub fn preedit(&self) -> &str {
        self.composition.preedit()
    }

    pub fn subscribe(
        &mut self,
        observer: impl FnMut(SessionChange, &SessionState) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn notify(&mut self, change: SessionChange) {
        for (_, observer) in self.observers.iter_mut() {
            observer(change, &self.state);
        }
    }

    /// Build a fresh session record for the current settings.
    ///
    /// Custom text is used verbatim when present; coder text is reused from the
    /// previous coder session unless `force_regenerate` is set.
    pub fn init_test(&mut self, force_regenerate: bool) {
        let settings = &self.settings;
        let custom = settings
            .custom_text
            .as_deref()
            .filter(|text| !text.is_empty());
        let cached_coder = self
            .state
            .last_coder_text
            .as_deref()
            .filter(|_| settings.mode == TypingMode::Coder && !force_regenerate);

        let raw_text = match (settings.mode, custom, cached_coder) {
            (TypingMode::Custom, Some(text), _) => text.to_string(),
            (TypingMode::Coder, _, Some(text)) => text.to_string(),
            _ => self.supplier.generate_text(
                settings.mode,
                settings.difficulty,
                INITIAL_TEXT_LENGTH,
                settings.text_source(),
            ),
        };

        let last_coder_text = match settings.mode {
            TypingMode::Coder => Some(raw_text.clone()),
            _ => self.state.last_coder_text.take(),
        };

        self.composition.reset();
        self.state = SessionState {
            time_left: settings.duration,
            accuracy: 100,
            last_coder_text,
            ..SessionState::default()
        };
        self.set_target_text(raw_text);

        tracing::debug!(
            target: "session",
            mode = %self.settings.mode,
            difficulty = %self.settings.difficulty,
            force_regenerate,
            display_len = self.state.display_len,
            lines = self.state.lines.len(),
            "init_test"
        );
        self.notify(SessionChange::Initialized);
    }

    /// Replace the target text and recompute everything derived from it
    fn set_target_text(&mut self, raw_text: String) {
        self.state.target_text = raw_text;
        self.refresh_display();
    }

    fn refresh_display(&mut self) {
        let display_text = text::process(
            &self.state.target_text,
            self.settings.mode,
            &self.settings.english_options,
        );
        self.state.display_len = display_text.chars().count();
        self.state.lines = lines::calculate_all_lines(&display_text, self.settings.mode);
        self.state.display_text = display_text;
    }

    fn reanalyze(&mut self) {
        let TypingAnalysis {
            correct_chars,
            errors,
            total_typed,
        } = diff::analyze(&self.state.display_text, &self.state.typed_text);
        self.state.correct_chars = correct_chars;
        self.state.errors = errors;
        self.state.typed_len = total_typed;
        self.state.accuracy = diff::accuracy(correct_chars, total_typed);
    }

    /// Idle to running; stamps the start time. False in any other state.
    pub fn start_test(&mut self) -> bool {
        if self.state.status != SessionStatus::Idle {
            return false;
        }
        self.state.status = SessionStatus::Running;
        self.state.start_time = Some(self.clock.now_ms());
        tracing::debug!(target: "session", start_time = self.state.start_time, "start_test");
        self.notify(SessionChange::Started);
        true
    }

    fn refused(&self, action: &str, refusal: Refusal) -> bool {
        tracing::trace!(target: "session", action, %refusal, "ignored");
        false
    }

    /// Append one character to the typed text. The first call while idle
    /// starts the session even when the character itself is refused.
    pub fn handle_input(&mut self, c: char) -> bool {
        if self.state.status == SessionStatus::Idle {
            self.start_test();
        }

        // Stored normalized so each char of typed_text is one display position
        let keystroke = text::normalize(c.encode_utf8(&mut [0; 4]));
        if let Err(refusal) = typing_policy::check_input(
            self.state.status,
            self.state.typed_len,
            keystroke.chars().count(),
            self.state.display_len,
        ) {
            return self.refused("input", refusal);
        }

        self.state.typed_text.push_str(&keystroke);
        self.reanalyze();
        tracing::trace!(
            target: "session",
            ?c,
            typed_len = self.state.typed_len,
            correct = self.state.correct_chars,
            errors = self.state.errors,
            "input"
        );
        self.notify(SessionChange::Input);

        if self
            .scroll
            .needs_more(self.settings.mode, self.state.display_len, self.state.typed_len)
        {
            self.append_text();
        }
        true
    }

    /// Delete the last typed character, unless that would re-open a completed line
    pub fn handle_backspace(&mut self) -> bool {
        if let Err(refusal) = typing_policy::check_backspace(
            self.state.status,
            &self.settings.typing_options,
            self.state.typed_len,
            &self.state.lines,
        ) {
            return self.refused("backspace", refusal);
        }

        self.state.typed_text.pop();
        self.reanalyze();
        self.notify(SessionChange::Backspace);
        true
    }

    /// Route a keystroke. Keys are swallowed while an IME composition is open,
    /// and Tab only exists in coder mode.
    pub fn handle_key(&mut self, key: Key) -> bool {
        if self.composition.is_composing() {
            return self.refused("key", Refusal::Composing);
        }
        match key {
            Key::Char(c) => self.handle_input(c),
            Key::Enter => self.handle_input('\n'),
            Key::Tab if self.settings.mode == TypingMode::Coder => self.handle_input('\t'),
            Key::Tab => self.refused("key", Refusal::UndefinedKey),
            Key::Backspace => self.handle_backspace(),
        }
    }

    /// Pull another chunk from the supplier; a no-op in custom mode.
    pub fn append_text(&mut self) -> bool {
        let Some(added) = self
            .scroll
            .extend(&mut self.supplier, &self.settings, &mut self.state.target_text)
        else {
            return false;
        };

        let before = self.state.display_len;
        self.refresh_display();
        tracing::debug!(
            target: "scroll",
            added,
            display_len = self.state.display_len,
            lines = self.state.lines.len(),
            "display extended from {before}"
        );
        self.notify(SessionChange::Appended);
        true
    }

    /// One wall-clock second. Refreshes the live metrics, records a history
    /// sample and finishes the session once time runs out.
    pub fn tick(&mut self) -> bool {
        if self.state.status != SessionStatus::Running {
            return false;
        }

        let new_time_left = i64::from(self.state.time_left) - 1;
        let elapsed_secs = self
            .state
            .start_time
            .map(|start| (self.clock.now_ms() - start) as f64 / 1000.0)
            .unwrap_or(0.0);

        let (snapshot, sample) = MetricsCollector {
            mode: self.settings.mode,
            target_text: &self.state.target_text,
            correct_chars: self.state.correct_chars,
            last_correct_chars: self.state.last_correct_chars,
            accuracy: self.state.accuracy,
        }
        .collect(elapsed_secs);

        self.state.wpm = snapshot.wpm;
        self.state.cpm = snapshot.cpm;
        self.state.lpm = snapshot.lpm;
        self.state.cpm_history.push(sample);
        self.state.last_correct_chars = self.state.correct_chars;

        if new_time_left <= 0 {
            self.state.time_left = 0;
            self.notify(SessionChange::Tick);
            self.finish_test();
        } else {
            self.state.time_left = new_time_left as u32;
            self.notify(SessionChange::Tick);
        }
        true
    }

    pub fn finish_test(&mut self) -> bool {
        if self.state.status == SessionStatus::Finished {
            return false;
        }
        self.state.status = SessionStatus::Finished;
        self.composition.reset();
        tracing::debug!(
            target: "session",
            cpm = self.state.cpm,
            wpm = self.state.wpm,
            accuracy = self.state.accuracy,
            errors = self.state.errors,
            "finish_test"
        );
        self.notify(SessionChange::Finished);
        true
    }

    pub fn reset_test(&mut self) {
        self.init_test(false);
    }

    /// Merge a partial settings update.
    ///
    /// A changed mode, difficulty, style, language or duration regenerates the
    /// session. Changed english options in english mode reprocess the current
    /// text in place and reset typing progress.
    pub fn update_settings(&mut self, patch: SettingsPatch) {
        let regenerate = patch.requires_regeneration(&self.settings);
        let force = patch.invalidates_cached_text(&self.settings);
        let reprocess =
            patch.english_options.is_some() && self.settings.mode == TypingMode::English;

        self.settings = self.settings.merged(&patch);
        tracing::debug!(target: "session", regenerate, reprocess, ?patch, "update_settings");

        if regenerate {
            self.init_test(force);
        } else if reprocess {
            self.refresh_display();
            self.state.typed_text.clear();
            self.state.typed_len = 0;
            self.state.correct_chars = 0;
            self.state.errors = 0;
            self.state.accuracy = 100;
            self.composition.reset();
        }
        self.notify(SessionChange::SettingsChanged);
    }

    /// An IME composition began. Starts the clock when idle.
    pub fn composition_start(&mut self) -> bool {
        if self.state.status == SessionStatus::Finished || !self.composition.start() {
            return false;
        }
        if self.state.status == SessionStatus::Idle {
            self.start_test();
        }
        self.notify(SessionChange::Composition);
        true
    }

    pub fn composition_update(&mut self, preedit: &str) {
        if self.composition.is_composing() {
            self.composition.update(preedit);
            self.notify(SessionChange::Composition);
        }
    }

    /// Commit the composed text, feeding it to the diff only now.
    /// Returns how many characters were accepted.
    pub fn composition_end(&mut self, committed: &str) -> usize {
        let Some(committed) = self.composition.end(committed) else {
            return 0;
        };
        let accepted = committed.chars().filter(|&c| self.handle_input(c)).count();
        self.composition.settle();
        self.notify(SessionChange::Composition);
        accepted
    }

    /// Previous, current and next line around the cursor
    pub fn display_window(&self) -> DisplayWindow {
        lines::get_lines_view(&self.state.lines, self.state.typed_len)
    }

    /// The record handed to collaborators once the session is finished
    pub fn result(&self) -> Option<SessionResult> {
        (self.state.status == SessionStatus::Finished).then(|| SessionResult {
            cpm: self.state.cpm,
            wpm: self.state.wpm,
            lpm: self.state.lpm,
            accuracy: self.state.accuracy,
            errors: self.state.errors,
            mode: self.settings.mode,
            sub_mode: self.settings.sub_mode(),
            difficulty: self.settings.difficulty,
            duration: self.settings.duration,
        })
    }
}
