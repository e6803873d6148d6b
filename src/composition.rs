/// Phase of an input-method composition
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CompositionState {
    #[default]
    Idle,
    Composing,
    Committing,
}

/// Buffers provisional IME text so none of it reaches the diff engine until
/// the composition ends. The committed string is released in one piece.
#[derive(Debug, Default, Clone)]
pub struct CompositionGate {
    state: CompositionState,
    preedit: String,
}

impl CompositionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CompositionState {
        self.state
    }

    pub fn is_composing(&self) -> bool {
        self.state == CompositionState::Composing
    }

    /// Provisional text shown while composing; never diffed
    pub fn preedit(&self) -> &str {
        &self.preedit
    }

    /// Returns false if a composition was already in progress.
    pub fn start(&mut self) -> bool {
        if self.state == CompositionState::Composing {
            return false;
        }
        self.state = CompositionState::Composing;
        self.preedit.clear();
        true
    }

    pub fn update(&mut self, preedit: &str) {
        if self.is_composing() {
            self.preedit.clear();
            self.preedit.push_str(preedit);
        }
    }

    /// Move to `Committing` and hand back the text to feed as input.
    /// `None` when no composition was active.
    pub fn end(&mut self, committed: &str) -> Option<String> {
        if !self.is_composing() {
            return None;
        }
        self.state = CompositionState::Committing;
        self.preedit.clear();
        Some(committed.to_string())
    }

    /// Return to `Idle` once the committed text has been consumed.
    pub fn settle(&mut self) {
        self.state = CompositionState::Idle;
    }

    /// Abandon whatever is being composed
    pub fn reset(&mut self) {
        self.state = CompositionState::Idle;
        self.preedit.clear();
    }
}
