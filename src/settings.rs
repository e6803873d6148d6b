use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DURATION: u32 = 60;

/// Durations offered by the front-end, in seconds
pub const DURATION_OPTIONS: [u32; 4] = [15, 30, 60, 120];

#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TypingMode {
    #[default]
    English,
    Chinese,
    Coder,
    Custom,
}

#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChineseStyle {
    #[default]
    Modern,
    Classical,
}

#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProgrammingLanguage {
    #[default]
    Python,
    Javascript,
    Typescript,
    Java,
    Cpp,
    C,
    Go,
    Rust,
    Html,
    Bash,
    Powershell,
}

impl ProgrammingLanguage {
    pub const ALL: [ProgrammingLanguage; 11] = [
        ProgrammingLanguage::Python,
        ProgrammingLanguage::Javascript,
        ProgrammingLanguage::Typescript,
        ProgrammingLanguage::Java,
        ProgrammingLanguage::Cpp,
        ProgrammingLanguage::C,
        ProgrammingLanguage::Go,
        ProgrammingLanguage::Rust,
        ProgrammingLanguage::Html,
        ProgrammingLanguage::Bash,
        ProgrammingLanguage::Powershell,
    ];
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnglishOptions {
    pub case_sensitive: bool,
    pub ignore_punctuation: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingOptions {
    pub allow_backspace: bool,
}

impl Default for TypingOptions {
    fn default() -> Self {
        Self {
            allow_backspace: true,
        }
    }
}

/// Which sub-pool the supplier draws from besides mode and difficulty
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextSource {
    Style(ChineseStyle),
    Language(ProgrammingLanguage),
    Default,
}

/// Immutable settings snapshot for one session; replaced wholesale on update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingSettings {
    pub duration: u32,
    pub mode: TypingMode,
    pub difficulty: Difficulty,
    pub chinese_style: ChineseStyle,
    pub programming_language: ProgrammingLanguage,
    pub english_options: EnglishOptions,
    pub typing_options: TypingOptions,
    pub custom_text: Option<String>,
}

impl Default for TypingSettings {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            mode: TypingMode::default(),
            difficulty: Difficulty::default(),
            chinese_style: ChineseStyle::default(),
            programming_language: ProgrammingLanguage::default(),
            english_options: EnglishOptions::default(),
            typing_options: TypingOptions::default(),
            custom_text: None,
        }
    }
}

impl TypingSettings {
    pub fn text_source(&self) -> TextSource {
        match self.mode {
            TypingMode::Chinese => TextSource::Style(self.chinese_style),
            TypingMode::Coder => TextSource::Language(self.programming_language),
            TypingMode::English | TypingMode::Custom => TextSource::Default,
        }
    }

    /// The sub-mode label reported alongside results
    pub fn sub_mode(&self) -> Option<String> {
        match self.mode {
            TypingMode::Chinese => Some(self.chinese_style.to_string()),
            TypingMode::Coder => Some(self.programming_language.to_string()),
            TypingMode::English | TypingMode::Custom => None,
        }
    }

    /// Merge a patch into a new snapshot
    pub fn merged(&self, patch: &SettingsPatch) -> Self {
        Self {
            duration: patch.duration.unwrap_or(self.duration),
            mode: patch.mode.unwrap_or(self.mode),
            difficulty: patch.difficulty.unwrap_or(self.difficulty),
            chinese_style: patch.chinese_style.unwrap_or(self.chinese_style),
            programming_language: patch
                .programming_language
                .unwrap_or(self.programming_language),
            english_options: patch.english_options.unwrap_or(self.english_options),
            typing_options: patch.typing_options.unwrap_or(self.typing_options),
            custom_text: patch
                .custom_text
                .clone()
                .or_else(|| self.custom_text.clone()),
        }
    }
}

/// A partial settings update; `None` fields keep their current value
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SettingsPatch {
    pub duration: Option<u32>,
    pub mode: Option<TypingMode>,
    pub difficulty: Option<Difficulty>,
    pub chinese_style: Option<ChineseStyle>,
    pub programming_language: Option<ProgrammingLanguage>,
    pub english_options: Option<EnglishOptions>,
    pub typing_options: Option<TypingOptions>,
    pub custom_text: Option<String>,
}

impl SettingsPatch {
    /// True when applying the patch to `current` requires regenerating the text.
    pub fn requires_regeneration(&self, current: &TypingSettings) -> bool {
        fn changed<T: PartialEq>(new: Option<T>, old: T) -> bool {
            new.is_some_and(|v| v != old)
        }

        changed(self.mode, current.mode)
            || changed(self.difficulty, current.difficulty)
            || changed(self.chinese_style, current.chinese_style)
            || changed(self.programming_language, current.programming_language)
            || changed(self.duration, current.duration)
    }

    /// True when cached coder text can no longer be reused.
    pub fn invalidates_cached_text(&self, current: &TypingSettings) -> bool {
        self.difficulty.is_some_and(|d| d != current.difficulty)
            || self
                .programming_language
                .is_some_and(|l| l != current.programming_language)
    }

    pub fn mode(mode: TypingMode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    pub fn english_options(options: EnglishOptions) -> Self {
        Self {
            english_options: Some(options),
            ..Self::default()
        }
    }
}
