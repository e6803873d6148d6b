use crate::error::ConfigError;
use crate::settings::{
    ChineseStyle, Difficulty, EnglishOptions, ProgrammingLanguage, TypingMode, TypingOptions,
    TypingSettings, DEFAULT_DURATION,
};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User-selectable defaults persisted between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub duration: u32,
    pub mode: TypingMode,
    pub difficulty: Difficulty,
    pub chinese_style: ChineseStyle,
    pub programming_language: ProgrammingLanguage,
    pub case_sensitive: bool,
    pub ignore_punctuation: bool,
    pub allow_backspace: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            mode: TypingMode::default(),
            difficulty: Difficulty::default(),
            chinese_style: ChineseStyle::default(),
            programming_language: ProgrammingLanguage::default(),
            case_sensitive: false,
            ignore_punctuation: false,
            allow_backspace: true,
        }
    }
}

impl From<&TypingSettings> for Config {
    fn from(s: &TypingSettings) -> Self {
        Self {
            duration: s.duration,
            mode: s.mode,
            difficulty: s.difficulty,
            chinese_style: s.chinese_style,
            programming_language: s.programming_language,
            case_sensitive: s.english_options.case_sensitive,
            ignore_punctuation: s.english_options.ignore_punctuation,
            allow_backspace: s.typing_options.allow_backspace,
        }
    }
}

impl From<&Config> for TypingSettings {
    fn from(c: &Config) -> Self {
        Self {
            duration: c.duration,
            mode: c.mode,
            difficulty: c.difficulty,
            chinese_style: c.chinese_style,
            programming_language: c.programming_language,
            english_options: EnglishOptions {
                case_sensitive: c.case_sensitive,
                ignore_punctuation: c.ignore_punctuation,
            },
            typing_options: TypingOptions {
                allow_backspace: c.allow_backspace,
            },
            custom_text: None,
        }
    }
}

pub trait ConfigStore {
    /// Stored config, or defaults when there is none or it can't be read
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "keystride") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("keystride_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn try_load(&self) -> Result<Config, ConfigError> {
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match self.try_load() {
            Ok(cfg) => cfg,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Config::default()
            }
            Err(e) => {
                tracing::warn!(
                    target: "config",
                    path = %self.path.display(),
                    error = %e,
                    "using default config"
                );
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
