use crate::error::LibraryError;
use crate::settings::{ChineseStyle, Difficulty, ProgrammingLanguage, TextSource, TypingMode};
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::collections::HashMap;

static LIBRARY_DIR: Dir = include_dir!("src/library");

/// Practice entries for one language or style, split by difficulty
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ContentPool {
    pub name: String,
    #[serde(default)]
    pub easy: Vec<String>,
    #[serde(default)]
    pub medium: Vec<String>,
    #[serde(default)]
    pub hard: Vec<String>,
}

impl ContentPool {
    pub fn entries(&self, difficulty: Difficulty) -> &[String] {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    fn without_blank_entries(mut self) -> Self {
        for entries in [&mut self.easy, &mut self.medium, &mut self.hard] {
            entries.retain(|e| !e.trim().is_empty());
        }
        self
    }
}

pub fn read_pool(name: &str) -> Result<ContentPool, LibraryError> {
    let file = LIBRARY_DIR
        .get_file(format!("{name}.json"))
        .ok_or_else(|| LibraryError::MissingPool(name.to_string()))?;

    let contents = file.contents_utf8().ok_or_else(|| LibraryError::InvalidUtf8 {
        name: name.to_string(),
    })?;

    let pool: ContentPool = from_str(contents).map_err(|source| LibraryError::Parse {
        name: name.to_string(),
        source,
    })?;

    Ok(pool.without_blank_entries())
}

fn code_pool_name(language: ProgrammingLanguage) -> String {
    format!("code_{language}")
}

/// Every bundled pool, loaded up front
#[derive(Debug, Clone)]
pub struct Library {
    english: ContentPool,
    chinese_modern: ContentPool,
    chinese_classical: ContentPool,
    code: HashMap<ProgrammingLanguage, ContentPool>,
}

impl Library {
    pub fn load() -> Result<Self, LibraryError> {
        let code = ProgrammingLanguage::ALL
            .iter()
            .map(|&lang| read_pool(&code_pool_name(lang)).map(|pool| (lang, pool)))
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(Self {
            english: read_pool("english")?,
            chinese_modern: read_pool("chinese_modern")?,
            chinese_classical: read_pool("chinese_classical")?,
            code,
        })
    }

    /// Build a library from explicit pools; languages without a pool fall back to python.
    pub fn from_pools(
        english: ContentPool,
        chinese_modern: ContentPool,
        chinese_classical: ContentPool,
        code: HashMap<ProgrammingLanguage, ContentPool>,
    ) -> Self {
        Self {
            english,
            chinese_modern,
            chinese_classical,
            code,
        }
    }

    /// The entries drawn from for the given settings.
    ///
    /// Custom mode draws from the easy english pool. A coder language whose pool
    /// is missing or empty at this difficulty falls back to easy python.
    pub fn entries(
        &self,
        mode: TypingMode,
        difficulty: Difficulty,
        source: TextSource,
    ) -> &[String] {
        match (mode, source) {
            (TypingMode::English, _) => self.english.entries(difficulty),
            (TypingMode::Chinese, source) => {
                let style = match source {
                    TextSource::Style(style) => style,
                    _ => ChineseStyle::default(),
                };
                match style {
                    ChineseStyle::Modern => self.chinese_modern.entries(difficulty),
                    ChineseStyle::Classical => self.chinese_classical.entries(difficulty),
                }
            }
            (TypingMode::Coder, source) => {
                let language = match source {
                    TextSource::Language(language) => language,
                    _ => ProgrammingLanguage::default(),
                };
                match self.code.get(&language).map(|pool| pool.entries(difficulty)) {
                    Some(entries) if !entries.is_empty() => entries,
                    _ => {
                        tracing::warn!(
                            target: "supplier",
                            %language,
                            %difficulty,
                            "no code pool available, falling back to python easy"
                        );
                        self.code
                            .get(&ProgrammingLanguage::Python)
                            .map(|pool| pool.entries(Difficulty::Easy))
                            .unwrap_or_default()
                    }
                }
            }
            (TypingMode::Custom, _) => self.english.entries(Difficulty::Easy),
        }
    }
}
