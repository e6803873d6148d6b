use crate::error::LibraryError;
use crate::library::Library;
use crate::settings::{Difficulty, TextSource, TypingMode};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Minimum length requested when a session is initialised
pub const INITIAL_TEXT_LENGTH: usize = 500;
/// Minimum length requested for each appended chunk
pub const APPEND_TEXT_LENGTH: usize = 300;

/// Produces raw practice text for the session
pub trait TextSupplier {
    fn generate_text(
        &mut self,
        mode: TypingMode,
        difficulty: Difficulty,
        min_length: usize,
        source: TextSource,
    ) -> String;
}

/// Draw entries uniformly at random with replacement, joining them with `\n`
/// until the result holds at least `min_length` chars, then trim.
///
/// Consecutive draws may repeat the same entry. Empty entries are never drawn.
pub fn draw_from_pool<R: Rng + ?Sized>(
    pool: &[String],
    min_length: usize,
    rng: &mut R,
) -> String {
    let entries: Vec<&String> = pool.iter().filter(|entry| !entry.is_empty()).collect();
    let mut result = String::new();
    let mut len = 0;

    while len < min_length {
        let Some(entry) = entries.choose(rng) else {
            return String::new();
        };
        if len > 0 {
            result.push('\n');
            len += 1;
        }
        result.push_str(entry);
        len += entry.chars().count();
    }

    result.trim().to_string()
}

/// Supplier backed by the bundled content library
pub struct LibrarySupplier<R = StdRng> {
    library: Library,
    rng: R,
}

impl LibrarySupplier<StdRng> {
    pub fn new() -> Result<Self, LibraryError> {
        Ok(Self::with_rng(Library::load()?, StdRng::from_entropy()))
    }

    pub fn seeded(seed: u64) -> Result<Self, LibraryError> {
        Ok(Self::with_rng(Library::load()?, StdRng::seed_from_u64(seed)))
    }
}

impl<R: Rng> LibrarySupplier<R> {
    pub fn with_rng(library: Library, rng: R) -> Self {
        Self { library, rng }
    }
}

impl<R: Rng> TextSupplier for LibrarySupplier<R> {
    fn generate_text(
        &mut self,
        mode: TypingMode,
        difficulty: Difficulty,
        min_length: usize,
        source: TextSource,
    ) -> String {
        let pool = self.library.entries(mode, difficulty, source);
        tracing::debug!(
            target: "supplier",
            %mode,
            %difficulty,
            ?source,
            pool_size = pool.len(),
            min_length,
            "generating text"
        );
        draw_from_pool(pool, min_length, &mut self.rng)
    }
}

/// A text generation request as seen by [`FixedSupplier`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRequest {
    pub mode: TypingMode,
    pub difficulty: Difficulty,
    pub min_length: usize,
    pub source: TextSource,
}

/// Deterministic supplier that hands out the same chunk on every call and
/// records what it was asked for. Used by headless front-ends and tests.
#[derive(Debug, Clone, Default)]
pub struct FixedSupplier {
    chunk: String,
    pub requests: Vec<TextRequest>,
}

impl FixedSupplier {
    pub fn new(chunk: impl Into<String>) -> Self {
        Self {
            chunk: chunk.into(),
            requests: Vec::new(),
        }
    }
}

impl TextSupplier for FixedSupplier {
    fn generate_text(
        &mut self,
        mode: TypingMode,
        difficulty: Difficulty,
        min_length: usize,
        source: TextSource,
    ) -> String {
        self.requests.push(TextRequest {
            mode,
            difficulty,
            min_length,
            source,
        });
        self.chunk.clone()
    }
}
