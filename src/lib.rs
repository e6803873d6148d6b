// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod clock;
pub mod composition;
pub mod config;
pub mod diff;
pub mod error;
pub mod library;
pub mod lines;
pub mod metrics;
pub mod runtime;
pub mod scroll;
pub mod session;
pub mod settings;
pub mod supplier;
pub mod text;
pub mod time_series;
pub mod typing_policy;

pub use session::{Key, SessionState, SessionStatus, TypingSession};
pub use settings::{SettingsPatch, TypingMode, TypingSettings};
