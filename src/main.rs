mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use keystride::{
    clock::{Clock, SystemClock},
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{self, CrosstermEventSource, Runner, SessionEvent, TickTimer},
    settings::{ChineseStyle, Difficulty, EnglishOptions, ProgrammingLanguage, DURATION_OPTIONS},
    supplier::{LibrarySupplier, TextSupplier},
    Key, SettingsPatch, TypingMode, TypingSession, TypingSettings,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs,
    io::{self, stdin},
    path::{Path, PathBuf},
    time::Instant,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// timed typing practice with endless text, live speed metrics and a results chart
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Timed typing practice in english, chinese or code. Text keeps scrolling in as you type; speed and accuracy update every second and are charted at the end."
)]
pub struct Cli {
    /// kind of text to practise on
    #[clap(short = 'm', long, value_enum)]
    mode: Option<TypingMode>,

    /// difficulty of the generated text
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// number of seconds to run test
    #[clap(short = 's', long)]
    duration: Option<u32>,

    /// programming language used in coder mode
    #[clap(short = 'l', long, value_enum)]
    language: Option<ProgrammingLanguage>,

    /// chinese text style
    #[clap(long, value_enum)]
    style: Option<ChineseStyle>,

    /// custom text to type; switches to custom mode unless --mode is given
    #[clap(short = 'p', long, conflicts_with = "text_file")]
    text: Option<String>,

    /// read the custom text from a file
    #[clap(long)]
    text_file: Option<PathBuf>,

    /// keep upper case letters in english text
    #[clap(long)]
    case_sensitive: bool,

    /// strip punctuation from english text
    #[clap(long)]
    ignore_punctuation: bool,

    /// disable backspace
    #[clap(long)]
    no_backspace: bool,

    /// config file to read and update instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    /// write diagnostics to this file (filtered by RUST_LOG)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// seed for deterministic text selection
    #[clap(long)]
    seed: Option<u64>,

    /// print the text for the resolved settings and exit
    #[clap(long)]
    print_text: bool,
}

impl Cli {
    fn custom_text(&self) -> io::Result<Option<String>> {
        match (&self.text, &self.text_file) {
            (Some(text), _) => Ok(Some(text.clone())),
            (None, Some(path)) => Ok(Some(fs::read_to_string(path)?)),
            (None, None) => Ok(None),
        }
    }

    /// Stored config first, then whatever was given on the command line
    fn resolve_settings(&self, config: &Config, custom_text: Option<String>) -> TypingSettings {
        let mut settings = TypingSettings::from(config);

        if let Some(duration) = self.duration {
            settings.duration = duration;
        }
        if let Some(difficulty) = self.difficulty {
            settings.difficulty = difficulty;
        }
        if let Some(language) = self.language {
            settings.programming_language = language;
        }
        if let Some(style) = self.style {
            settings.chinese_style = style;
        }
        if self.case_sensitive {
            settings.english_options.case_sensitive = true;
        }
        if self.ignore_punctuation {
            settings.english_options.ignore_punctuation = true;
        }
        if self.no_backspace {
            settings.typing_options.allow_backspace = false;
        }

        settings.mode = match (self.mode, &custom_text) {
            (Some(mode), _) => mode,
            (None, Some(_)) => TypingMode::Custom,
            (None, None) => settings.mode,
        };
        settings.custom_text = custom_text;
        settings
    }
}

fn init_logging(path: Option<&Path>) -> Option<WorkerGuard> {
    let path = path?;
    let file_name = path.file_name()?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    match tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(non_blocking)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Some(guard),
        Err(_) => None,
    }
}

/// Front-end actions a key press can map to
#[derive(Debug, Clone, PartialEq)]
enum Action {
    Quit,
    Restart,
    NewText,
    Settings(SettingsPatch),
    Type(Key),
    Ignore,
}

fn next_variant<T: ValueEnum + PartialEq + Copy>(current: T) -> T {
    let all = T::value_variants();
    match all.iter().position(|v| *v == current) {
        Some(idx) => all[(idx + 1) % all.len()],
        None => current,
    }
}

fn next_duration(current: u32) -> u32 {
    DURATION_OPTIONS
        .iter()
        .copied()
        .find(|&d| d > current)
        .unwrap_or(DURATION_OPTIONS[0])
}

fn action_for(key: &KeyEvent, settings: &TypingSettings) -> Action {
    if key.kind == KeyEventKind::Release {
        return Action::Ignore;
    }
    if key.code == KeyCode::Esc {
        return Action::Quit;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('r') => Action::Restart,
            KeyCode::Char('n') => Action::NewText,
            KeyCode::Char('t') => Action::Settings(SettingsPatch {
                duration: Some(next_duration(settings.duration)),
                ..SettingsPatch::default()
            }),
            KeyCode::Char('e') => {
                Action::Settings(SettingsPatch::mode(next_variant(settings.mode)))
            }
            KeyCode::Char('d') => Action::Settings(SettingsPatch {
                difficulty: Some(next_variant(settings.difficulty)),
                ..SettingsPatch::default()
            }),
            KeyCode::Char('l') => match settings.mode {
                TypingMode::Coder => Action::Settings(SettingsPatch {
                    programming_language: Some(next_variant(settings.programming_language)),
                    ..SettingsPatch::default()
                }),
                TypingMode::Chinese => Action::Settings(SettingsPatch {
                    chinese_style: Some(next_variant(settings.chinese_style)),
                    ..SettingsPatch::default()
                }),
                TypingMode::English | TypingMode::Custom => Action::Ignore,
            },
            KeyCode::Char('k') => Action::Settings(SettingsPatch::english_options(EnglishOptions {
                case_sensitive: !settings.english_options.case_sensitive,
                ..settings.english_options
            })),
            KeyCode::Char('p') => Action::Settings(SettingsPatch::english_options(EnglishOptions {
                ignore_punctuation: !settings.english_options.ignore_punctuation,
                ..settings.english_options
            })),
            _ => Action::Ignore,
        };
    }

    match runtime::engine_key(key) {
        Some(k) => Action::Type(k),
        None => Action::Ignore,
    }
}

pub struct App<S, C> {
    pub session: TypingSession<S, C>,
    /// Set once the user changed a setting worth persisting
    pub settings_changed: bool,
}

impl<S: TextSupplier, C: Clock> App<S, C> {
    pub fn new(session: TypingSession<S, C>) -> Self {
        Self {
            session,
            settings_changed: false,
        }
    }

    /// Apply an action; false when the app should quit
    fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::Restart => self.session.reset_test(),
            Action::NewText => self.session.init_test(true),
            Action::Settings(patch) => {
                self.session.update_settings(patch);
                self.settings_changed = true;
            }
            Action::Type(key) => {
                self.session.handle_key(key);
            }
            Action::Ignore => {}
        }
        true
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_file.as_deref());

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let config = store.load();
    let settings = cli.resolve_settings(&config, cli.custom_text()?);
    tracing::debug!(
        target: "config",
        path = %store.path().display(),
        ?settings,
        "resolved settings"
    );

    let supplier = match cli.seed {
        Some(seed) => LibrarySupplier::seeded(seed)?,
        None => LibrarySupplier::new()?,
    };
    let session = TypingSession::new(settings, supplier, SystemClock);

    if cli.print_text {
        println!("{}", session.state().display_text);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);
    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if app.settings_changed {
        if let Err(e) = store.save(&Config::from(app.session.settings())) {
            tracing::warn!(target: "config", error = %e, "could not save config");
        }
    }

    res
}

fn start_tui<B: Backend, S: TextSupplier, C: Clock>(
    terminal: &mut Terminal<B>,
    app: &mut App<S, C>,
) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), TickTimer::default());

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            SessionEvent::Tick => {
                app.session.tick();
            }
            SessionEvent::Resize => {}
            SessionEvent::Idle => continue,
            SessionEvent::Key(key) => {
                let action = action_for(&key, app.session.settings());
                if action == Action::Ignore {
                    continue;
                }
                if matches!(
                    action,
                    Action::Restart | Action::NewText | Action::Settings(_)
                ) {
                    // The old session's deadline must not tick the new one
                    runner.timer_mut().cancel();
                }
                if !app.apply(action) {
                    break;
                }
            }
        }

        runner.timer_mut().follow(app.session.status(), Instant::now());
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keystride::{clock::ManualClock, supplier::FixedSupplier, SessionStatus};

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "keystride",
            "-m",
            "coder",
            "-d",
            "hard",
            "-s",
            "30",
            "-l",
            "rust",
            "--no-backspace",
            "--seed",
            "7",
        ])
        .unwrap();

        assert_eq!(cli.mode, Some(TypingMode::Coder));
        assert_eq!(cli.difficulty, Some(Difficulty::Hard));
        assert_eq!(cli.duration, Some(30));
        assert_eq!(cli.language, Some(ProgrammingLanguage::Rust));
        assert!(cli.no_backspace);
        assert_eq!(cli.seed, Some(7));
    }

    #[test]
    fn test_cli_text_conflicts_with_text_file() {
        let res = Cli::try_parse_from(["keystride", "-p", "hi", "--text-file", "x.txt"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["keystride", "--mode", "klingon"]).is_err());
    }

    #[test]
    fn test_resolve_settings_overrides_config() {
        let config = Config {
            duration: 15,
            mode: TypingMode::Chinese,
            ..Config::default()
        };
        let cli = Cli {
            duration: Some(120),
            case_sensitive: true,
            ..Cli::default()
        };

        let settings = cli.resolve_settings(&config, None);
        assert_eq!(settings.duration, 120);
        assert_eq!(settings.mode, TypingMode::Chinese);
        assert!(settings.english_options.case_sensitive);
        assert!(settings.typing_options.allow_backspace);
    }

    #[test]
    fn test_custom_text_switches_mode() {
        let cli = Cli::default();
        let settings = cli.resolve_settings(&Config::default(), Some("abc".into()));
        assert_eq!(settings.mode, TypingMode::Custom);
        assert_eq!(settings.custom_text.as_deref(), Some("abc"));

        let cli = Cli {
            mode: Some(TypingMode::English),
            ..Cli::default()
        };
        let settings = cli.resolve_settings(&Config::default(), Some("abc".into()));
        assert_eq!(settings.mode, TypingMode::English);
    }

    #[test]
    fn test_custom_text_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.txt");
        fs::write(&path, "from a file").unwrap();
        let cli = Cli {
            text_file: Some(path),
            ..Cli::default()
        };

        assert_eq!(cli.custom_text().unwrap().as_deref(), Some("from a file"));
    }

    #[test]
    fn test_next_duration_cycles() {
        assert_eq!(next_duration(15), 30);
        assert_eq!(next_duration(60), 120);
        assert_eq!(next_duration(120), 15);
        assert_eq!(next_duration(45), 60);
    }

    #[test]
    fn test_next_variant_wraps() {
        assert_eq!(next_variant(TypingMode::English), TypingMode::Chinese);
        assert_eq!(next_variant(TypingMode::Custom), TypingMode::English);
        assert_eq!(next_variant(Difficulty::Hard), Difficulty::Easy);
    }

    #[test]
    fn test_action_for_keys() {
        let settings = TypingSettings::default();

        assert_eq!(action_for(&press(KeyCode::Esc), &settings), Action::Quit);
        assert_eq!(action_for(&ctrl('c'), &settings), Action::Quit);
        assert_eq!(action_for(&ctrl('r'), &settings), Action::Restart);
        assert_eq!(action_for(&ctrl('n'), &settings), Action::NewText);
        assert_eq!(
            action_for(&press(KeyCode::Char('a')), &settings),
            Action::Type(Key::Char('a'))
        );
        assert_eq!(
            action_for(&press(KeyCode::Enter), &settings),
            Action::Type(Key::Enter)
        );
        assert_eq!(action_for(&press(KeyCode::Left), &settings), Action::Ignore);
        assert_eq!(action_for(&ctrl('l'), &settings), Action::Ignore);
        assert_eq!(
            action_for(&ctrl('e'), &settings),
            Action::Settings(SettingsPatch::mode(TypingMode::Chinese))
        );
    }

    #[test]
    fn test_action_for_language_depends_on_mode() {
        let settings = TypingSettings {
            mode: TypingMode::Coder,
            ..TypingSettings::default()
        };
        assert_eq!(
            action_for(&ctrl('l'), &settings),
            Action::Settings(SettingsPatch {
                programming_language: Some(ProgrammingLanguage::Javascript),
                ..SettingsPatch::default()
            })
        );
    }

    #[test]
    fn test_app_apply() {
        let session = TypingSession::new(
            TypingSettings::default(),
            FixedSupplier::new("hello world"),
            ManualClock::new(0),
        );
        let mut app = App::new(session);

        assert!(app.apply(Action::Type(Key::Char('h'))));
        assert_eq!(app.session.status(), SessionStatus::Running);
        assert!(!app.settings_changed);

        let action = action_for(&ctrl('d'), app.session.settings());
        assert!(app.apply(action));
        assert!(app.settings_changed);
        assert_eq!(app.session.settings().difficulty, Difficulty::Hard);
        assert_eq!(app.session.status(), SessionStatus::Idle);

        assert!(!app.apply(Action::Quit));
    }
}
