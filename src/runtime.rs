use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind};

use crate::session::{Key, SessionStatus};

/// Interval between metric ticks while a session runs
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Unified event type consumed by the front-end loop
#[derive(Clone, Debug)]
pub enum SessionEvent {
    Key(KeyEvent),
    Resize,
    /// The armed one-second deadline elapsed
    Tick,
    /// Nothing happened within the wait period
    Idle,
}

/// Where the front-end loop gets key and resize events
pub trait SessionEventSource: Send + 'static {
    /// Wait at most `timeout` for the next event
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<SessionEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(SessionEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(SessionEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed event source for tests and headless drivers
pub struct TestEventSource {
    rx: Receiver<SessionEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<SessionEvent>) -> Self {
        Self { rx }
    }
}

impl SessionEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// The single per-session tick deadline.
///
/// Arming replaces any previous deadline, so at most one timer is ever live.
/// `Runner` polls it on the same thread that handles events, so a cancelled
/// deadline can never deliver a late tick.
#[derive(Debug, Clone)]
pub struct TickTimer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

impl TickTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the deadline; `None` when disarmed
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// True if the deadline has passed; the next one is scheduled one
    /// interval after the previous deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                let mut next = deadline + self.interval;
                if next <= now {
                    // Fell behind by more than one interval: don't burst
                    next = now + self.interval;
                }
                self.deadline = Some(next);
                true
            }
            _ => false,
        }
    }

    /// Arm when the session runs, cancel otherwise
    pub fn follow(&mut self, status: SessionStatus, now: Instant) {
        match status {
            SessionStatus::Running if !self.is_armed() => {
                self.arm(now);
            }
            SessionStatus::Running => {}
            SessionStatus::Idle | SessionStatus::Finished => self.cancel(),
        }
    }
}

/// Steps the front-end one event or tick at a time
pub struct Runner<E: SessionEventSource> {
    event_source: E,
    timer: TickTimer,
    idle_wait: Duration,
}

impl<E: SessionEventSource> Runner<E> {
    pub fn new(event_source: E, timer: TickTimer) -> Self {
        Self {
            event_source,
            timer,
            idle_wait: TICK_INTERVAL,
        }
    }

    /// How long `step` waits for input while the timer is disarmed
    pub fn with_idle_wait(mut self, idle_wait: Duration) -> Self {
        self.idle_wait = idle_wait;
        self
    }

    pub fn timer(&self) -> &TickTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut TickTimer {
        &mut self.timer
    }

    /// Blocks until the next event or the armed deadline.
    /// A due deadline yields `Tick`; a plain timeout yields `Idle`.
    pub fn step(&mut self) -> SessionEvent {
        let now = Instant::now();
        if self.timer.poll(now) {
            return SessionEvent::Tick;
        }

        let wait = self.timer.remaining(now).unwrap_or(self.idle_wait);
        match self.event_source.recv_timeout(wait) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.after_wait(),
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(wait);
                self.after_wait()
            }
        }
    }

    fn after_wait(&mut self) -> SessionEvent {
        if self.timer.poll(Instant::now()) {
            SessionEvent::Tick
        } else {
            SessionEvent::Idle
        }
    }
}

/// Map a terminal key press onto an engine key; releases and other keys map to `None`
pub fn engine_key(key: &KeyEvent) -> Option<Key> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::Backspace => Some(Key::Backspace),
        _ => None,
    }
}
