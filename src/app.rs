use std::mem;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::clock::FrameClock;
use crate::game::{Command, FrameInput, GameSession, Held};

/// Without release events, a key counts as held this long after its last
/// press or auto-repeat.
pub const HOLD_WINDOW_MS: u64 = 120;

#[derive(Clone, Copy, Default)]
struct KeyLatch {
    down_at: Option<u64>,
}

impl KeyLatch {
    fn is_held(&self, now: u64, window: Option<u64>) -> bool {
        match (self.down_at, window) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(t), Some(w)) => now.saturating_sub(t) <= w,
        }
    }
}

/// Front-end glue: turns terminal key events into per-frame input for the
/// session and drives it from the frame clock.
pub struct App {
    pub session: GameSession,
    pub should_quit: bool,
    clock: FrameClock,
    /// `None` when the terminal reports key releases.
    hold_window: Option<u64>,
    // left, right, up, down, fire
    latches: [KeyLatch; 5],
    pressed: Vec<Command>,
}

impl App {
    pub fn new(session: GameSession, release_events: bool) -> Self {
        Self {
            session,
            should_quit: false,
            clock: FrameClock::new(),
            hold_window: (!release_events).then_some(HOLD_WINDOW_MS),
            latches: [KeyLatch::default(); 5],
            pressed: Vec::new(),
        }
    }

    pub fn on_tick(&mut self) {
        let now = self.clock.now_ms();
        self.tick_at(now);
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        let now = self.clock.now_ms();
        self.key_at(key, now);
    }

    fn tick_at(&mut self, now: u64) {
        let input = FrameInput {
            held: self.held(now),
            pressed: mem::take(&mut self.pressed),
        };
        self.session.update(now, &input);
        if self.session.wants_quit() {
            self.should_quit = true;
        }
    }

    fn key_at(&mut self, key: KeyEvent, now: u64) {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        let Some(command) = command_for(key.code) else {
            return;
        };
        let window = self.hold_window;

        match key.kind {
            KeyEventKind::Press => {
                // Auto-repeat arrives as presses on terminals without
                // release events; only the first one is a fresh press
                let repeat = window.is_some()
                    && latch_slot(command).is_some_and(|i| self.latches[i].is_held(now, window));
                if !repeat {
                    self.pressed.push(command);
                }
                if let Some(i) = latch_slot(command) {
                    self.latches[i].down_at = Some(now);
                }
            }
            KeyEventKind::Repeat => {
                if let Some(i) = latch_slot(command) {
                    self.latches[i].down_at = Some(now);
                }
            }
            KeyEventKind::Release => {
                if let Some(i) = latch_slot(command) {
                    self.latches[i].down_at = None;
                }
            }
        }
    }

    fn held(&self, now: u64) -> Held {
        let w = self.hold_window;
        let [left, right, up, down, fire] = self.latches;
        Held {
            left: left.is_held(now, w),
            right: right.is_held(now, w),
            up: up.is_held(now, w),
            down: down.is_held(now, w),
            fire: fire.is_held(now, w),
        }
    }
}

fn command_for(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Command::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Command::Right),
        KeyCode::Up => Some(Command::Up),
        KeyCode::Down => Some(Command::Down),
        KeyCode::Char(' ') => Some(Command::Fire),
        KeyCode::Enter => Some(Command::Confirm),
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::ResetScores),
        _ => None,
    }
}

fn latch_slot(command: Command) -> Option<usize> {
    match command {
        Command::Left => Some(0),
        Command::Right => Some(1),
        Command::Up => Some(2),
        Command::Down => Some(3),
        Command::Fire => Some(4),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::LogAudio;
    use crate::config::GameConfig;
    use crate::game::GameState;
    use crate::scores::{HighScores, MemoryScoreStore, MAX_STORED};
    use crossterm::event::KeyEventState;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn app(release_events: bool) -> App {
        let config = GameConfig {
            invader_fire_chance: 0.0,
            ..GameConfig::default()
        };
        let scores = HighScores::load(Box::new(MemoryScoreStore::new()), MAX_STORED);
        let session = GameSession::new(
            config,
            scores,
            Box::new(LogAudio::new()),
            StdRng::seed_from_u64(42),
        );
        App::new(session, release_events)
    }

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn enter_starts_game() {
        let mut app = app(false);
        app.key_at(key(KeyCode::Enter, KeyEventKind::Press), 0);
        app.tick_at(16);
        assert_eq!(app.session.state(), GameState::Playing);
    }

    #[test]
    fn escape_quits_through_session() {
        let mut app = app(false);
        app.key_at(key(KeyCode::Esc, KeyEventKind::Press), 0);
        assert!(!app.should_quit);
        app.tick_at(16);
        assert!(app.should_quit);
    }

    #[test]
    fn ctrl_c_quits_immediately() {
        let mut app = app(false);
        let mut ev = key(KeyCode::Char('c'), KeyEventKind::Press);
        ev.modifiers = KeyModifiers::CONTROL;
        app.key_at(ev, 0);
        assert!(app.should_quit);
    }

    #[test]
    fn hold_window_expires_without_releases() {
        let mut app = app(false);
        app.key_at(key(KeyCode::Left, KeyEventKind::Press), 100);
        assert!(app.held(200).left);
        assert!(app.held(220).left);
        assert!(!app.held(221).left);
    }

    #[test]
    fn autorepeat_presses_are_not_fresh() {
        let mut app = app(false);
        app.key_at(key(KeyCode::Down, KeyEventKind::Press), 100);
        app.key_at(key(KeyCode::Down, KeyEventKind::Press), 130);
        assert_eq!(app.pressed, vec![Command::Down]);
    }

    #[test]
    fn release_events_end_the_hold() {
        let mut app = app(true);
        app.key_at(key(KeyCode::Char(' '), KeyEventKind::Press), 100);
        assert!(app.held(5000).fire);
        app.key_at(key(KeyCode::Char(' '), KeyEventKind::Release), 5000);
        assert!(!app.held(5001).fire);
    }

    #[test]
    fn held_left_moves_the_player() {
        let mut app = app(true);
        app.key_at(key(KeyCode::Enter, KeyEventKind::Press), 0);
        app.tick_at(16);
        let x = app.session.player().x;
        app.key_at(key(KeyCode::Char('a'), KeyEventKind::Press), 20);
        app.tick_at(32);
        app.tick_at(48);
        assert_eq!(app.session.player().x, x - 10);
    }
}
