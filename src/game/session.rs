//! Screen flow and per-frame simulation.
//!
//! `GameSession` owns every entity, the score table, the audio sink and the
//! random source. The front-end samples the clock once per frame and calls
//! [`GameSession::update`]; everything else is read-only accessors for the
//! renderer.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

use crate::audio::{Audio, Sound};
use crate::config::GameConfig;
use crate::game::barrier::Barrier;
use crate::game::collision::{self, Battlefield, Hit};
use crate::game::entities::{Bullet, Entity, Explosion, MysteryShip, Player};
use crate::game::formation::InvaderFormation;
use crate::game::input::{Command, FrameInput, Held};
use crate::game::name_entry::NameEntry;
use crate::geometry::{Bounds, FIELD_MARGIN_X};
use crate::scores::HighScores;

pub const BARRIER_COUNT: usize = 4;
const BARRIER_Y: i32 = 400;
const BARRIER_SPACING: i32 = 140;
const MARCH_NOTES: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Attract,
    Playing,
    /// Player just lost a life; the world is frozen until the respawn.
    RespawnPause,
    LevelTransition,
    GameOver,
    HighScoreEntry,
    HallOfFame,
}

pub struct GameSession {
    config: GameConfig,
    field: Bounds,
    state: GameState,
    state_entered: u64,
    now: u64,
    score: u32,
    high_score: u32,
    level: u32,
    player: Player,
    formation: InvaderFormation,
    barriers: Vec<Barrier>,
    mystery: MysteryShip,
    mystery_due: u64,
    player_bullets: Vec<Bullet>,
    invader_bullets: Vec<Bullet>,
    explosions: Vec<Explosion>,
    march_note: u8,
    name_entry: NameEntry,
    scores: HighScores,
    audio: Box<dyn Audio>,
    rng: StdRng,
    banner_offset: u64,
    quit: bool,
}

impl GameSession {
    pub fn new(config: GameConfig, scores: HighScores, audio: Box<dyn Audio>, rng: StdRng) -> Self {
        let formation = InvaderFormation::new(&config, config.level_start_delay(1));
        let high_score = scores.top_score();
        GameSession {
            field: Bounds::play_field(),
            state: GameState::Attract,
            state_entered: 0,
            now: 0,
            score: 0,
            high_score,
            level: 1,
            player: Player::new(&config),
            formation,
            barriers: build_barriers(),
            mystery: MysteryShip::new(config.mystery_points.clone()),
            mystery_due: 0,
            player_bullets: Vec::new(),
            invader_bullets: Vec::new(),
            explosions: Vec::new(),
            march_note: 0,
            name_entry: NameEntry::new(config.name_entry_debounce_ms),
            scores,
            audio,
            rng,
            banner_offset: 0,
            quit: false,
            config,
        }
    }

    /// Advance one frame. `now` is the frame's millisecond timestamp and
    /// must never go backwards.
    pub fn update(&mut self, now: u64, input: &FrameInput) {
        self.now = now;
        if input.pressed(Command::Quit) {
            info!(state = ?self.state, "quit requested");
            self.quit = true;
            return;
        }

        match self.state {
            GameState::Attract => {
                if input.pressed(Command::Confirm) {
                    self.start_new_game(now);
                }
            }
            GameState::Playing => self.update_playing(now, input),
            GameState::RespawnPause => {
                if self.state_elapsed() >= self.config.respawn_pause_ms {
                    self.player.respawn();
                    self.enter(GameState::Playing, now);
                }
            }
            GameState::LevelTransition => {
                if self.state_elapsed() > self.config.level_transition_ms {
                    self.next_level(now);
                }
            }
            GameState::GameOver => {
                if input.pressed(Command::Confirm) && self.can_restart() {
                    self.start_new_game(now);
                }
            }
            GameState::HighScoreEntry => self.update_name_entry(now, input),
            GameState::HallOfFame => {
                self.banner_offset = self.banner_offset.wrapping_add(1);
                if input.pressed(Command::ResetScores) {
                    self.scores.reset();
                    self.high_score = self.scores.top_score();
                } else if input.pressed(Command::Confirm) {
                    self.start_new_game(now);
                }
            }
        }

        let lifetime = self.config.explosion_lifetime_ms;
        self.explosions.retain(|e| !e.is_expired(now, lifetime));
    }

    fn update_playing(&mut self, now: u64, input: &FrameInput) {
        let keys = input.directions();
        if self.player.is_alive() {
            if keys.left {
                self.player.steer(-1, &self.field);
            }
            if keys.right {
                self.player.steer(1, &self.field);
            }
            if keys.fire && self.player.can_fire(now) {
                self.player_bullets.push(self.player.fire(now));
                self.audio.play(Sound::PlayerShoot);
            }
        }

        for bullet in self.player_bullets.iter_mut().chain(self.invader_bullets.iter_mut()) {
            bullet.update();
        }
        self.player_bullets.retain(Bullet::is_active);
        self.invader_bullets.retain(Bullet::is_active);

        if self.formation.step(now, &self.field).moved() {
            self.audio.play(Sound::InvaderMovement(self.march_note));
            self.march_note = (self.march_note + 1) % MARCH_NOTES;
        }

        if self.formation.reached(self.player.y) {
            info!(level = self.level, "invaders landed");
            self.end_game(now);
            return;
        }

        if let Some(bullet) = self.formation.try_fire(&mut self.rng) {
            self.invader_bullets.push(bullet);
            self.audio.play(Sound::InvaderShoot);
        }

        self.update_mystery(now);

        let hits = collision::resolve(
            Battlefield {
                player: &mut self.player,
                formation: &mut self.formation,
                barriers: &mut self.barriers,
                mystery: &mut self.mystery,
                player_bullets: &mut self.player_bullets,
                invader_bullets: &mut self.invader_bullets,
            },
            &mut self.rng,
        );
        for hit in hits {
            self.apply_hit(hit, now);
        }

        if self.state == GameState::Playing && self.formation.all_dead() {
            self.recall_mystery();
            info!(level = self.level, score = self.score, "wave cleared");
            self.enter(GameState::LevelTransition, now);
        }
    }

    fn update_mystery(&mut self, now: u64) {
        if self.mystery.is_active() {
            self.mystery.update();
            if !self.mystery.is_active() {
                self.audio.stop(Sound::MysteryShip);
            }
        } else if now >= self.mystery_due {
            let direction = if self.rng.gen_bool(0.5) { 1 } else { -1 };
            self.mystery.activate(direction);
            self.audio.play(Sound::MysteryShip);
            self.schedule_mystery(now);
            debug!(direction, "mystery ship launched");
        }
    }

    fn schedule_mystery(&mut self, now: u64) {
        let lo = self.config.mystery_min_delay_ms;
        let hi = self.config.mystery_max_delay_ms.max(lo);
        self.mystery_due = now + self.rng.gen_range(lo..=hi);
    }

    fn recall_mystery(&mut self) {
        if self.mystery.is_active() {
            self.mystery.deactivate();
            self.audio.stop(Sound::MysteryShip);
        }
    }

    fn apply_hit(&mut self, hit: Hit, now: u64) {
        match hit {
            Hit::MysteryShip { points, x, y } => {
                self.score = self.score.saturating_add(points);
                self.explosions.push(Explosion { x, y, started: now });
                self.audio.stop(Sound::MysteryShip);
                self.audio.play(Sound::MysteryShipHit);
                debug!(points, score = self.score, "mystery ship hit");
            }
            Hit::Invader { index, points, x, y } => {
                self.score = self.score.saturating_add(points);
                self.explosions.push(Explosion { x, y, started: now });
                self.audio.play(Sound::InvaderExplosion);
                debug!(index, points, score = self.score, "invader hit");
            }
            Hit::Barrier { barrier, by } => {
                debug!(barrier, ?by, "barrier hit");
            }
            Hit::Player { x, y, lives_left } => {
                self.explosions.push(Explosion { x, y, started: now });
                self.audio.play(Sound::PlayerExplosion);
                if lives_left == 0 {
                    self.end_game(now);
                } else {
                    info!(lives_left, "player hit");
                    self.enter(GameState::RespawnPause, now);
                }
            }
        }
    }

    fn end_game(&mut self, now: u64) {
        self.recall_mystery();
        self.high_score = self.high_score.max(self.score);
        info!(score = self.score, level = self.level, "game over");
        if self.scores.is_high_score(self.score) {
            self.name_entry = NameEntry::new(self.config.name_entry_debounce_ms);
            self.enter(GameState::HighScoreEntry, now);
        } else {
            self.audio.play(Sound::GameOver);
            self.enter(GameState::GameOver, now);
        }
    }

    fn update_name_entry(&mut self, now: u64, input: &FrameInput) {
        if input.pressed(Command::Confirm) || input.pressed(Command::Fire) {
            let name = self.name_entry.name();
            self.scores.add(&name, self.score, self.level);
            self.banner_offset = 0;
            self.enter(GameState::HallOfFame, now);
            return;
        }

        let fresh = Held {
            left: input.pressed(Command::Left),
            right: input.pressed(Command::Right),
            up: input.pressed(Command::Up),
            down: input.pressed(Command::Down),
            fire: false,
        };
        if fresh != Held::default() {
            self.name_entry.edit(now, &fresh);
        } else {
            self.name_entry.apply(now, &input.held);
        }
    }

    fn start_new_game(&mut self, now: u64) {
        self.score = 0;
        self.level = 1;
        self.player = Player::new(&self.config);
        self.formation = InvaderFormation::new(&self.config, self.config.level_start_delay(1));
        self.formation.restart_clock(now);
        self.barriers = build_barriers();
        self.mystery = MysteryShip::new(self.config.mystery_points.clone());
        self.player_bullets.clear();
        self.invader_bullets.clear();
        self.explosions.clear();
        self.march_note = 0;
        self.schedule_mystery(now);
        self.enter(GameState::Playing, now);
    }

    /// Fresh, faster formation; lives, score and barrier damage carry over.
    fn next_level(&mut self, now: u64) {
        self.level += 1;
        self.player_bullets.clear();
        self.invader_bullets.clear();
        let start_delay = self.config.level_start_delay(self.level);
        self.formation = InvaderFormation::new(&self.config, start_delay);
        self.formation.restart_clock(now);
        self.player.respawn();
        self.schedule_mystery(now);
        info!(level = self.level, start_delay, "next level");
        self.enter(GameState::Playing, now);
    }

    fn enter(&mut self, state: GameState, now: u64) {
        info!(from = ?self.state, to = ?state, "state change");
        self.state = state;
        self.state_entered = now;
    }

    // ── Read-only view for the renderer ──────────────────────────────────

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Milliseconds spent in the current state as of the last frame.
    pub fn state_elapsed(&self) -> u64 {
        self.now.saturating_sub(self.state_entered)
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Whether the game-over screen has been up long enough to restart.
    pub fn can_restart(&self) -> bool {
        self.state == GameState::GameOver && self.state_elapsed() > self.config.game_over_lockout_ms
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lives(&self) -> u32 {
        self.player.lives()
    }

    pub fn field(&self) -> &Bounds {
        &self.field
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn formation(&self) -> &InvaderFormation {
        &self.formation
    }

    pub fn barriers(&self) -> &[Barrier] {
        &self.barriers
    }

    pub fn mystery(&self) -> &MysteryShip {
        &self.mystery
    }

    pub fn player_bullets(&self) -> &[Bullet] {
        &self.player_bullets
    }

    pub fn invader_bullets(&self) -> &[Bullet] {
        &self.invader_bullets
    }

    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    pub fn name_entry(&self) -> &NameEntry {
        &self.name_entry
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.scores
    }

    pub fn banner_offset(&self) -> u64 {
        self.banner_offset
    }

    pub fn wants_quit(&self) -> bool {
        self.quit
    }
}

fn build_barriers() -> Vec<Barrier> {
    (0..BARRIER_COUNT as i32)
        .map(|i| Barrier::new(FIELD_MARGIN_X + BARRIER_SPACING * (i + 1) - Barrier::WIDTH / 2, BARRIER_Y))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rand::SeedableRng;

    use super::*;
    use crate::game::entities::{BulletKind, Invader};
    use crate::scores::{default_entries, MemoryScoreStore, MAX_STORED};

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<(bool, Sound)>>>);

    impl Audio for Recorder {
        fn play(&mut self, sound: Sound) {
            self.0.borrow_mut().push((true, sound));
        }

        fn stop(&mut self, sound: Sound) {
            self.0.borrow_mut().push((false, sound));
        }
    }

    impl Recorder {
        fn played(&self) -> Vec<Sound> {
            self.0.borrow().iter().filter(|(p, _)| *p).map(|(_, s)| *s).collect()
        }

        fn stopped(&self, sound: Sound) -> bool {
            self.0.borrow().iter().any(|&(p, s)| !p && s == sound)
        }
    }

    fn quiet_config() -> GameConfig {
        GameConfig {
            invader_fire_chance: 0.0,
            mystery_min_delay_ms: 1_000_000,
            mystery_max_delay_ms: 1_000_000,
            ..GameConfig::default()
        }
    }

    fn session_with(config: GameConfig, store: MemoryScoreStore) -> (GameSession, Recorder) {
        let recorder = Recorder::default();
        let scores = HighScores::load(Box::new(store), MAX_STORED);
        let session = GameSession::new(
            config,
            scores,
            Box::new(recorder.clone()),
            StdRng::seed_from_u64(42),
        );
        (session, recorder)
    }

    fn playing() -> (GameSession, Recorder) {
        let (mut session, recorder) = session_with(quiet_config(), MemoryScoreStore::new());
        session.update(0, &press(Command::Confirm));
        (session, recorder)
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn press(command: Command) -> FrameInput {
        FrameInput {
            pressed: vec![command],
            ..FrameInput::default()
        }
    }

    /// Drop an invader bullet right on top of the player.
    fn shoot_player(session: &mut GameSession) {
        let (x, y) = (session.player.x, session.player.y);
        session
            .invader_bullets
            .push(Bullet::new(BulletKind::Invader, x + 10, y));
    }

    #[test]
    fn starts_in_attract_and_confirm_starts_play() {
        let (mut session, _) = session_with(quiet_config(), MemoryScoreStore::new());
        assert_eq!(session.state(), GameState::Attract);
        session.update(10, &press(Command::Fire));
        assert_eq!(session.state(), GameState::Attract);
        session.update(20, &press(Command::Confirm));
        assert_eq!(session.state(), GameState::Playing);
        assert_eq!(session.lives(), 3);
        assert_eq!(session.level(), 1);
        assert_eq!(session.formation().alive_count(), 55);
        assert_eq!(session.barriers().len(), BARRIER_COUNT);
        assert_eq!(session.barriers()[0].x, 150);
        assert_eq!(session.barriers()[3].x, 570);
    }

    #[test]
    fn high_score_seeded_from_table() {
        let (session, _) = session_with(quiet_config(), MemoryScoreStore::new());
        assert_eq!(session.high_score(), default_entries()[0].score);
    }

    #[test]
    fn quit_is_honoured_in_every_state() {
        let (mut session, _) = playing();
        session.state = GameState::RespawnPause;
        session.update(5, &press(Command::Quit));
        assert!(session.wants_quit());
    }

    #[test]
    fn lives_run_out_into_game_over() {
        let (mut session, recorder) = playing();

        shoot_player(&mut session);
        session.update(100, &idle());
        assert_eq!(session.state(), GameState::RespawnPause);
        assert_eq!(session.lives(), 2);

        // Frozen while paused
        session.update(600, &press(Command::Fire));
        assert!(session.player_bullets().is_empty());
        assert!(!session.player().is_alive());

        session.update(1100, &idle());
        assert_eq!(session.state(), GameState::Playing);
        assert!(session.player().is_alive());

        shoot_player(&mut session);
        session.update(1200, &idle());
        assert_eq!(session.lives(), 1);
        session.update(2200, &idle());

        shoot_player(&mut session);
        session.update(2300, &idle());
        assert_eq!(session.lives(), 0);
        // Score 0 cannot beat the seeded table
        assert_eq!(session.state(), GameState::GameOver);
        assert!(recorder.played().contains(&Sound::GameOver));
        assert_eq!(
            recorder.played().iter().filter(|s| **s == Sound::PlayerExplosion).count(),
            3
        );
    }

    #[test]
    fn last_life_with_qualifying_score_goes_to_name_entry() {
        let (mut session, recorder) =
            session_with(quiet_config(), MemoryScoreStore::with_entries(Vec::new()));
        session.update(0, &press(Command::Confirm));

        for (hit_at, lives_left) in [(100, 2), (1200, 1), (2300, 0)] {
            shoot_player(&mut session);
            session.update(hit_at, &idle());
            assert_eq!(session.lives(), lives_left);
            if lives_left > 0 {
                assert_eq!(session.state(), GameState::RespawnPause);
                session.update(hit_at + 1000, &idle());
                assert_eq!(session.state(), GameState::Playing);
            }
        }

        // An empty table takes any score
        assert_eq!(session.state(), GameState::HighScoreEntry);
        assert_eq!(session.name_entry().name(), "AAAAA");
        assert!(!recorder.played().contains(&Sound::GameOver));
    }

    #[test]
    fn game_over_restart_is_locked_out() {
        let (mut session, _) = playing();
        session.end_game(1000);
        assert_eq!(session.state(), GameState::GameOver);
        session.update(2500, &press(Command::Confirm));
        assert_eq!(session.state(), GameState::GameOver);
        session.update(3001, &press(Command::Confirm));
        assert_eq!(session.state(), GameState::Playing);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn qualifying_score_goes_to_name_entry_then_hall_of_fame() {
        let (mut session, recorder) =
            session_with(quiet_config(), MemoryScoreStore::with_entries(Vec::new()));
        session.update(0, &press(Command::Confirm));
        session.score = 500;
        session.end_game(100);
        assert_eq!(session.state(), GameState::HighScoreEntry);
        assert!(!recorder.played().contains(&Sound::GameOver));

        session.update(200, &press(Command::Down));
        session.update(210, &press(Command::Right));
        session.update(220, &press(Command::Up));
        assert_eq!(session.name_entry().name(), "B.AAA");

        session.update(300, &press(Command::Confirm));
        assert_eq!(session.state(), GameState::HallOfFame);
        let top = &session.high_scores().entries()[0];
        assert_eq!(top.name, "B.AAA");
        assert_eq!(top.score, 500);
        assert_eq!(top.level, 1);
        assert_eq!(session.high_score(), 500);
    }

    #[test]
    fn hall_of_fame_reset_and_restart() {
        let (mut session, _) =
            session_with(quiet_config(), MemoryScoreStore::with_entries(Vec::new()));
        session.update(0, &press(Command::Confirm));
        session.score = 10;
        session.end_game(10);
        session.update(20, &press(Command::Fire));
        assert_eq!(session.state(), GameState::HallOfFame);

        session.update(30, &idle());
        session.update(40, &idle());
        assert_eq!(session.banner_offset(), 2);

        assert_eq!(session.high_score(), 10);
        session.update(50, &press(Command::ResetScores));
        assert_eq!(session.high_scores().entries(), default_entries().as_slice());
        assert_eq!(session.high_score(), default_entries()[0].score);

        session.update(60, &press(Command::Confirm));
        assert_eq!(session.state(), GameState::Playing);
    }

    #[test]
    fn clearing_the_wave_advances_the_level() {
        let (mut session, _) = playing();
        let config = quiet_config();
        session.formation =
            InvaderFormation::from_invaders(vec![Invader::new(300, 200, 0, 0)], &config, 1000);
        session.formation.restart_clock(0);
        session
            .player_bullets
            .push(Bullet::new(BulletKind::Player, 310, 215));
        session.update(50, &idle());
        assert_eq!(session.score(), 30);
        assert_eq!(session.state(), GameState::LevelTransition);
        assert_eq!(session.explosions().len(), 1);

        session.update(2050, &idle());
        assert_eq!(session.state(), GameState::LevelTransition);
        session.update(2051, &idle());
        assert_eq!(session.state(), GameState::Playing);
        assert_eq!(session.level(), 2);
        assert_eq!(session.formation().alive_count(), 55);
        assert_eq!(session.formation().move_delay(), 800);
        assert_eq!(session.lives(), 3);
        assert_eq!(session.score(), 30);
    }

    #[test]
    fn invaders_reaching_the_player_end_the_game() {
        let (mut session, _) = playing();
        let config = quiet_config();
        let y = session.player.y - Invader::HEIGHT;
        session.formation =
            InvaderFormation::from_invaders(vec![Invader::new(300, y, 4, 0)], &config, 1000);
        session.update(10, &idle());
        assert_eq!(session.state(), GameState::GameOver);
    }

    #[test]
    fn march_notes_cycle_through_four_variants() {
        let (mut session, recorder) = playing();
        for t in 1..=5 {
            session.update(t * 1000, &idle());
        }
        let notes: Vec<Sound> = recorder
            .played()
            .into_iter()
            .filter(|s| matches!(s, Sound::InvaderMovement(_)))
            .collect();
        assert_eq!(
            notes,
            vec![
                Sound::InvaderMovement(0),
                Sound::InvaderMovement(1),
                Sound::InvaderMovement(2),
                Sound::InvaderMovement(3),
                Sound::InvaderMovement(0),
            ]
        );
    }

    #[test]
    fn mystery_ship_loop_starts_and_stops() {
        let config = GameConfig {
            mystery_min_delay_ms: 100,
            mystery_max_delay_ms: 100,
            ..quiet_config()
        };
        let (mut session, recorder) = session_with(config, MemoryScoreStore::new());
        session.update(0, &press(Command::Confirm));
        session.update(100, &idle());
        assert!(session.mystery().is_active());
        assert!(recorder.played().contains(&Sound::MysteryShip));

        session.mystery.x = if session.mystery().direction() > 0 {
            crate::geometry::SCREEN_WIDTH
        } else {
            -MysteryShip::WIDTH
        };
        session.update(116, &idle());
        assert!(!session.mystery().is_active());
        assert!(recorder.stopped(Sound::MysteryShip));
    }

    #[test]
    fn fire_respects_cooldown() {
        let (mut session, recorder) = playing();
        let fire = FrameInput {
            held: Held { fire: true, ..Held::default() },
            pressed: Vec::new(),
        };
        session.update(100, &fire);
        session.update(400, &fire);
        assert_eq!(session.player_bullets().len(), 1);
        session.update(601, &fire);
        assert_eq!(session.player_bullets().len(), 2);
        assert_eq!(
            recorder.played().iter().filter(|s| **s == Sound::PlayerShoot).count(),
            2
        );
    }

    #[test]
    fn explosions_expire_in_any_state() {
        let (mut session, _) = session_with(quiet_config(), MemoryScoreStore::new());
        session.explosions.push(Explosion { x: 0, y: 0, started: 100 });
        session.update(600, &idle());
        assert_eq!(session.explosions().len(), 1);
        session.update(601, &idle());
        assert!(session.explosions().is_empty());
    }
}
