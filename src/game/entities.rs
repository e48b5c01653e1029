use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::GameConfig;
use crate::geometry::{Bounds, FIELD_MARGIN_Y, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Shared capability set of everything that moves and can be hit.
pub trait Entity {
    /// Advance one frame.
    fn update(&mut self) {}
    /// Hit box, or `None` while dead or inactive.
    fn collision_bounds(&self) -> Option<Bounds>;
}

// ── Player ───────────────────────────────────────────────────────────────

pub struct Player {
    pub x: i32,
    pub y: i32,
    speed: i32,
    lives: u32,
    alive: bool,
    last_shot: Option<u64>,
    cooldown_ms: u64,
}

impl Player {
    pub const WIDTH: i32 = 60;
    pub const HEIGHT: i32 = 30;

    pub fn spawn_point() -> (i32, i32) {
        (
            SCREEN_WIDTH / 2 - Self::WIDTH / 2,
            SCREEN_HEIGHT - FIELD_MARGIN_Y - Self::HEIGHT - 20,
        )
    }

    pub fn new(config: &GameConfig) -> Self {
        let (x, y) = Self::spawn_point();
        Player {
            x,
            y,
            speed: config.player_speed,
            lives: config.player_lives,
            alive: true,
            last_shot: None,
            cooldown_ms: config.fire_cooldown_ms,
        }
    }

    /// Slide left (`-1`) or right (`1`), clamped to the play field.
    pub fn steer(&mut self, direction: i32, field: &Bounds) {
        if !self.alive {
            return;
        }
        let new_x = self.x + direction * self.speed;
        self.x = new_x.clamp(field.left(), field.right() - Self::WIDTH);
    }

    pub fn can_fire(&self, now: u64) -> bool {
        match self.last_shot {
            Some(t) => now.saturating_sub(t) > self.cooldown_ms,
            None => true,
        }
    }

    /// Spawn a bullet at the muzzle and restart the cooldown.
    pub fn fire(&mut self, now: u64) -> Bullet {
        self.last_shot = Some(now);
        let kind = BulletKind::Player;
        Bullet::new(
            kind,
            self.x + Self::WIDTH / 2 - kind.width() / 2,
            self.y - kind.height(),
        )
    }

    pub fn hit(&mut self) {
        self.alive = false;
        self.lives = self.lives.saturating_sub(1);
    }

    pub fn respawn(&mut self) {
        let (x, y) = Self::spawn_point();
        self.x = x;
        self.y = y;
        self.alive = true;
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

impl Entity for Player {
    fn collision_bounds(&self) -> Option<Bounds> {
        self.alive
            .then(|| Bounds::new(self.x, self.y, Self::WIDTH, Self::HEIGHT))
    }
}

// ── Invaders ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvaderKind {
    Top, // squid, 30 pts
    Mid, // crab, 20 pts
    Bot, // octopus, 10 pts
}

impl InvaderKind {
    pub fn for_row(row: usize) -> Self {
        match row {
            0 => InvaderKind::Top,
            1 | 2 => InvaderKind::Mid,
            _ => InvaderKind::Bot,
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            InvaderKind::Top => 30,
            InvaderKind::Mid => 20,
            InvaderKind::Bot => 10,
        }
    }

    pub fn tier(&self) -> u8 {
        match self {
            InvaderKind::Top => 0,
            InvaderKind::Mid => 1,
            InvaderKind::Bot => 2,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Invader {
    pub x: i32,
    pub y: i32,
    pub kind: InvaderKind,
    pub row: usize,
    pub col: usize,
    pub alive: bool,
    /// Which of the two march poses is showing.
    pub alt_frame: bool,
}

impl Invader {
    pub const WIDTH: i32 = 40;
    pub const HEIGHT: i32 = 35;

    pub fn new(x: i32, y: i32, row: usize, col: usize) -> Self {
        Invader {
            x,
            y,
            kind: InvaderKind::for_row(row),
            row,
            col,
            alive: true,
            alt_frame: false,
        }
    }

    pub fn points(&self) -> u32 {
        self.kind.points()
    }
}

impl Entity for Invader {
    fn collision_bounds(&self) -> Option<Bounds> {
        self.alive
            .then(|| Bounds::new(self.x, self.y, Self::WIDTH, Self::HEIGHT))
    }
}

// ── Bullets ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulletKind {
    Player,
    Invader,
}

impl BulletKind {
    pub fn width(&self) -> i32 {
        3
    }

    pub fn height(&self) -> i32 {
        15
    }

    /// Vertical pixels per frame; player shots climb, invader shots fall.
    pub fn velocity(&self) -> i32 {
        match self {
            BulletKind::Player => -10,
            BulletKind::Invader => 5,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Bullet {
    pub kind: BulletKind,
    pub x: i32,
    pub y: i32,
    active: bool,
}

impl Bullet {
    pub fn new(kind: BulletKind, x: i32, y: i32) -> Self {
        Bullet { kind, x, y, active: true }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.kind.width(), self.kind.height())
    }
}

impl Entity for Bullet {
    fn update(&mut self) {
        if !self.active {
            return;
        }
        self.y += self.kind.velocity();
        let gone = match self.kind {
            BulletKind::Player => self.y < 0,
            BulletKind::Invader => self.y > SCREEN_HEIGHT,
        };
        if gone {
            self.active = false;
        }
    }

    fn collision_bounds(&self) -> Option<Bounds> {
        self.active.then(|| self.bounds())
    }
}

// ── Mystery ship ─────────────────────────────────────────────────────────

pub struct MysteryShip {
    pub x: i32,
    pub y: i32,
    direction: i32,
    active: bool,
    points: Vec<u32>,
}

impl MysteryShip {
    pub const WIDTH: i32 = 60;
    pub const HEIGHT: i32 = 30;
    pub const SPEED: i32 = 3;

    pub fn new(points: Vec<u32>) -> Self {
        MysteryShip {
            x: 0,
            y: FIELD_MARGIN_Y + 20,
            direction: 1,
            active: false,
            points,
        }
    }

    /// Start a crossing from the edge opposite `direction`.
    pub fn activate(&mut self, direction: i32) {
        if self.active {
            return;
        }
        self.active = true;
        self.direction = if direction >= 0 { 1 } else { -1 };
        self.x = if self.direction > 0 { -Self::WIDTH } else { SCREEN_WIDTH };
    }

    /// Shot down: deactivate and draw a reward from the point table.
    pub fn hit<R: Rng>(&mut self, rng: &mut R) -> u32 {
        self.active = false;
        self.points.choose(rng).copied().unwrap_or(0)
    }

    /// Pull the ship off the field without scoring it.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn direction(&self) -> i32 {
        self.direction
    }
}

impl Entity for MysteryShip {
    fn update(&mut self) {
        if !self.active {
            return;
        }
        self.x += self.direction * Self::SPEED;
        let off_screen = (self.direction > 0 && self.x > SCREEN_WIDTH)
            || (self.direction < 0 && self.x < -Self::WIDTH);
        if off_screen {
            self.active = false;
        }
    }

    fn collision_bounds(&self) -> Option<Bounds> {
        self.active
            .then(|| Bounds::new(self.x, self.y, Self::WIDTH, Self::HEIGHT))
    }
}

// ── Explosions ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
pub struct Explosion {
    pub x: i32,
    pub y: i32,
    pub started: u64,
}

impl Explosion {
    pub const SIZE: i32 = 40;

    pub fn is_expired(&self, now: u64, lifetime_ms: u64) -> bool {
        now.saturating_sub(self.started) > lifetime_ms
    }
}
