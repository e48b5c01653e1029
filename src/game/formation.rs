use std::collections::BTreeMap;

use rand::Rng;

use crate::config::{GameConfig, MOVE_DELAY_FLOOR_MS};
use crate::game::entities::{BulletKind, Bullet, Invader};
use crate::geometry::{Bounds, FIELD_MARGIN_X, FIELD_MARGIN_Y};

pub const INVADER_ROWS: usize = 5;
pub const INVADER_COLS: usize = 11;
const H_SPACING: i32 = 15;
const V_SPACING: i32 = 15;
const H_PADDING: i32 = 50;
const V_PADDING: i32 = 50;

/// What a call to [`InvaderFormation::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum March {
    /// Move timer has not elapsed.
    Waiting,
    /// Edge ahead: direction flipped, drop scheduled for the next tick.
    Reversed,
    /// Stepped sideways.
    Stepped,
    /// Dropped one row.
    Descended,
}

impl March {
    /// A tick that actually moved the invaders.
    pub fn moved(&self) -> bool {
        matches!(self, March::Stepped | March::Descended)
    }
}

/// The grid of invaders, moved and timed as one unit.
pub struct InvaderFormation {
    invaders: Vec<Invader>,
    direction: i32,
    descend_pending: bool,
    frame: u32,
    last_move: u64,
    start_delay: u64,
    min_delay: u64,
    move_delay: u64,
    killed: usize,
    total: usize,
    step_px: i32,
    descend_px: i32,
    fire_chance: f64,
}

impl InvaderFormation {
    /// Full 5×11 formation, row-major, first invader at the top-left.
    pub fn new(config: &GameConfig, start_delay: u64) -> Self {
        let start_x = FIELD_MARGIN_X + H_PADDING;
        let start_y = FIELD_MARGIN_Y + V_PADDING;
        let mut invaders = Vec::with_capacity(INVADER_ROWS * INVADER_COLS);
        for row in 0..INVADER_ROWS {
            let y = start_y + row as i32 * (Invader::HEIGHT + V_SPACING);
            for col in 0..INVADER_COLS {
                let x = start_x + col as i32 * (Invader::WIDTH + H_SPACING);
                invaders.push(Invader::new(x, y, row, col));
            }
        }
        Self::from_invaders(invaders, config, start_delay)
    }

    /// Formation over an arbitrary set of invaders; the total is their count.
    pub fn from_invaders(invaders: Vec<Invader>, config: &GameConfig, start_delay: u64) -> Self {
        let start_delay = start_delay.max(MOVE_DELAY_FLOOR_MS);
        let min_delay = config.min_move_delay_ms.clamp(MOVE_DELAY_FLOOR_MS, start_delay);
        let total = invaders.len();
        InvaderFormation {
            invaders,
            direction: 1,
            descend_pending: false,
            frame: 0,
            last_move: 0,
            start_delay,
            min_delay,
            move_delay: start_delay,
            killed: 0,
            total,
            step_px: config.invader_step_px,
            descend_px: config.invader_descend_px,
            fire_chance: config.invader_fire_chance.clamp(0.0, 1.0),
        }
    }

    /// Advance the formation if its move timer has elapsed.
    ///
    /// Reaching an edge costs two ticks: the first flips direction without
    /// moving, the second drops one row without moving sideways.
    pub fn step(&mut self, now: u64, field: &Bounds) -> March {
        if now.saturating_sub(self.last_move) < self.move_delay {
            return March::Waiting;
        }
        self.last_move = now;

        if self.descend_pending {
            self.descend_pending = false;
            self.shift(0, self.descend_px);
            return March::Descended;
        }

        let dx = self.direction * self.step_px;
        let edge_ahead = self.invaders.iter().filter(|i| i.alive).any(|i| {
            let new_x = i.x + dx;
            new_x < field.left() || new_x + Invader::WIDTH > field.right()
        });
        if edge_ahead {
            self.direction = -self.direction;
            self.descend_pending = true;
            return March::Reversed;
        }

        self.shift(dx, 0);
        March::Stepped
    }

    /// Count the next move delay from `now`.
    pub fn restart_clock(&mut self, now: u64) {
        self.last_move = now;
    }

    fn shift(&mut self, dx: i32, dy: i32) {
        self.frame = self.frame.wrapping_add(1);
        let alt = self.frame % 2 == 1;
        for invader in self.invaders.iter_mut().filter(|i| i.alive) {
            invader.x += dx;
            invader.y += dy;
            invader.alt_frame = alt;
        }
    }

    /// Mark the invader at `index` dead and speed the survivors up.
    /// Returns the points it was worth, or `None` if it was already dead.
    pub fn kill(&mut self, index: usize) -> Option<u32> {
        let invader = self.invaders.get_mut(index).filter(|i| i.alive)?;
        invader.alive = false;
        let points = invader.points();
        self.killed += 1;
        self.move_delay = self.delay_for_kills(self.killed);
        Some(points)
    }

    /// Linear ramp from the starting delay at zero kills down to the floor
    /// with every invader dead.
    pub fn delay_for_kills(&self, killed: usize) -> u64 {
        if self.total == 0 {
            return self.min_delay;
        }
        let fraction = killed.min(self.total) as f64 / self.total as f64;
        let span = (self.start_delay - self.min_delay) as f64;
        let delay = self.start_delay as f64 - span * fraction;
        (delay.round() as u64).max(self.min_delay)
    }

    /// With the per-frame firing chance, pick a front-line invader (the
    /// lowest living one in some column) and spawn its bullet.
    pub fn try_fire<R: Rng>(&self, rng: &mut R) -> Option<Bullet> {
        if !(self.fire_chance > 0.0) || !rng.gen_bool(self.fire_chance) {
            return None;
        }
        let front = self.front_line();
        if front.is_empty() {
            return None;
        }
        let shooter = &self.invaders[front[rng.gen_range(0..front.len())]];
        let kind = BulletKind::Invader;
        Some(Bullet::new(
            kind,
            shooter.x + Invader::WIDTH / 2 - kind.width() / 2,
            shooter.y + Invader::HEIGHT,
        ))
    }

    /// Indices of the bottom-most living invader in each occupied column,
    /// ordered by column.
    pub fn front_line(&self) -> Vec<usize> {
        let mut lowest: BTreeMap<usize, usize> = BTreeMap::new();
        for (i, invader) in self.invaders.iter().enumerate() {
            if !invader.alive {
                continue;
            }
            match lowest.get(&invader.col) {
                Some(&j) if self.invaders[j].y >= invader.y => {}
                _ => {
                    lowest.insert(invader.col, i);
                }
            }
        }
        lowest.into_values().collect()
    }

    /// True once a living invader's bottom edge reaches `y`.
    pub fn reached(&self, y: i32) -> bool {
        self.invaders
            .iter()
            .any(|i| i.alive && i.y + Invader::HEIGHT >= y)
    }

    pub fn all_dead(&self) -> bool {
        self.killed >= self.total
    }

    pub fn invaders(&self) -> &[Invader] {
        &self.invaders
    }

    pub fn alive_count(&self) -> usize {
        self.total - self.killed.min(self.total)
    }

    pub fn direction(&self) -> i32 {
        self.direction
    }

    pub fn descend_pending(&self) -> bool {
        self.descend_pending
    }

    pub fn move_delay(&self) -> u64 {
        self.move_delay
    }

    pub fn killed(&self) -> usize {
        self.killed
    }

    pub fn total(&self) -> usize {
        self.total
    }
}
