//! Braille play-field. Logical pixels inside the play field are scaled onto
//! a 2×4 dot grid per terminal cell; sprites are bitmaps stretched over each
//! entity's hit box, so what you see is what collides.

use std::collections::HashMap;

use ratatui::prelude::*;

use crate::game::barrier::{Barrier, CELL_SIZE};
use crate::game::entities::{BulletKind, Explosion, Invader, InvaderKind, MysteryShip, Player};
use crate::game::GameSession;
use crate::geometry::Bounds;

type DotMap = HashMap<(usize, usize), u8>;

pub const BG: Color = Color::Rgb(0, 0, 5);

const SQUID: [&[&str]; 2] = [
    &[
        "...##...",
        "..####..",
        ".######.",
        "##.##.##",
        "########",
        "..#..#..",
        ".#.##.#.",
        "#.#..#.#",
    ],
    &[
        "...##...",
        "..####..",
        ".######.",
        "##.##.##",
        "########",
        ".#.##.#.",
        "#......#",
        ".#....#.",
    ],
];

const CRAB: [&[&str]; 2] = [
    &[
        "..#.....#..",
        "...#...#...",
        "..#######..",
        ".##.###.##.",
        "###########",
        "#.#######.#",
        "#.#.....#.#",
        "...##.##...",
    ],
    &[
        "..#.....#..",
        "#..#...#..#",
        "#.#######.#",
        "###.###.###",
        "###########",
        ".#########.",
        "..#.....#..",
        ".#.......#.",
    ],
];

const OCTOPUS: [&[&str]; 2] = [
    &[
        "....####....",
        ".##########.",
        "############",
        "###..##..###",
        "############",
        "...##..##...",
        "..##.##.##..",
        "##........##",
    ],
    &[
        "....####....",
        ".##########.",
        "############",
        "###..##..###",
        "############",
        "..###..###..",
        ".##..##..##.",
        "..##....##..",
    ],
];

const CANNON: &[&str] = &[
    "......#......",
    ".....###.....",
    ".....###.....",
    ".###########.",
    "#############",
    "#############",
    "#############",
    "#############",
];

const SAUCER: &[&str] = &[
    ".....######.....",
    "...##########...",
    "..############..",
    ".##.##.##.##.##.",
    "################",
    "..###..##..###..",
    "...#........#...",
];

const BURST: &[&str] = &[
    "#...#...#",
    ".#..#..#.",
    "..#...#..",
    "##.....##",
    "..#...#..",
    ".#..#..#.",
    "#...#...#",
];

const BOLT: [&[&str]; 2] = [&["#.", ".#", "#.", ".#"], &[".#", "#.", ".#", "#."]];

/// Barrier colour by damage level; fully erased cells are never drawn.
const BARRIER_SHADES: [Color; 4] = [
    Color::Rgb(40, 200, 40),
    Color::Rgb(40, 160, 40),
    Color::Rgb(40, 120, 40),
    Color::Rgb(40, 80, 40),
];

fn braille_bit(sub_x: usize, sub_y: usize) -> u8 {
    match (sub_x, sub_y) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0,
    }
}

/// Terminal-cell grid plus the logical-to-dot transform for one frame.
struct Canvas {
    origin: Bounds,
    w: usize,
    h: usize,
    bw: i32,
    bh: i32,
    sx: f32,
    sy: f32,
    grid: Vec<Vec<(char, Style)>>,
}

impl Canvas {
    fn new(width: usize, height: usize, origin: Bounds) -> Self {
        let bw = (width * 2) as i32;
        let bh = (height * 4) as i32;
        Canvas {
            origin,
            w: width,
            h: height,
            bw,
            bh,
            sx: bw as f32 / origin.w as f32,
            sy: bh as f32 / origin.h as f32,
            grid: vec![vec![(' ', Style::default().bg(BG)); width]; height],
        }
    }

    /// Dot-space rectangle covered by `b`, at least one dot each way.
    fn dot_rect(&self, b: Bounds) -> (i32, i32, i32, i32) {
        let x0 = ((b.left() - self.origin.x) as f32 * self.sx).round() as i32;
        let y0 = ((b.top() - self.origin.y) as f32 * self.sy).round() as i32;
        let x1 = ((b.right() - self.origin.x) as f32 * self.sx).round() as i32;
        let y1 = ((b.bottom() - self.origin.y) as f32 * self.sy).round() as i32;
        (x0, y0, x1.max(x0 + 1), y1.max(y0 + 1))
    }

    fn set_dot(&self, map: &mut DotMap, bx: i32, by: i32) {
        if bx < 0 || by < 0 || bx >= self.bw || by >= self.bh {
            return;
        }
        let cx = bx as usize / 2;
        let cy = by as usize / 4;
        *map.entry((cx, cy)).or_insert(0) |= braille_bit(bx as usize % 2, by as usize % 4);
    }

    /// Stretch a `#`-bitmap over `b`.
    fn stamp(&self, map: &mut DotMap, b: Bounds, sprite: &[&str]) {
        let sh = sprite.len();
        let sw = sprite.first().map_or(0, |row| row.len());
        if sh == 0 || sw == 0 {
            return;
        }
        let (x0, y0, x1, y1) = self.dot_rect(b);
        let (dw, dh) = ((x1 - x0) as usize, (y1 - y0) as usize);
        for dy in 0..dh {
            let row = sprite[dy * sh / dh].as_bytes();
            for dx in 0..dw {
                if row.get(dx * sw / dw) == Some(&b'#') {
                    self.set_dot(map, x0 + dx as i32, y0 + dy as i32);
                }
            }
        }
    }

    fn fill(&self, map: &mut DotMap, b: Bounds) {
        let (x0, y0, x1, y1) = self.dot_rect(b);
        for by in y0..y1 {
            for bx in x0..x1 {
                self.set_dot(map, bx, by);
            }
        }
    }

    fn write_layer(&mut self, map: &DotMap, color: Color, bold: bool) {
        for (&(cx, cy), &bits) in map {
            if cx < self.w && cy < self.h && bits != 0 {
                let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
                let mut style = Style::default().fg(color).bg(BG);
                if bold {
                    style = style.add_modifier(Modifier::BOLD);
                }
                self.grid[cy][cx] = (ch, style);
            }
        }
    }

    fn into_lines(self) -> Vec<Line<'static>> {
        self.grid
            .into_iter()
            .map(|row| {
                let spans: Vec<Span<'static>> = row
                    .into_iter()
                    .map(|(ch, style)| Span::styled(String::from(ch), style))
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

fn invader_sprite(kind: InvaderKind, alt: bool) -> &'static [&'static str] {
    let frames = match kind {
        InvaderKind::Top => SQUID,
        InvaderKind::Mid => CRAB,
        InvaderKind::Bot => OCTOPUS,
    };
    frames[alt as usize]
}

fn invader_color(kind: InvaderKind) -> Color {
    match kind {
        InvaderKind::Top => Color::Rgb(255, 80, 80),
        InvaderKind::Mid => Color::Rgb(80, 255, 150),
        InvaderKind::Bot => Color::Rgb(200, 180, 255),
    }
}

fn draw_barrier(canvas: &Canvas, layers: &mut [DotMap; 4], barrier: &Barrier) {
    for (col, row, level) in barrier.standing_cells() {
        let cell = Bounds::new(
            barrier.x + col * CELL_SIZE,
            barrier.y + row * CELL_SIZE,
            CELL_SIZE,
            CELL_SIZE,
        );
        let shade = (level as usize).min(layers.len() - 1);
        canvas.fill(&mut layers[shade], cell);
    }
}

/// Render the session's play field into `width`×`height` terminal cells.
pub fn render_field(session: &GameSession, width: usize, height: usize) -> Vec<Line<'static>> {
    let mut canvas = Canvas::new(width, height, *session.field());

    // ── Invaders ─────────────────────────────────────────────────────────
    for kind in [InvaderKind::Top, InvaderKind::Mid, InvaderKind::Bot] {
        let mut map = DotMap::new();
        for invader in session.formation().invaders().iter().filter(|i| i.alive && i.kind == kind) {
            let b = Bounds::new(invader.x, invader.y, Invader::WIDTH, Invader::HEIGHT);
            canvas.stamp(&mut map, b, invader_sprite(kind, invader.alt_frame));
        }
        canvas.write_layer(&map, invader_color(kind), false);
    }

    // ── Barriers ─────────────────────────────────────────────────────────
    let mut layers: [DotMap; 4] = Default::default();
    for barrier in session.barriers() {
        draw_barrier(&canvas, &mut layers, barrier);
    }
    for (map, color) in layers.iter().zip(BARRIER_SHADES) {
        canvas.write_layer(map, color, false);
    }

    // ── Mystery ship ─────────────────────────────────────────────────────
    let mystery = session.mystery();
    if mystery.is_active() {
        let mut map = DotMap::new();
        let b = Bounds::new(mystery.x, mystery.y, MysteryShip::WIDTH, MysteryShip::HEIGHT);
        canvas.stamp(&mut map, b, SAUCER);
        canvas.write_layer(&map, Color::Rgb(255, 60, 200), true);
    }

    // ── Bullets ──────────────────────────────────────────────────────────
    let mut shots = DotMap::new();
    let mut bolts = DotMap::new();
    let wiggle = (session.now() / 100 % 2) as usize;
    for bullet in session.player_bullets().iter().chain(session.invader_bullets()) {
        match bullet.kind {
            BulletKind::Player => canvas.fill(&mut shots, bullet.bounds()),
            BulletKind::Invader => canvas.stamp(&mut bolts, bullet.bounds(), BOLT[wiggle]),
        }
    }
    canvas.write_layer(&shots, Color::Rgb(255, 255, 200), true);
    canvas.write_layer(&bolts, Color::Rgb(255, 100, 100), true);

    // ── Player ───────────────────────────────────────────────────────────
    let player = session.player();
    if player.is_alive() {
        let mut map = DotMap::new();
        let b = Bounds::new(player.x, player.y, Player::WIDTH, Player::HEIGHT);
        canvas.stamp(&mut map, b, CANNON);
        canvas.write_layer(&map, Color::Rgb(80, 255, 80), true);
    }

    // ── Explosions ───────────────────────────────────────────────────────
    let mut bursts = DotMap::new();
    for e in session.explosions() {
        let b = Bounds::new(e.x, e.y, Explosion::SIZE, Explosion::SIZE);
        canvas.stamp(&mut bursts, b, BURST);
    }
    canvas.write_layer(&bursts, Color::Rgb(255, 200, 60), true);

    // ── Ground line ──────────────────────────────────────────────────────
    if let Some(ground) = canvas.grid.last_mut() {
        for cell in ground.iter_mut().filter(|(ch, _)| *ch == ' ') {
            *cell = ('\u{2500}', Style::default().fg(Color::Rgb(40, 80, 40)).bg(BG));
        }
    }

    canvas.into_lines()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn braille_bits_cover_all_eight_dots() {
        let mut all = 0u8;
        for x in 0..2 {
            for y in 0..4 {
                all |= braille_bit(x, y);
            }
        }
        assert_eq!(all, 0xFF);
    }

    #[test]
    fn full_field_fill_lights_every_cell() {
        let field = Bounds::play_field();
        let canvas = Canvas::new(10, 5, field);
        let mut map = DotMap::new();
        canvas.fill(&mut map, field);
        assert_eq!(map.len(), 50);
        assert!(map.values().all(|&bits| bits == 0xFF));
    }

    #[test]
    fn off_canvas_dots_are_clipped() {
        let field = Bounds::play_field();
        let canvas = Canvas::new(10, 5, field);
        let mut map = DotMap::new();
        canvas.fill(&mut map, Bounds::new(-100, -100, 40, 40));
        assert!(map.is_empty());
    }
}
