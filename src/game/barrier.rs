use std::collections::HashMap;

use crate::geometry::Bounds;

pub const CELL_SIZE: i32 = 5;
pub const DAMAGE_RADIUS: i32 = 2;
/// A cell at this level is gone: no collision, not drawn.
pub const MAX_DAMAGE: u8 = 4;

/// Destructible bunker. The sprite is a grid of 5×5 cells; each cell keeps
/// its own damage level, which only ever goes up.
#[derive(Clone, Debug)]
pub struct Barrier {
    pub x: i32,
    pub y: i32,
    cols: i32,
    rows: i32,
    damage: HashMap<(i32, i32), u8>,
}

impl Barrier {
    pub const WIDTH: i32 = 80;
    pub const HEIGHT: i32 = 60;

    pub fn new(x: i32, y: i32) -> Self {
        Barrier {
            x,
            y,
            cols: Self::WIDTH / CELL_SIZE,
            rows: Self::HEIGHT / CELL_SIZE,
            damage: HashMap::new(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, Self::WIDTH, Self::HEIGHT)
    }

    pub fn grid_size(&self) -> (i32, i32) {
        (self.cols, self.rows)
    }

    /// Whether the undamaged fortress has material in this cell: corners
    /// are cut away at the bottom and an arch is carved out of the middle.
    pub fn in_shape(&self, col: i32, row: i32) -> bool {
        if col < 0 || col >= self.cols || row < 0 || row >= self.rows {
            return false;
        }
        let corner = row > self.rows * 2 / 3 && (col < self.cols / 4 || col > self.cols * 3 / 4);
        let arch = row > self.rows / 2 && col > self.cols / 3 && col < self.cols * 2 / 3;
        !corner && !arch
    }

    pub fn damage_level(&self, col: i32, row: i32) -> u8 {
        self.damage.get(&(col, row)).copied().unwrap_or(0)
    }

    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        self.in_shape(col, row) && self.damage_level(col, row) < MAX_DAMAGE
    }

    /// True if `rect` overlaps at least one solid cell.
    pub fn check_collision(&self, rect: &Bounds) -> bool {
        let Some(overlap) = rect.intersection(&self.bounds()) else {
            return false;
        };
        let col0 = (overlap.left() - self.x) / CELL_SIZE;
        let col1 = (overlap.right() - 1 - self.x) / CELL_SIZE;
        let row0 = (overlap.top() - self.y) / CELL_SIZE;
        let row1 = (overlap.bottom() - 1 - self.y) / CELL_SIZE;
        for row in row0..=row1 {
            for col in col0..=col1 {
                if self.is_solid(col, row) {
                    return true;
                }
            }
        }
        false
    }

    /// Crater around the centre of `rect`: every cell within the damage
    /// radius goes up one level, capped at the maximum.
    pub fn damage(&mut self, rect: &Bounds) {
        let (cx, cy) = rect.center();
        let center_col = (cx - self.x).div_euclid(CELL_SIZE);
        let center_row = (cy - self.y).div_euclid(CELL_SIZE);
        for dy in -DAMAGE_RADIUS..=DAMAGE_RADIUS {
            for dx in -DAMAGE_RADIUS..=DAMAGE_RADIUS {
                let col = center_col + dx;
                let row = center_row + dy;
                if col < 0 || col >= self.cols || row < 0 || row >= self.rows {
                    continue;
                }
                let level = self.damage.entry((col, row)).or_insert(0);
                if *level < MAX_DAMAGE {
                    *level += 1;
                }
            }
        }
    }

    /// Cells still standing, with their damage level, for drawing.
    pub fn standing_cells(&self) -> impl Iterator<Item = (i32, i32, u8)> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.cols).filter_map(move |col| {
                self.is_solid(col, row)
                    .then(|| (col, row, self.damage_level(col, row)))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1×1 probe at the centre of a cell.
    fn probe(barrier: &Barrier, col: i32, row: i32) -> Bounds {
        Bounds::new(
            barrier.x + col * CELL_SIZE + 2,
            barrier.y + row * CELL_SIZE + 2,
            1,
            1,
        )
    }

    #[test]
    fn shape_has_arch_and_cut_corners() {
        let b = Barrier::new(0, 0);
        assert!(b.in_shape(0, 0));
        assert!(b.in_shape(8, 6));
        // arch
        assert!(!b.in_shape(8, 7));
        // bottom corners
        assert!(!b.in_shape(0, 11));
        assert!(!b.in_shape(15, 11));
        assert!(b.in_shape(4, 11));
    }

    #[test]
    fn outside_rect_never_collides() {
        let b = Barrier::new(100, 100);
        assert!(!b.check_collision(&Bounds::new(0, 0, 3, 15)));
        assert!(!b.check_collision(&Bounds::new(180, 100, 3, 15)));
        assert!(b.check_collision(&Bounds::new(98, 100, 3, 15)));
    }

    #[test]
    fn cell_disappears_exactly_at_max_level() {
        let mut b = Barrier::new(200, 300);
        let hit = probe(&b, 5, 3);
        for expected in 1..=MAX_DAMAGE {
            assert!(b.check_collision(&hit), "solid before level {}", expected);
            b.damage(&hit);
            assert_eq!(b.damage_level(5, 3), expected);
        }
        assert!(!b.check_collision(&hit));
        b.damage(&hit);
        assert_eq!(b.damage_level(5, 3), MAX_DAMAGE);
    }

    #[test]
    fn damage_spreads_over_radius_only() {
        let mut b = Barrier::new(0, 0);
        b.damage(&probe(&b, 6, 4));
        assert_eq!(b.damage_level(4, 2), 1);
        assert_eq!(b.damage_level(8, 6), 1);
        assert_eq!(b.damage_level(3, 4), 0);
        assert_eq!(b.damage_level(6, 7), 0);
    }

    #[test]
    fn overlapping_craters_accumulate() {
        let mut b = Barrier::new(0, 0);
        b.damage(&probe(&b, 5, 5));
        b.damage(&probe(&b, 7, 5));
        assert_eq!(b.damage_level(6, 5), 2);
        assert_eq!(b.damage_level(3, 5), 1);
        assert_eq!(b.damage_level(9, 5), 1);
    }

    #[test]
    fn edge_hits_clip_to_grid() {
        let mut b = Barrier::new(0, 0);
        b.damage(&probe(&b, 0, 0));
        assert_eq!(b.damage_level(0, 0), 1);
        assert_eq!(b.damage_level(2, 2), 1);
        assert_eq!(b.damage_level(3, 3), 0);
        assert!(b.standing_cells().all(|(col, row, _)| b.in_shape(col, row)));
    }

    #[test]
    fn carved_cells_never_collide() {
        let b = Barrier::new(0, 0);
        assert!(!b.check_collision(&probe(&b, 8, 9)));
    }
}
