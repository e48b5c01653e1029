/// Logical screen size. Everything in the simulation lives in this pixel
/// space; the renderer scales it down to braille dots.
pub const SCREEN_WIDTH: i32 = 800;
pub const SCREEN_HEIGHT: i32 = 600;

pub const FIELD_MARGIN_X: i32 = 50;
pub const FIELD_MARGIN_Y: i32 = 50;

/// Axis-aligned rectangle in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Bounds {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Bounds { x, y, w, h }
    }

    /// The playable area inside the screen margins.
    pub const fn play_field() -> Self {
        Bounds::new(
            FIELD_MARGIN_X,
            FIELD_MARGIN_Y,
            SCREEN_WIDTH - 2 * FIELD_MARGIN_X,
            SCREEN_HEIGHT - 2 * FIELD_MARGIN_Y,
        )
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        Some(Bounds::new(x, y, r - x, b - y))
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Bounds::new(0, 0, 10, 10);
        let b = Bounds::new(10, 0, 10, 10);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Bounds::new(9, 9, 5, 5)));
    }

    #[test]
    fn intersection_is_clipped() {
        let a = Bounds::new(0, 0, 10, 10);
        let b = Bounds::new(5, -5, 10, 10);
        assert_eq!(a.intersection(&b), Some(Bounds::new(5, 0, 5, 5)));
        assert_eq!(a.intersection(&Bounds::new(20, 20, 1, 1)), None);
    }

    #[test]
    fn play_field_sits_inside_margins() {
        let f = Bounds::play_field();
        assert_eq!((f.left(), f.top(), f.right(), f.bottom()), (50, 50, 750, 550));
    }
}
