use crate::game::input::Held;

pub const NAME_LENGTH: usize = 5;
pub const NAME_CHARSET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_+-=<>?.";

/// Arcade-style initials editor: a fixed-width name, one highlighted slot,
/// up/down cycles the slot's character, left/right moves the slot.
pub struct NameEntry {
    chars: [char; NAME_LENGTH],
    cursor: usize,
    last_edit: Option<u64>,
    debounce_ms: u64,
}

impl NameEntry {
    pub fn new(debounce_ms: u64) -> Self {
        NameEntry {
            chars: ['A'; NAME_LENGTH],
            cursor: 0,
            last_edit: None,
            debounce_ms,
        }
    }

    fn charset() -> Vec<char> {
        NAME_CHARSET.chars().collect()
    }

    /// Position of the highlighted character in the charset; anything
    /// outside it reads as the first entry.
    fn char_index(&self) -> usize {
        Self::charset()
            .iter()
            .position(|&c| c == self.chars[self.cursor])
            .unwrap_or(0)
    }

    pub fn cycle(&mut self, delta: i32) {
        let set = Self::charset();
        let len = set.len() as i32;
        let next = (self.char_index() as i32 + delta).rem_euclid(len);
        self.chars[self.cursor] = set[next as usize];
    }

    pub fn move_cursor(&mut self, delta: i32) {
        let next = (self.cursor as i32 + delta).rem_euclid(NAME_LENGTH as i32);
        self.cursor = next as usize;
    }

    /// Apply held directions, at most once per debounce window.
    pub fn apply(&mut self, now: u64, held: &Held) {
        if let Some(t) = self.last_edit {
            if now.saturating_sub(t) < self.debounce_ms {
                return;
            }
        }
        self.edit(now, held);
    }

    /// Apply directions immediately; a fresh key press skips the debounce
    /// but still restarts it.
    pub fn edit(&mut self, now: u64, dirs: &Held) {
        let mut edited = false;
        if dirs.left {
            self.move_cursor(-1);
            edited = true;
        } else if dirs.right {
            self.move_cursor(1);
            edited = true;
        }
        if dirs.up {
            self.cycle(-1);
            edited = true;
        } else if dirs.down {
            self.cycle(1);
            edited = true;
        }

        if edited {
            self.last_edit = Some(now);
        }
    }

    pub fn name(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Characters one step up and one step down from the highlighted one.
    pub fn neighbours(&self) -> (char, char) {
        let set = Self::charset();
        let len = set.len();
        let i = self.char_index();
        (set[(i + len - 1) % len], set[(i + 1) % len])
    }
}
