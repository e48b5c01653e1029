/// Discrete key presses the simulation reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Confirm,
    Fire,
    Left,
    Right,
    Up,
    Down,
    ResetScores,
    Quit,
}

/// Keys currently held down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Held {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
}

/// Everything the player did since the previous frame.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    pub held: Held,
    pub pressed: Vec<Command>,
}

impl FrameInput {
    pub fn pressed(&self, command: Command) -> bool {
        self.pressed.contains(&command)
    }

    /// Held keys plus fresh presses of the same directions.
    pub fn directions(&self) -> Held {
        Held {
            left: self.held.left || self.pressed(Command::Left),
            right: self.held.right || self.pressed(Command::Right),
            up: self.held.up || self.pressed(Command::Up),
            down: self.held.down || self.pressed(Command::Down),
            fire: self.held.fire || self.pressed(Command::Fire),
        }
    }
}
