//! The simulation core: entities, the formation controller, barrier damage,
//! collision resolution and the screen-flow state machine.

pub mod barrier;
pub mod collision;
pub mod entities;
pub mod formation;
pub mod input;
pub mod name_entry;
pub mod session;

pub use input::{Command, FrameInput, Held};
pub use session::{GameSession, GameState};
