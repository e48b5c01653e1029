use std::collections::HashSet;

/// Named trigger points the simulation fires at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sound {
    PlayerShoot,
    InvaderShoot,
    PlayerExplosion,
    InvaderExplosion,
    /// Loops while the ship is crossing.
    MysteryShip,
    MysteryShipHit,
    GameOver,
    /// One of four cyclic march notes.
    InvaderMovement(u8),
}

impl Sound {
    pub fn name(&self) -> &'static str {
        match self {
            Sound::PlayerShoot => "player_shoot",
            Sound::InvaderShoot => "invader_shoot",
            Sound::PlayerExplosion => "player_explosion",
            Sound::InvaderExplosion => "invader_explosion",
            Sound::MysteryShip => "mystery_ship",
            Sound::MysteryShipHit => "mystery_ship_hit",
            Sound::GameOver => "game_over",
            Sound::InvaderMovement(0) => "invader_movement0",
            Sound::InvaderMovement(1) => "invader_movement1",
            Sound::InvaderMovement(2) => "invader_movement2",
            Sound::InvaderMovement(_) => "invader_movement3",
        }
    }
}

/// Fire-and-forget audio collaborator.
pub trait Audio {
    fn play(&mut self, sound: Sound);
    fn stop(&mut self, sound: Sound);
}

/// Terminal stand-in for a mixer: traces cues and tracks which loops are
/// running so a stop without a matching play is visible in the log.
#[derive(Default)]
pub struct LogAudio {
    looping: HashSet<Sound>,
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_looping(&self, sound: Sound) -> bool {
        self.looping.contains(&sound)
    }
}

impl Audio for LogAudio {
    fn play(&mut self, sound: Sound) {
        if self.is_looping(sound) {
            tracing::trace!(sound = sound.name(), "loop already running");
            return;
        }
        if sound == Sound::MysteryShip {
            self.looping.insert(sound);
        }
        tracing::trace!(sound = sound.name(), "play");
    }

    fn stop(&mut self, sound: Sound) {
        if !self.looping.remove(&sound) {
            tracing::trace!(sound = sound.name(), "stop on idle sound");
            return;
        }
        tracing::trace!(sound = sound.name(), "stop");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mystery_ship_loop_is_tracked() {
        let mut audio = LogAudio::new();
        audio.play(Sound::MysteryShip);
        assert!(audio.is_looping(Sound::MysteryShip));
        audio.stop(Sound::MysteryShip);
        assert!(!audio.is_looping(Sound::MysteryShip));
    }

    #[test]
    fn replaying_a_running_loop_keeps_one_instance() {
        let mut audio = LogAudio::new();
        audio.play(Sound::MysteryShip);
        audio.play(Sound::MysteryShip);
        audio.stop(Sound::MysteryShip);
        assert!(!audio.is_looping(Sound::MysteryShip));
        assert!(!audio.is_looping(Sound::GameOver));
    }

    #[test]
    fn movement_variants_have_distinct_names() {
        let names: HashSet<_> = (0..4).map(|i| Sound::InvaderMovement(i).name()).collect();
        assert_eq!(names.len(), 4);
    }
}
