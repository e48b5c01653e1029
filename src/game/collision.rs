//! Per-frame hit resolution.
//!
//! Order matters and is fixed: player shots test the mystery ship, then
//! invaders (row-major, first match wins), then barriers; invader shots
//! test the player, then barriers. A bullet retires on its first hit.
//! Rectangles are tested where they stand this frame; nothing is swept.

use rand::Rng;

use crate::game::barrier::Barrier;
use crate::game::entities::{Bullet, BulletKind, Entity, MysteryShip, Player};
use crate::game::formation::InvaderFormation;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    MysteryShip { points: u32, x: i32, y: i32 },
    Invader { index: usize, points: u32, x: i32, y: i32 },
    Barrier { barrier: usize, by: BulletKind },
    Player { x: i32, y: i32, lives_left: u32 },
}

/// Mutable view of everything that can collide this frame.
pub struct Battlefield<'a> {
    pub player: &'a mut Player,
    pub formation: &'a mut InvaderFormation,
    pub barriers: &'a mut [Barrier],
    pub mystery: &'a mut MysteryShip,
    pub player_bullets: &'a mut Vec<Bullet>,
    pub invader_bullets: &'a mut Vec<Bullet>,
}

pub fn resolve<R: Rng>(field: Battlefield<'_>, rng: &mut R) -> Vec<Hit> {
    let Battlefield {
        player,
        formation,
        barriers,
        mystery,
        player_bullets,
        invader_bullets,
    } = field;
    let mut hits = Vec::new();

    // Player bullets vs mystery ship, then invaders
    for bullet in player_bullets.iter_mut().filter(|b| b.is_active()) {
        let rect = bullet.bounds();

        if mystery.collision_bounds().is_some_and(|m| m.intersects(&rect)) {
            let (x, y) = (mystery.x, mystery.y);
            let points = mystery.hit(rng);
            bullet.deactivate();
            hits.push(Hit::MysteryShip { points, x, y });
            continue;
        }

        let target = formation
            .invaders()
            .iter()
            .position(|i| i.collision_bounds().is_some_and(|r| r.intersects(&rect)));
        if let Some(index) = target {
            let (x, y) = {
                let invader = &formation.invaders()[index];
                (invader.x, invader.y)
            };
            if let Some(points) = formation.kill(index) {
                bullet.deactivate();
                hits.push(Hit::Invader { index, points, x, y });
            }
        }
    }

    // Player bullets vs barriers
    hit_barriers(player_bullets, barriers, &mut hits);

    // Invader bullets vs player
    if let Some(target) = player.collision_bounds() {
        let lethal = invader_bullets
            .iter_mut()
            .filter(|b| b.is_active())
            .find(|b| b.bounds().intersects(&target));
        if let Some(bullet) = lethal {
            bullet.deactivate();
            player.hit();
            hits.push(Hit::Player {
                x: player.x,
                y: player.y,
                lives_left: player.lives(),
            });
        }
    }

    // Invader bullets vs barriers
    hit_barriers(invader_bullets, barriers, &mut hits);

    player_bullets.retain(Bullet::is_active);
    invader_bullets.retain(Bullet::is_active);
    hits
}

fn hit_barriers(bullets: &mut [Bullet], barriers: &mut [Barrier], hits: &mut Vec<Hit>) {
    for bullet in bullets.iter_mut().filter(|b| b.is_active()) {
        let rect = bullet.bounds();
        if let Some(index) = barriers.iter().position(|b| b.check_collision(&rect)) {
            barriers[index].damage(&rect);
            bullet.deactivate();
            hits.push(Hit::Barrier { barrier: index, by: bullet.kind });
        }
    }
}
