#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides what every enemy does during the enemy phase.
//!
//! The pass starts when the world announces the enemy phase. Enemies act one
//! at a time in ascending id order, each against a fresh view of the world,
//! so earlier moves and casualties are visible to later enemies. Once every
//! enemy has acted the system closes the phase with
//! [`Command::EndEnemyTurn`].

use std::collections::VecDeque;

use deepdelve_core::{
    Command, EnemyId, EnemySnapshot, EnemyView, Event, GridMap, PartyMemberSnapshot, Pose,
    TileCoord, TurnPhase,
};
use deepdelve_world::{ENEMY_MULTIPLIER_MAX, ENEMY_MULTIPLIER_MIN};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Enemy turn planner driven by world events.
#[derive(Debug)]
pub struct EnemyAi {
    rng: ChaCha8Rng,
    pending: VecDeque<EnemyId>,
    armed: bool,
}

impl EnemyAi {
    /// Creates a planner whose random choices derive from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            pending: VecDeque::new(),
            armed: false,
        }
    }

    /// Reports whether an enemy pass is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.armed
    }

    /// Consumes the latest events and current views and emits at most one
    /// command.
    ///
    /// Callers apply the emitted command, then call `handle` again with the
    /// resulting events and refreshed views until nothing is emitted. The
    /// output buffer is cleared first.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        party: &[PartyMemberSnapshot],
        pose: &Pose,
        map: &GridMap,
        out: &mut Vec<Command>,
    ) {
        out.clear();

        for event in events {
            if let Event::TurnPhaseChanged { phase } = event {
                self.pending.clear();
                self.armed = *phase == TurnPhase::Enemy;
                if self.armed {
                    self.pending.extend(enemies.iter().map(|enemy| enemy.id));
                }
            }
        }

        if !self.armed {
            return;
        }

        while let Some(id) = self.pending.pop_front() {
            let Some(enemy) = enemies.iter().find(|enemy| enemy.id == id) else {
                continue;
            };
            if let Some(command) = self.decide(enemy, enemies, party, pose, map) {
                out.push(command);
                return;
            }
        }

        self.armed = false;
        out.push(Command::EndEnemyTurn);
    }

    fn decide(
        &mut self,
        enemy: &EnemySnapshot,
        enemies: &EnemyView,
        party: &[PartyMemberSnapshot],
        pose: &Pose,
        map: &GridMap,
    ) -> Option<Command> {
        let player = pose.tile();
        let dx = player.column() - enemy.tile.column();
        let dy = player.row() - enemy.tile.row();

        if enemy.tile.chebyshev_distance(player) == 1 {
            let living: Vec<usize> = party
                .iter()
                .filter(|member| member.alive)
                .map(|member| member.index)
                .collect();
            let target = *living.choose(&mut self.rng)?;
            let multiplier = self
                .rng
                .gen_range(ENEMY_MULTIPLIER_MIN..ENEMY_MULTIPLIER_MAX);
            return Some(Command::EnemyAttack {
                enemy: enemy.id,
                target,
                multiplier,
            });
        }

        let to = step_toward(enemy.tile, dx.signum(), dy.signum(), |tile| {
            tile != player && map.is_walkable(tile) && enemies.at(tile).is_none()
        })?;
        Some(Command::EnemyStep { enemy: enemy.id, to })
    }
}

/// First free tile among the diagonal, horizontal and vertical steps.
fn step_toward<F>(from: TileCoord, sx: i32, sy: i32, is_free: F) -> Option<TileCoord>
where
    F: Fn(TileCoord) -> bool,
{
    let diagonal = (sx != 0 && sy != 0).then_some((sx, sy));
    let horizontal = (sx != 0).then_some((sx, 0));
    let vertical = (sy != 0).then_some((0, sy));
    [diagonal, horizontal, vertical]
        .into_iter()
        .flatten()
        .map(|(column, row)| from.offset(column, row))
        .find(|tile| is_free(*tile))
}
