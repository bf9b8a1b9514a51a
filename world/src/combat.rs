//! Enemy instances and damage formulas.

use deepdelve_core::{
    catalog::scale_for_level, AiBehavior, EnemyBaseId, EnemyId, EnemySnapshot, TileCoord,
};
use serde::{Deserialize, Serialize};

const HP_PER_LEVEL: f32 = 0.20;
const ATTACK_PER_LEVEL: f32 = 0.15;
const DEFENSE_PER_LEVEL: f32 = 0.15;
const XP_PER_LEVEL: f32 = 0.25;
const GOLD_PER_LEVEL: f32 = 0.20;

/// Lower bound of the random multiplier applied to enemy attacks.
pub const ENEMY_MULTIPLIER_MIN: f32 = 0.75;
/// Upper bound of the random multiplier applied to enemy attacks.
pub const ENEMY_MULTIPLIER_MAX: f32 = 1.25;

/// Live enemy on the current level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) base: EnemyBaseId,
    pub(crate) tile: TileCoord,
    pub(crate) max_hp: i32,
    pub(crate) hp: i32,
    pub(crate) attack: i32,
    pub(crate) defense: i32,
    pub(crate) xp: i32,
    pub(crate) gold: i32,
    pub(crate) behavior: AiBehavior,
}

impl Enemy {
    pub(crate) fn instantiate(base: EnemyBaseId, level: u32, id: EnemyId, tile: TileCoord) -> Self {
        let template = base.template();
        let max_hp = scale_for_level(template.hp, level, HP_PER_LEVEL);
        Self {
            id,
            base,
            tile,
            max_hp,
            hp: max_hp,
            attack: scale_for_level(template.attack, level, ATTACK_PER_LEVEL),
            defense: scale_for_level(template.defense, level, DEFENSE_PER_LEVEL),
            xp: scale_for_level(template.xp, level, XP_PER_LEVEL),
            gold: scale_for_level(template.gold, level, GOLD_PER_LEVEL),
            behavior: template.behavior,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Subtracts hit points; returns `true` when the enemy falls.
    pub(crate) fn take_damage(&mut self, damage: i32) -> bool {
        self.hp = (self.hp - damage.max(0)).max(0);
        self.hp == 0
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            base: self.base,
            tile: self.tile,
            hp: self.hp,
            max_hp: self.max_hp,
            behavior: self.behavior,
        }
    }
}

/// Damage dealt by a weapon strike: `max(1, floor(attack - defense))`.
#[must_use]
pub fn physical_damage(attack: f32, defense: f32) -> i32 {
    ((attack - defense).floor() as i32).max(1)
}

/// Damage dealt by a spell, which ignores defense.
#[must_use]
pub fn magic_damage(magic: f32, bonus: i32) -> i32 {
    (magic.floor() as i32 + bonus).max(1)
}

/// Damage dealt by an enemy with the rolled `multiplier`.
///
/// The multiplier is clamped into
/// [`ENEMY_MULTIPLIER_MIN`]`..=`[`ENEMY_MULTIPLIER_MAX`].
#[must_use]
pub fn enemy_damage(attack: i32, defense: f32, multiplier: f32) -> i32 {
    let multiplier = if multiplier.is_finite() {
        multiplier.clamp(ENEMY_MULTIPLIER_MIN, ENEMY_MULTIPLIER_MAX)
    } else {
        1.0
    };
    let raw = (attack as f32 - defense).max(1.0);
    ((raw * multiplier).floor() as i32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_damage_has_a_floor_of_one() {
        assert_eq!(physical_damage(12.0, 4.0), 8);
        assert_eq!(physical_damage(3.0, 40.0), 1);
        assert_eq!(physical_damage(12.9, 4.0), 8);
    }

    #[test]
    fn magic_ignores_defense() {
        assert_eq!(magic_damage(15.0, 10), 25);
        assert_eq!(magic_damage(0.0, 0), 1);
    }

    #[test]
    fn enemy_multiplier_is_clamped() {
        assert_eq!(enemy_damage(8, 0.0, 1.0), 8);
        assert_eq!(enemy_damage(8, 0.0, 9.0), 10);
        assert_eq!(enemy_damage(8, 0.0, 0.1), 6);
        assert_eq!(enemy_damage(8, 20.0, 1.25), 1);
        assert_eq!(enemy_damage(8, 0.0, f32::NAN), 8);
    }

    #[test]
    fn enemies_scale_with_dungeon_level() {
        let goblin = Enemy::instantiate(
            EnemyBaseId::GoblinGrunt,
            3,
            EnemyId::new(1),
            TileCoord::new(2, 2),
        );
        assert_eq!(goblin.max_hp, 42);
        assert_eq!(goblin.hp, 42);
        assert_eq!(goblin.attack, 10);
        assert_eq!(goblin.defense, 5);
        assert_eq!(goblin.xp, 23);
        assert_eq!(goblin.gold, 7);
    }

    #[test]
    fn enemy_hp_never_goes_negative() {
        let mut spider = Enemy::instantiate(
            EnemyBaseId::CaveSpider,
            1,
            EnemyId::new(2),
            TileCoord::new(0, 0),
        );
        assert!(!spider.take_damage(39));
        assert!(spider.take_damage(100));
        assert_eq!(spider.hp, 0);
        assert!(!spider.is_alive());
    }
}
