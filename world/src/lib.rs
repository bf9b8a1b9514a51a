#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative dungeon state for Deepdelve.
//!
//! [`World`] is the single game-state aggregate. It is mutated exclusively by
//! [`apply`], which executes one [`Command`] to completion and reports what
//! happened through [`Event`] values. Everything else reads the world through
//! the [`query`] module.

mod combat;
mod generation;
mod party;
mod snapshot;
mod turn;

use std::time::Duration;

use deepdelve_core::{
    Command, DungeonConfig, Event, ExploredGrid, GridMap, Pose, Tile, TileCoord, TurnPhase,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use combat::{
    enemy_damage, magic_damage, physical_damage, ENEMY_MULTIPLIER_MAX, ENEMY_MULTIPLIER_MIN,
};
pub use party::{
    recalculate_stats, Character, DamageOutcome, EffectiveStats, EquipOutcome, Equipment,
    InventoryError, Item, Stowed,
};
pub use snapshot::{GameSnapshot, SnapshotError};

use combat::Enemy;
use generation::IdAllocator;

const GAMEPLAY_STREAM: &str = "gameplay";

/// Item lying on the level, waiting to be picked up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct FloorItem {
    pub(crate) item: Item,
    pub(crate) tile: TileCoord,
}

/// Represents the authoritative Deepdelve game state.
#[derive(Debug)]
pub struct World {
    config: DungeonConfig,
    seed: u64,
    rng: ChaCha8Rng,
    ids: IdAllocator,
    pose: Pose,
    members: Vec<Character>,
    active_index: usize,
    dungeon_level: u32,
    map: GridMap,
    explored: ExploredGrid,
    enemies: Vec<Enemy>,
    floor_items: Vec<FloorItem>,
    phase: TurnPhase,
    elapsed: Duration,
    active: bool,
}

impl World {
    /// Creates an idle world. No game runs until [`Command::StartGame`].
    #[must_use]
    pub fn new(config: DungeonConfig, seed: u64) -> Self {
        let map = GridMap::filled(config.map_width.max(1), config.map_height.max(1), Tile::Empty);
        let explored = ExploredGrid::new(map.width(), map.height());
        Self {
            rng: ChaCha8Rng::seed_from_u64(derive_labeled_seed(seed, GAMEPLAY_STREAM)),
            config,
            seed,
            ids: IdAllocator::default(),
            pose: Pose::new(0.0, 0.0, 0.0),
            members: Vec::new(),
            active_index: 0,
            dungeon_level: 0,
            map,
            explored,
            enemies: Vec::new(),
            floor_items: Vec::new(),
            phase: TurnPhase::Uninitialized,
            elapsed: Duration::ZERO,
            active: false,
        }
    }

    fn enemy_index_at(&self, tile: TileCoord) -> Option<usize> {
        self.enemies
            .iter()
            .position(|enemy| enemy.is_alive() && enemy.tile == tile)
    }

    fn living_members(&self) -> usize {
        self.members
            .iter()
            .filter(|member| member.is_alive())
            .count()
    }

    fn place_on_floor(&mut self, item: Item, tile: TileCoord) {
        self.floor_items.push(FloorItem { item, tile });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Invalid commands leave the world untouched and report
/// [`Event::ActionRejected`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartGame { party } => world.start_game(party, out_events),
        Command::Tick { dt } => {
            if world.active {
                world.elapsed = world.elapsed.saturating_add(dt);
                out_events.push(Event::TimeAdvanced { dt });
            }
        }
        Command::Player(action) => world.player_action(action, out_events),
        Command::SelectCharacter { index } => world.select_character(index, out_events),
        Command::UseItem { character, slot } => world.use_item(character, slot, out_events),
        Command::EquipItem { character, slot } => world.equip_item(character, slot, out_events),
        Command::UnequipItem { character, slot } => {
            world.unequip_item(character, slot, out_events)
        }
        Command::DropItem { character, slot } => world.drop_item(character, slot, out_events),
        Command::EnemyAttack {
            enemy,
            target,
            multiplier,
        } => world.enemy_attack(enemy, target, multiplier, out_events),
        Command::EnemyStep { enemy, to } => world.enemy_step(enemy, to, out_events),
        Command::EndEnemyTurn => world.end_enemy_turn(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use deepdelve_core::{
        DungeonConfig, EnemyView, ExploredGrid, FloorItemSnapshot, GridMap, PartyMemberSnapshot,
        Pose, TurnPhase,
    };

    use super::{Character, GameSnapshot, World};

    /// Current turn phase.
    #[must_use]
    pub fn phase(world: &World) -> TurnPhase {
        world.phase
    }

    /// Reports whether a game is running. False before the first start and after game over.
    #[must_use]
    pub fn is_active(world: &World) -> bool {
        world.active
    }

    /// Reports whether input providers may deliver player actions.
    #[must_use]
    pub fn accepts_input(world: &World) -> bool {
        world.active && world.phase == TurnPhase::Player
    }

    /// Rules the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &DungeonConfig {
        &world.config
    }

    /// Base seed every level layout derives from.
    #[must_use]
    pub fn seed(world: &World) -> u64 {
        world.seed
    }

    /// Depth counter, starting at 1 once a game runs.
    #[must_use]
    pub fn dungeon_level(world: &World) -> u32 {
        world.dungeon_level
    }

    /// Time spent in the running game.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Party position and heading.
    #[must_use]
    pub fn pose(world: &World) -> Pose {
        world.pose
    }

    /// Current level layout.
    #[must_use]
    pub fn map(world: &World) -> &GridMap {
        &world.map
    }

    /// Tiles the party has seen on this level.
    #[must_use]
    pub fn explored(world: &World) -> &ExploredGrid {
        &world.explored
    }

    /// Party members in formation order.
    #[must_use]
    pub fn party(world: &World) -> &[Character] {
        &world.members
    }

    /// Index of the member whose action is expected next.
    #[must_use]
    pub fn active_index(world: &World) -> usize {
        world.active_index
    }

    /// Summary of every party member for target selection.
    #[must_use]
    pub fn party_view(world: &World) -> Vec<PartyMemberSnapshot> {
        world
            .members
            .iter()
            .enumerate()
            .map(|(index, member)| PartyMemberSnapshot {
                index,
                alive: member.is_alive(),
                hp: member.current_hp(),
                max_hp: member.stats().max_hp,
            })
            .collect()
    }

    /// Captures a read-only view of the enemies on the level.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .filter(|enemy| enemy.is_alive())
                .map(|enemy| enemy.snapshot())
                .collect(),
        )
    }

    /// Items lying on the level, in the order they were placed.
    #[must_use]
    pub fn floor_items(world: &World) -> Vec<FloorItemSnapshot> {
        world
            .floor_items
            .iter()
            .map(|floor_item| FloorItemSnapshot {
                id: floor_item.item.id(),
                base: floor_item.item.base(),
                tile: floor_item.tile,
            })
            .collect()
    }

    /// Persistable projection of the whole game state.
    #[must_use]
    pub fn snapshot(world: &World) -> GameSnapshot {
        GameSnapshot::capture(world)
    }
}

/// Derives the layout seed of a dungeon level from the base seed.
#[must_use]
pub fn derive_level_seed(seed: u64, dungeon_level: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(dungeon_level.to_le_bytes());
    finalize_seed(hasher)
}

fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use deepdelve_core::{ArchetypeId, PartyMemberSpec, RejectionReason};

    use super::*;

    fn started(seed: u64) -> (World, Vec<Event>) {
        let mut world = World::new(DungeonConfig::default(), seed);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartGame {
                party: vec![
                    PartyMemberSpec::new("Brakka", ArchetypeId::Warrior),
                    PartyMemberSpec::new("Ilsa", ArchetypeId::Mage),
                ],
            },
            &mut events,
        );
        (world, events)
    }

    #[test]
    fn new_world_is_idle() {
        let world = World::new(DungeonConfig::default(), 1);
        assert_eq!(query::phase(&world), TurnPhase::Uninitialized);
        assert!(!query::is_active(&world));
        assert!(!query::accepts_input(&world));
        assert!(query::party(&world).is_empty());
    }

    #[test]
    fn start_game_enters_player_phase() {
        let (world, events) = started(5);
        assert_eq!(
            events.first(),
            Some(&Event::GameStarted { dungeon_level: 1 })
        );
        assert!(events.contains(&Event::TurnPhaseChanged {
            phase: TurnPhase::Player
        }));
        assert_eq!(query::dungeon_level(&world), 1);
        assert_eq!(query::party(&world).len(), 2);
        assert_eq!(query::party(&world)[0].gold(), 100);
        assert!(query::accepts_input(&world));

        let start = query::pose(&world).tile();
        assert_eq!(start, query::map(&world).rooms()[0].center());
        assert!(query::explored(&world).is_explored(start));
        assert_eq!(query::explored(&world).explored_count(), 9);
    }

    #[test]
    fn same_seed_builds_the_same_level() {
        let (first, _) = started(42);
        let (second, _) = started(42);
        assert_eq!(query::map(&first), query::map(&second));
        assert_eq!(query::enemy_view(&first).len(), query::enemy_view(&second).len());
        assert_eq!(query::pose(&first), query::pose(&second));
    }

    #[test]
    fn empty_party_is_rejected() {
        let mut world = World::new(DungeonConfig::default(), 1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartGame { party: Vec::new() },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::ActionRejected {
                reason: RejectionReason::EmptyParty
            }]
        );
        assert_eq!(query::phase(&world), TurnPhase::Uninitialized);
    }

    #[test]
    fn oversized_party_is_truncated() {
        let mut world = World::new(DungeonConfig::default(), 1);
        let mut events = Vec::new();
        let party = ArchetypeId::ALL
            .iter()
            .map(|archetype| PartyMemberSpec::new(archetype.key(), *archetype))
            .collect();
        apply(&mut world, Command::StartGame { party }, &mut events);
        assert_eq!(query::party(&world).len(), 4);
    }

    #[test]
    fn ticks_accumulate_only_while_active() {
        let mut world = World::new(DungeonConfig::default(), 1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::elapsed(&world), Duration::ZERO);

        let (mut world, _) = started(2);
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut events,
        );
        assert_eq!(query::elapsed(&world), Duration::from_millis(250));
    }

    #[test]
    fn level_seeds_differ_per_level() {
        assert_ne!(derive_level_seed(9, 1), derive_level_seed(9, 2));
        assert_eq!(derive_level_seed(9, 1), derive_level_seed(9, 1));
    }
}
