//! Persistable projection of the world.

use std::time::Duration;

use deepdelve_core::{
    DungeonConfig, EnemyId, ExploredGrid, GridMap, MapShapeError, Pose, Room, Tile, TileCoord,
    TurnPhase,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    combat::Enemy, derive_labeled_seed, derive_level_seed, generation::IdAllocator,
    party::Character, FloorItem, World,
};

const SNAPSHOT_VERSION: u32 = 1;

const RESTORE_STREAM: &str = "restore";

/// Tile grid reduced to plain data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct MapRecord {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    rooms: Vec<Room>,
}

/// Structural copy of the game state without live references.
///
/// Derived character statistics are not persisted; [`World::restore`]
/// recomputes them from archetype, level and equipment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    version: u32,
    config: DungeonConfig,
    seed: u64,
    ids: IdAllocator,
    dungeon_level: u32,
    phase: TurnPhase,
    active: bool,
    active_index: usize,
    elapsed: Duration,
    pose: Pose,
    map: MapRecord,
    explored: ExploredGrid,
    party: Vec<Character>,
    enemies: Vec<Enemy>,
    floor_items: Vec<FloorItem>,
}

impl GameSnapshot {
    pub(crate) fn capture(world: &World) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            config: world.config.clone(),
            seed: world.seed,
            ids: world.ids.clone(),
            dungeon_level: world.dungeon_level,
            phase: world.phase,
            active: world.active,
            active_index: world.active_index,
            elapsed: world.elapsed,
            pose: world.pose,
            map: MapRecord {
                width: world.map.width(),
                height: world.map.height(),
                tiles: world.map.tiles().to_vec(),
                rooms: world.map.rooms().to_vec(),
            },
            explored: world.explored.clone(),
            party: world.members.clone(),
            enemies: world.enemies.clone(),
            floor_items: world.floor_items.clone(),
        }
    }

    /// Dungeon level stored in the snapshot.
    #[must_use]
    pub fn dungeon_level(&self) -> u32 {
        self.dungeon_level
    }

    /// Turn phase stored in the snapshot.
    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }
}

/// Reasons a snapshot cannot be turned back into a world.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// Snapshot written by an unknown format version.
    #[error("unsupported snapshot version {found}")]
    UnsupportedVersion {
        /// Version found in the snapshot.
        found: u32,
    },
    /// Tile data does not describe a valid map.
    #[error("invalid map: {0}")]
    Map(#[from] MapShapeError),
    /// Explored grid dimensions differ from the map.
    #[error("explored grid is {explored:?} but the map is {map:?}")]
    ExploredMismatch {
        /// Explored grid dimensions.
        explored: (u32, u32),
        /// Map dimensions.
        map: (u32, u32),
    },
    /// A running game without party members.
    #[error("snapshot of a running game has no party")]
    EmptyParty,
    /// Active member index points outside the party.
    #[error("active member {index} outside a party of {len}")]
    ActiveIndexOutOfRange {
        /// Stored active index.
        index: usize,
        /// Party size.
        len: usize,
    },
    /// An entity sits outside the map.
    #[error("entity at {tile:?} lies outside the map")]
    OutOfBounds {
        /// Offending tile.
        tile: TileCoord,
    },
    /// A party member's life flag disagrees with their hit points.
    #[error("party member {index} has {hp} hp but alive is {alive}")]
    InconsistentMember {
        /// Position in the party.
        index: usize,
        /// Stored hit points.
        hp: i32,
        /// Stored life flag.
        alive: bool,
    },
    /// An enemy stands on a tile nothing can occupy.
    #[error("enemy {enemy:?} stands on blocked tile {tile:?}")]
    EnemyOnBlockedTile {
        /// Offending enemy.
        enemy: EnemyId,
        /// Its tile.
        tile: TileCoord,
    },
}

impl World {
    /// Rebuilds a world from a snapshot after validating its structure.
    pub fn restore(snapshot: GameSnapshot) -> Result<Self, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
            });
        }

        let record = snapshot.map;
        let map = GridMap::from_parts(record.width, record.height, record.tiles, record.rooms)?;
        let map_dimensions = (map.width(), map.height());
        if snapshot.explored.dimensions() != map_dimensions {
            return Err(SnapshotError::ExploredMismatch {
                explored: snapshot.explored.dimensions(),
                map: map_dimensions,
            });
        }

        if snapshot.phase != TurnPhase::Uninitialized {
            if snapshot.party.is_empty() {
                return Err(SnapshotError::EmptyParty);
            }
            if snapshot.active_index >= snapshot.party.len() {
                return Err(SnapshotError::ActiveIndexOutOfRange {
                    index: snapshot.active_index,
                    len: snapshot.party.len(),
                });
            }
        }

        let in_bounds = |tile: TileCoord| map.contains(tile.column(), tile.row());
        let stray = std::iter::once(snapshot.pose.tile())
            .chain(snapshot.enemies.iter().map(|enemy| enemy.tile))
            .chain(snapshot.floor_items.iter().map(|floor_item| floor_item.tile))
            .find(|tile| !in_bounds(*tile));
        if let Some(tile) = stray.filter(|_| snapshot.phase != TurnPhase::Uninitialized) {
            return Err(SnapshotError::OutOfBounds { tile });
        }

        if let Some((index, member)) = snapshot
            .party
            .iter()
            .enumerate()
            .find(|(_, member)| member.is_alive() != (member.current_hp() > 0))
        {
            return Err(SnapshotError::InconsistentMember {
                index,
                hp: member.current_hp(),
                alive: member.is_alive(),
            });
        }

        if let Some(enemy) = snapshot
            .enemies
            .iter()
            .find(|enemy| !map.is_walkable(enemy.tile))
        {
            return Err(SnapshotError::EnemyOnBlockedTile {
                enemy: enemy.id,
                tile: enemy.tile,
            });
        }

        let mut party = snapshot.party;
        for member in &mut party {
            member.recalculate();
        }

        let level_seed = derive_level_seed(snapshot.seed, snapshot.dungeon_level);
        let restore_seed =
            derive_labeled_seed(level_seed, RESTORE_STREAM) ^ u64::from(snapshot.ids.watermark());

        tracing::info!(
            dungeon_level = snapshot.dungeon_level,
            party = party.len(),
            "world restored from snapshot"
        );

        Ok(Self {
            config: snapshot.config,
            seed: snapshot.seed,
            rng: ChaCha8Rng::seed_from_u64(restore_seed),
            ids: snapshot.ids,
            pose: snapshot.pose,
            members: party,
            active_index: snapshot.active_index,
            dungeon_level: snapshot.dungeon_level,
            map,
            explored: snapshot.explored,
            enemies: snapshot.enemies,
            floor_items: snapshot.floor_items,
            phase: snapshot.phase,
            elapsed: snapshot.elapsed,
            active: snapshot.active,
        })
    }
}
