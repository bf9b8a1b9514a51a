//! Procedural level layout and population.

use std::ops::RangeInclusive;

use deepdelve_core::{
    DungeonConfig, EnemyBaseId, EnemyId, GridMap, ItemBaseId, ItemId, Room, Tile, TileCoord,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{combat::Enemy, party::Item, FloorItem};

const ROOM_PADDING: i32 = 1;
const ENEMY_SAFE_RADIUS: i32 = 3;

/// Hands out identities for enemies and items. Never reuses a value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub(crate) fn next_enemy(&mut self) -> EnemyId {
        EnemyId::new(self.bump())
    }

    pub(crate) fn next_item(&mut self) -> ItemId {
        ItemId::new(self.bump())
    }

    /// Highest identity handed out so far.
    pub(crate) fn watermark(&self) -> u32 {
        self.next
    }

    fn bump(&mut self) -> u32 {
        self.next = self.next.saturating_add(1);
        self.next
    }
}

/// Enemies and loot placed on a fresh level.
#[derive(Debug, Default)]
pub(crate) struct Population {
    pub(crate) enemies: Vec<Enemy>,
    pub(crate) items: Vec<FloorItem>,
    pub(crate) chests: Vec<TileCoord>,
}

pub(crate) fn roll<R: Rng>(rng: &mut R, range: &RangeInclusive<u32>) -> u32 {
    let (low, high) = (*range.start(), *range.end());
    if low >= high {
        return low;
    }
    rng.gen_range(low..=high)
}

/// Carves rooms and corridors into a solid grid, then adds doors and stairs.
///
/// Rooms are sorted by center column, so consecutive rooms are joined left to
/// right and the first room is the level entrance.
pub(crate) fn generate_map<R: Rng>(config: &DungeonConfig, rng: &mut R) -> GridMap {
    let width = config.map_width.max(5);
    let height = config.map_height.max(5);
    let mut map = GridMap::filled(width, height, Tile::Wall);

    let mut rooms = place_rooms(config, width, height, rng);
    if rooms.is_empty() {
        let fallback = Room::new(
            TileCoord::new((width / 4) as i32, (height / 4) as i32),
            (width / 2).max(1),
            (height / 2).max(1),
        );
        tracing::debug!(?fallback, "room placement failed, using fallback room");
        rooms.push(fallback);
    }
    rooms.sort_by_key(|room| room.center().column());

    for room in &rooms {
        for tile in room.tiles() {
            let _ = map.set_tile(tile, Tile::Floor);
        }
    }

    for pair in rooms.windows(2) {
        carve_corridor(&mut map, pair[0].center(), pair[1].center());
    }

    place_doors(&mut map, &rooms, config.door_chance, rng);

    let stairs = rooms
        .last()
        .map(Room::center)
        .unwrap_or_else(|| TileCoord::new(width as i32 - 2, height as i32 - 2));
    let _ = map.set_tile(stairs, Tile::StairsDown);

    map.with_rooms(rooms)
}

fn place_rooms<R: Rng>(config: &DungeonConfig, width: u32, height: u32, rng: &mut R) -> Vec<Room> {
    let target = roll(rng, &config.room_count);
    let mut rooms: Vec<Room> = Vec::new();

    for _ in 0..target {
        for _ in 0..config.room_attempts.max(1) {
            let room_width = roll(rng, &config.room_size).max(1);
            let room_height = roll(rng, &config.room_size).max(1);
            let max_column = width as i32 - room_width as i32 - 2;
            let max_row = height as i32 - room_height as i32 - 2;
            if max_column < 1 || max_row < 1 {
                continue;
            }

            let origin = TileCoord::new(rng.gen_range(1..=max_column), rng.gen_range(1..=max_row));
            let candidate = Room::new(origin, room_width, room_height);
            if rooms
                .iter()
                .all(|room| !room.overlaps(&candidate, ROOM_PADDING))
            {
                rooms.push(candidate);
                break;
            }
        }
    }

    rooms
}

fn carve_corridor(map: &mut GridMap, from: TileCoord, to: TileCoord) {
    let (left, right) = ordered(from.column(), to.column());
    for column in left..=right {
        let _ = map.set_tile(TileCoord::new(column, from.row()), Tile::Floor);
    }

    let (top, bottom) = ordered(from.row(), to.row());
    for row in top..=bottom {
        let _ = map.set_tile(TileCoord::new(to.column(), row), Tile::Floor);
    }
}

fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn place_doors<R: Rng>(map: &mut GridMap, rooms: &[Room], chance: f32, rng: &mut R) {
    for room in rooms {
        let left = room.origin().column() - 1;
        let top = room.origin().row() - 1;
        let right = room.origin().column() + room.width() as i32;
        let bottom = room.origin().row() + room.height() as i32;

        for row in top..=bottom {
            for column in left..=right {
                let on_border = column == left || column == right || row == top || row == bottom;
                if !on_border || map.get_tile(column, row) != Tile::Wall {
                    continue;
                }

                let floor = |c: i32, r: i32| map.get_tile(c, r) == Tile::Floor;
                let within_rows = row >= room.origin().row() && row < bottom;
                let within_columns = column >= room.origin().column() && column < right;
                let spans_horizontally =
                    floor(column - 1, row) && floor(column + 1, row) && within_rows;
                let spans_vertically =
                    floor(column, row - 1) && floor(column, row + 1) && within_columns;

                if (spans_horizontally || spans_vertically) && rng.gen::<f32>() < chance {
                    let _ = map.set_tile(TileCoord::new(column, row), Tile::DoorClosed);
                }
            }
        }
    }
}

/// Places enemies, floor loot and chests for a level.
///
/// Enemies avoid the first room and keep their distance from `entrance`.
/// Every placement gets a bounded number of attempts and is skipped when
/// they run out.
pub(crate) fn populate<R: Rng>(
    map: &mut GridMap,
    dungeon_level: u32,
    entrance: TileCoord,
    config: &DungeonConfig,
    ids: &mut IdAllocator,
    rng: &mut R,
) -> Population {
    let mut population = Population::default();
    let rooms: Vec<Room> = map.rooms().to_vec();
    let room_count = rooms.len() as f32;
    let attempts = config.spawn_attempts.max(1);

    let later_rooms = rooms.get(1..).unwrap_or(&[]);
    if !later_rooms.is_empty() {
        let enemy_count = roll(
            rng,
            &((room_count * 0.4).floor() as u32..=(room_count * 0.7).floor() as u32),
        );
        for _ in 0..enemy_count {
            for _ in 0..attempts {
                let room = later_rooms[rng.gen_range(0..later_rooms.len())];
                let tile = random_tile_in(&room, rng);
                let far_enough = (tile.column() - entrance.column()).abs() > ENEMY_SAFE_RADIUS
                    || (tile.row() - entrance.row()).abs() > ENEMY_SAFE_RADIUS;
                if map.tile_at(tile) != Tile::Floor
                    || !far_enough
                    || population.enemies.iter().any(|enemy| enemy.tile == tile)
                {
                    continue;
                }

                let base = EnemyBaseId::ALL[rng.gen_range(0..EnemyBaseId::ALL.len())];
                population.enemies.push(Enemy::instantiate(
                    base,
                    dungeon_level,
                    ids.next_enemy(),
                    tile,
                ));
                break;
            }
        }
    }

    if !rooms.is_empty() {
        let item_count = roll(
            rng,
            &((room_count * 0.15).floor() as u32..=(room_count * 0.35).floor() as u32),
        );
        for _ in 0..item_count {
            for _ in 0..attempts {
                let room = rooms[rng.gen_range(0..rooms.len())];
                let tile = random_tile_in(&room, rng);
                if map.tile_at(tile) != Tile::Floor || population.is_taken(tile) {
                    continue;
                }

                let base = random_item_base(rng);
                population.items.push(FloorItem {
                    item: Item::instantiate(base, dungeon_level, ids.next_item()),
                    tile,
                });
                break;
            }
        }
    }

    if !later_rooms.is_empty() {
        let chest_count = rng.gen_range(0..=(rooms.len() / 4) as u32);
        for _ in 0..chest_count {
            for _ in 0..attempts {
                let room = later_rooms[rng.gen_range(0..later_rooms.len())];
                let tile = random_tile_in(&room, rng);
                if map.tile_at(tile) != Tile::Floor || population.is_taken(tile) {
                    continue;
                }

                let _ = map.set_tile(tile, Tile::ChestClosed);
                population.chests.push(tile);
                break;
            }
        }
    }

    population
}

impl Population {
    fn is_taken(&self, tile: TileCoord) -> bool {
        self.enemies.iter().any(|enemy| enemy.tile == tile)
            || self.items.iter().any(|floor_item| floor_item.tile == tile)
    }
}

fn random_tile_in<R: Rng>(room: &Room, rng: &mut R) -> TileCoord {
    room.origin().offset(
        rng.gen_range(0..room.width().max(1)) as i32,
        rng.gen_range(0..room.height().max(1)) as i32,
    )
}

/// Uniform pick over every item base.
pub(crate) fn random_item_base<R: Rng>(rng: &mut R) -> ItemBaseId {
    ItemBaseId::ALL[rng.gen_range(0..ItemBaseId::ALL.len())]
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn reachable_from(map: &GridMap, start: TileCoord) -> Vec<bool> {
        let width = map.width() as i32;
        let mut seen = vec![false; map.tiles().len()];
        let mut queue = VecDeque::from([start]);
        seen[(start.row() * width + start.column()) as usize] = true;

        while let Some(tile) = queue.pop_front() {
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let next = tile.offset(dx, dy);
                if !map.is_walkable(next) {
                    continue;
                }
                let index = (next.row() * width + next.column()) as usize;
                if !seen[index] {
                    seen[index] = true;
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    #[test]
    fn generated_rooms_never_overlap() {
        let config = DungeonConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let map = generate_map(&config, &mut rng);

        assert!(!map.rooms().is_empty());
        for (index, room) in map.rooms().iter().enumerate() {
            for other in &map.rooms()[index + 1..] {
                assert!(!room.overlaps(other, 0));
            }
        }
    }

    #[test]
    fn rooms_are_sorted_by_center_column() {
        let config = DungeonConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let map = generate_map(&config, &mut rng);
        let columns: Vec<i32> = map.rooms().iter().map(|room| room.center().column()).collect();
        let mut sorted = columns.clone();
        sorted.sort_unstable();
        assert_eq!(columns, sorted);
    }

    #[test]
    fn stairs_sit_in_the_last_room() {
        let config = DungeonConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let map = generate_map(&config, &mut rng);
        let last = map.rooms().last().copied().expect("at least one room");
        assert_eq!(map.tile_at(last.center()), Tile::StairsDown);
    }

    #[test]
    fn tiny_maps_fall_back_to_a_single_room() {
        let config = DungeonConfig {
            map_width: 8,
            map_height: 8,
            room_size: 6..=6,
            ..DungeonConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let map = generate_map(&config, &mut rng);

        assert_eq!(
            map.rooms(),
            &[Room::new(TileCoord::new(2, 2), 4, 4)]
        );
        assert_eq!(map.tile_at(TileCoord::new(4, 4)), Tile::StairsDown);
        assert_eq!(map.tile_at(TileCoord::new(2, 2)), Tile::Floor);
    }

    #[test]
    fn every_room_is_reachable_from_the_first() {
        let config = DungeonConfig::default();
        for seed in 0..16 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let map = generate_map(&config, &mut rng);
            let start = map.rooms()[0].center();
            let seen = reachable_from(&map, start);
            for room in map.rooms() {
                for tile in room.tiles() {
                    let index = (tile.row() * map.width() as i32 + tile.column()) as usize;
                    assert!(seen[index], "seed {seed}: {tile:?} unreachable");
                }
            }
        }
    }

    #[test]
    fn population_respects_placement_rules() {
        let config = DungeonConfig::default();
        let mut ids = IdAllocator::default();
        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut map = generate_map(&config, &mut rng);
            let entrance = map.rooms()[0].center();
            let population = populate(&mut map, 2, entrance, &config, &mut ids, &mut rng);

            for enemy in &population.enemies {
                assert!(!map.rooms()[0].contains(enemy.tile) || map.rooms().len() == 1);
                let far = (enemy.tile.column() - entrance.column()).abs() > 3
                    || (enemy.tile.row() - entrance.row()).abs() > 3;
                assert!(far);
                assert_eq!(map.tile_at(enemy.tile), Tile::Floor);
            }
            for floor_item in &population.items {
                assert!(population
                    .enemies
                    .iter()
                    .all(|enemy| enemy.tile != floor_item.tile));
            }
            for chest in &population.chests {
                assert_eq!(map.tile_at(*chest), Tile::ChestClosed);
            }
            let max_enemies = (map.rooms().len() as f32 * 0.7).floor() as usize;
            assert!(population.enemies.len() <= max_enemies);
        }
    }

    #[test]
    fn allocator_never_repeats() {
        let mut ids = IdAllocator::default();
        let first = ids.next_enemy();
        let second = ids.next_item();
        assert_ne!(first.get(), second.get());
    }
}
