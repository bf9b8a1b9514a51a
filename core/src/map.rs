//! Tile grid, viewer pose and the solidity and visibility queries shared by
//! the world and the rendering systems.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single map tile expressed as column and row coordinates.
///
/// Coordinates are signed so neighbour arithmetic never wraps; tiles outside
/// the map simply resolve to [`Tile::Empty`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: i32,
    row: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Returns the coordinate shifted by the provided deltas.
    #[must_use]
    pub const fn offset(self, columns: i32, rows: i32) -> Self {
        Self::new(self.column + columns, self.row + rows)
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Computes the Chebyshev (king move) distance between two tiles.
    #[must_use]
    pub fn chebyshev_distance(self, other: TileCoord) -> u32 {
        self.column
            .abs_diff(other.column)
            .max(self.row.abs_diff(other.row))
    }

    /// World-space position of the tile's center.
    #[must_use]
    pub fn center(self) -> (f32, f32) {
        (self.column as f32 + 0.5, self.row as f32 + 0.5)
    }
}

/// Rectangular room carved into the map during generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    origin: TileCoord,
    width: u32,
    height: u32,
}

impl Room {
    /// Constructs a room from its upper-left tile and size.
    #[must_use]
    pub const fn new(origin: TileCoord, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Upper-left tile of the room.
    #[must_use]
    pub const fn origin(&self) -> TileCoord {
        self.origin
    }

    /// Width of the room in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the room in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Tile at the integer center of the room.
    #[must_use]
    pub const fn center(&self) -> TileCoord {
        self.origin
            .offset((self.width / 2) as i32, (self.height / 2) as i32)
    }

    /// Reports whether the tile lies inside the room's floor area.
    #[must_use]
    pub const fn contains(&self, tile: TileCoord) -> bool {
        tile.column() >= self.origin.column()
            && tile.row() >= self.origin.row()
            && tile.column() < self.origin.column() + self.width as i32
            && tile.row() < self.origin.row() + self.height as i32
    }

    /// Reports whether two rooms overlap once each is grown by `padding` tiles.
    #[must_use]
    pub const fn overlaps(&self, other: &Room, padding: i32) -> bool {
        let left = self.origin.column() - padding;
        let top = self.origin.row() - padding;
        let right = self.origin.column() + self.width as i32 + padding;
        let bottom = self.origin.row() + self.height as i32 + padding;

        left < other.origin.column() + other.width as i32
            && right > other.origin.column()
            && top < other.origin.row() + other.height as i32
            && bottom > other.origin.row()
    }

    /// Iterator over every tile of the room in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.height as i32).flat_map(move |row| {
            (0..self.width as i32).map(move |column| self.origin.offset(column, row))
        })
    }
}

/// Contents of a single map tile. Door and chest state is part of the kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Void outside the carved dungeon. Never walkable, never solid.
    Empty,
    /// Walkable floor.
    Floor,
    /// Solid stone wall.
    Wall,
    /// Stairs leading to the next dungeon level.
    StairsDown,
    /// Closed wooden door.
    DoorClosed,
    /// Open wooden door.
    DoorOpen,
    /// Unopened treasure chest.
    ChestClosed,
    /// Looted treasure chest.
    ChestOpen,
}

impl Tile {
    /// Reports whether the tile is a door in either state.
    #[must_use]
    pub const fn is_door(self) -> bool {
        matches!(self, Self::DoorClosed | Self::DoorOpen)
    }

    /// Reports whether the door or chest on this tile is open.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::DoorOpen | Self::ChestOpen)
    }

    /// Door tile with its open state flipped, or `None` for non-door tiles.
    #[must_use]
    pub const fn toggled_door(self) -> Option<Self> {
        match self {
            Self::DoorClosed => Some(Self::DoorOpen),
            Self::DoorOpen => Some(Self::DoorClosed),
            _ => None,
        }
    }

    /// Reports whether the player or enemies may stand on the tile, ignoring doors.
    #[must_use]
    pub const fn is_floor_like(self) -> bool {
        !matches!(self, Self::Empty | Self::Wall)
    }

    /// Character used by text renderings of the map.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => ' ',
            Self::Floor => '.',
            Self::Wall => '#',
            Self::StairsDown => '>',
            Self::DoorClosed => '+',
            Self::DoorOpen => '\'',
            Self::ChestClosed => '$',
            Self::ChestOpen => '_',
        }
    }
}

/// Errors raised when assembling a map from raw parts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapShapeError {
    /// Width or height was zero.
    #[error("map dimensions must be positive (received {width}x{height})")]
    EmptyDimensions {
        /// Provided width.
        width: u32,
        /// Provided height.
        height: u32,
    },
    /// Tile count did not match the dimensions.
    #[error("expected {expected} tiles but received {actual}")]
    TileCountMismatch {
        /// Tile count implied by the dimensions.
        expected: usize,
        /// Tile count provided.
        actual: usize,
    },
}

/// Dense row-major tile grid plus the rooms carved into it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMap {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    rooms: Vec<Room>,
}

impl GridMap {
    /// Creates a map of the provided size where every tile holds `tile`.
    #[must_use]
    pub fn filled(width: u32, height: u32, tile: Tile) -> Self {
        let count = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            tiles: vec![tile; count],
            rooms: Vec::new(),
        }
    }

    /// Reassembles a map from persisted parts, validating the tile count.
    pub fn from_parts(
        width: u32,
        height: u32,
        tiles: Vec<Tile>,
        rooms: Vec<Room>,
    ) -> Result<Self, MapShapeError> {
        if width == 0 || height == 0 {
            return Err(MapShapeError::EmptyDimensions { width, height });
        }
        let expected = (width as usize).saturating_mul(height as usize);
        if tiles.len() != expected {
            return Err(MapShapeError::TileCountMismatch {
                expected,
                actual: tiles.len(),
            });
        }

        Ok(Self {
            width,
            height,
            tiles,
            rooms,
        })
    }

    /// Attaches the generated room list to the map.
    #[must_use]
    pub fn with_rooms(mut self, rooms: Vec<Room>) -> Self {
        self.rooms = rooms;
        self
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Rooms in generation order (sorted by center column).
    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Raw row-major tiles.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Reports whether the coordinate lies within the map bounds.
    #[must_use]
    pub const fn contains(&self, column: i32, row: i32) -> bool {
        column >= 0 && row >= 0 && (column as u32) < self.width && (row as u32) < self.height
    }

    fn index(&self, column: i32, row: i32) -> Option<usize> {
        if !self.contains(column, row) {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let column = usize::try_from(column).ok()?;
        let row = usize::try_from(row).ok()?;
        Some(row * width + column)
    }

    /// Tile at the coordinate; anything outside the map is [`Tile::Empty`].
    #[must_use]
    pub fn get_tile(&self, column: i32, row: i32) -> Tile {
        self.index(column, row)
            .and_then(|index| self.tiles.get(index).copied())
            .unwrap_or(Tile::Empty)
    }

    /// Tile at the provided coordinate.
    #[must_use]
    pub fn tile_at(&self, tile: TileCoord) -> Tile {
        self.get_tile(tile.column(), tile.row())
    }

    /// Overwrites a tile, returning `false` when the coordinate is out of bounds.
    pub fn set_tile(&mut self, tile: TileCoord, value: Tile) -> bool {
        match self.index(tile.column(), tile.row()) {
            Some(index) => match self.tiles.get_mut(index) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// Walls are always solid; closed doors only when `respect_closed_doors` is set.
    #[must_use]
    pub fn is_solid(&self, column: i32, row: i32, respect_closed_doors: bool) -> bool {
        match self.get_tile(column, row) {
            Tile::Wall => true,
            Tile::DoorClosed => respect_closed_doors,
            _ => false,
        }
    }

    /// Convenience wrapper around [`GridMap::is_solid`] for tile coordinates.
    #[must_use]
    pub fn is_solid_at(&self, tile: TileCoord, respect_closed_doors: bool) -> bool {
        self.is_solid(tile.column(), tile.row(), respect_closed_doors)
    }

    /// Reports whether something standing on the tile could occupy it.
    #[must_use]
    pub fn is_walkable(&self, tile: TileCoord) -> bool {
        let kind = self.tile_at(tile);
        kind.is_floor_like() && !self.is_solid_at(tile, true)
    }

    /// Line-of-sight test from the viewer's tile to `target`.
    ///
    /// Tiles farther than `0.9 * max_ray_depth` (Manhattan) are rejected up
    /// front. The walk ignores the viewer's own tile and succeeds as soon as
    /// the target itself is reached, so a wall can be seen but not seen through.
    #[must_use]
    pub fn is_tile_visible(&self, target: TileCoord, viewer: &Pose, max_ray_depth: f32) -> bool {
        let (target_x, target_y) = (target.column() as f32, target.row() as f32);
        let manhattan = (target_x - viewer.x()).abs() + (target_y - viewer.y()).abs();
        if manhattan > max_ray_depth * 0.9 {
            return false;
        }

        let origin = viewer.tile();
        let (mut column, mut row) = (origin.column(), origin.row());
        let step_column = if column < target.column() { 1 } else { -1 };
        let step_row = if row < target.row() { 1 } else { -1 };
        let delta_column = (target.column() - column).abs();
        let delta_row = -(target.row() - row).abs();
        let mut error = delta_column + delta_row;

        loop {
            if column == target.column() && row == target.row() {
                return true;
            }
            if (column, row) != (origin.column(), origin.row()) && self.is_solid(column, row, true)
            {
                return false;
            }

            let doubled = 2 * error;
            if doubled >= delta_row {
                error += delta_row;
                column += step_column;
            }
            if doubled <= delta_column {
                error += delta_column;
                row += step_row;
            }
        }
    }

    /// Renders the map as text rows, one glyph per tile.
    #[must_use]
    pub fn to_text_rows(&self) -> Vec<String> {
        (0..self.height as i32)
            .map(|row| {
                (0..self.width as i32)
                    .map(|column| self.get_tile(column, row).glyph())
                    .collect()
            })
            .collect()
    }
}

/// Normalizes an angle in radians into `[0, 2π)`.
#[must_use]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU || !wrapped.is_finite() {
        0.0
    } else {
        wrapped
    }
}

/// Position and heading of the party within the map.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    x: f32,
    y: f32,
    angle: f32,
}

impl Pose {
    /// Creates a pose, normalizing the heading into `[0, 2π)`.
    #[must_use]
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Self {
            x,
            y,
            angle: normalize_angle(angle),
        }
    }

    /// Pose standing in the middle of `tile` facing `angle`.
    #[must_use]
    pub fn centered_on(tile: TileCoord, angle: f32) -> Self {
        let (x, y) = tile.center();
        Self::new(x, y, angle)
    }

    /// Column position in tile units.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Row position in tile units.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Heading in radians within `[0, 2π)`.
    #[must_use]
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Tile currently occupied by the viewer.
    #[must_use]
    pub fn tile(&self) -> TileCoord {
        TileCoord::new(self.x.floor() as i32, self.y.floor() as i32)
    }

    /// Unit heading vector.
    #[must_use]
    pub fn heading(&self) -> (f32, f32) {
        (self.angle.cos(), self.angle.sin())
    }

    /// Tile directly in front of the viewer, with the heading snapped to an axis.
    #[must_use]
    pub fn facing_tile(&self) -> TileCoord {
        let (dx, dy) = self.heading();
        TileCoord::new(
            (self.x + dx.round()).floor() as i32,
            (self.y + dy.round()).floor() as i32,
        )
    }

    /// Pose moved by the provided offset, keeping the heading.
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            angle: self.angle,
        }
    }

    /// Pose rotated by `delta` radians.
    #[must_use]
    pub fn rotated(&self, delta: f32) -> Self {
        Self::new(self.x, self.y, self.angle + delta)
    }
}

/// Per-tile record of which tiles the party has seen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploredGrid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl ExploredGrid {
    /// Creates a grid with every tile unexplored.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; (width as usize).saturating_mul(height as usize)],
        }
    }

    /// Rebuilds a grid from persisted cells, rejecting mismatched lengths.
    #[must_use]
    pub fn from_cells(width: u32, height: u32, cells: Vec<bool>) -> Option<Self> {
        let expected = (width as usize).saturating_mul(height as usize);
        (cells.len() == expected).then_some(Self {
            width,
            height,
            cells,
        })
    }

    /// Grid dimensions as `(width, height)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw row-major cells.
    #[must_use]
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        if tile.column() < 0
            || tile.row() < 0
            || tile.column() as u32 >= self.width
            || tile.row() as u32 >= self.height
        {
            return None;
        }
        Some(tile.row() as usize * self.width as usize + tile.column() as usize)
    }

    /// Reports whether the tile was explored. Out-of-bounds tiles never are.
    #[must_use]
    pub fn is_explored(&self, tile: TileCoord) -> bool {
        self.index(tile)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Marks a single tile explored.
    pub fn reveal(&mut self, tile: TileCoord) {
        if let Some(cell) = self.index(tile).and_then(|index| self.cells.get_mut(index)) {
            *cell = true;
        }
    }

    /// Marks the tile and its eight neighbours explored.
    pub fn reveal_around(&mut self, center: TileCoord) {
        for row in -1..=1 {
            for column in -1..=1 {
                self.reveal(center.offset(column, row));
            }
        }
    }

    /// Number of explored tiles.
    #[must_use]
    pub fn explored_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell).count()
    }
}
