#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that sweeps rays across the field of view and reports the
//! nearest door-respecting solid tile along each of them.
//!
//! Each ray runs two independent grid-line searches: one stepping across
//! horizontal grid lines and one stepping across vertical grid lines. The
//! nearer candidate wins; on equal distance the horizontal search is kept.

use std::f32::consts::PI;

use deepdelve_core::{normalize_angle, GridMap, Pose, Tile, TileCoord};
use deepdelve_rendering::TextureKey;
use glam::Vec2;

/// Tunables for the ray sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastConfig {
    /// Horizontal field of view in radians.
    pub fov: f32,
    /// Number of rays, one per screen slice.
    pub ray_count: usize,
    /// Distance in tiles after which a ray counts as a miss.
    pub max_ray_depth: f32,
    /// Scale applied to projected wall heights.
    pub wall_scale: f32,
}

impl Default for RaycastConfig {
    fn default() -> Self {
        Self {
            fov: PI / 2.8,
            ray_count: 240,
            max_ray_depth: 20.0,
            wall_scale: 0.9,
        }
    }
}

impl RaycastConfig {
    /// Angle of the ray cast for `column`, normalized into `[0, 2π)`.
    #[must_use]
    pub fn ray_angle(&self, pose: &Pose, column: usize) -> f32 {
        let start = normalize_angle(pose.angle() - self.fov / 2.0);
        if self.ray_count == 0 {
            return start;
        }
        let step = self.fov / self.ray_count as f32;
        normalize_angle(start + column as f32 * step)
    }

    /// Vertical extent of a wall slice at the corrected `distance`.
    #[must_use]
    pub fn wall_span(&self, distance: f32, screen_height: f32) -> WallSpan {
        let height = (screen_height / distance * self.wall_scale)
            .floor()
            .max(1.0);
        WallSpan {
            top: screen_height / 2.0 - height / 2.0,
            height,
        }
    }
}

/// Grid line family a ray crossed when it struck a wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WallFace {
    /// Struck while stepping across horizontal grid lines (a north or south face).
    Horizontal,
    /// Struck while stepping across vertical grid lines (an east or west face).
    Vertical,
}

/// Screen-space vertical extent of a wall slice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallSpan {
    /// Top edge in pixels.
    pub top: f32,
    /// Height in pixels, at least one.
    pub height: f32,
}

/// Wall struck by a single ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Screen slice the ray belongs to.
    pub column: usize,
    /// Ray angle in radians.
    pub angle: f32,
    /// Euclidean distance from the viewer to the hit point.
    pub raw_distance: f32,
    /// Distance projected onto the view direction.
    pub distance: f32,
    /// Face family that was struck.
    pub face: WallFace,
    /// Tile that stopped the ray.
    pub tile: TileCoord,
    /// Kind of that tile.
    pub tile_kind: Tile,
    /// Texture used to draw the tile.
    pub texture: TextureKey,
    /// Position of the hit along the wall face in `[0, 1)`.
    pub texture_offset: f32,
}

/// Result of a full sweep across the field of view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RaySweep {
    hits: Vec<RayHit>,
    depth_buffer: Vec<f32>,
}

impl RaySweep {
    /// Wall hits in ascending column order. Missing columns hit nothing.
    #[must_use]
    pub fn hits(&self) -> &[RayHit] {
        &self.hits
    }

    /// Corrected wall distance per column; misses hold the maximum depth.
    #[must_use]
    pub fn depth_buffer(&self) -> &[f32] {
        &self.depth_buffer
    }

    /// Hit recorded for `column`, if the ray struck anything.
    #[must_use]
    pub fn hit_at(&self, column: usize) -> Option<&RayHit> {
        self.hits
            .binary_search_by_key(&column, |hit| hit.column)
            .ok()
            .and_then(|index| self.hits.get(index))
    }
}

/// Ray sweep system that reuses the output buffers between frames.
#[derive(Clone, Debug, Default)]
pub struct Raycaster {
    config: RaycastConfig,
}

impl Raycaster {
    /// Creates a raycaster with the provided tunables.
    #[must_use]
    pub fn new(config: RaycastConfig) -> Self {
        Self { config }
    }

    /// Active tunables.
    #[must_use]
    pub fn config(&self) -> &RaycastConfig {
        &self.config
    }

    /// Casts every ray of the field of view into `out`, replacing its contents.
    pub fn cast(&self, pose: &Pose, map: &GridMap, out: &mut RaySweep) {
        let config = &self.config;
        let max_depth = config.max_ray_depth;
        out.hits.clear();
        out.depth_buffer.clear();
        out.depth_buffer.resize(config.ray_count, max_depth);

        let origin = Vec2::new(pose.x(), pose.y());
        let steps = max_depth.max(0.0).ceil() as u32;

        for column in 0..config.ray_count {
            let angle = config.ray_angle(pose, column);
            let direction = Vec2::new(angle.cos(), angle.sin());
            let horizontal = search(origin, direction, map, steps, WallFace::Horizontal);
            let vertical = search(origin, direction, map, steps, WallFace::Vertical);

            let Some(candidate) =
                nearest(horizontal, vertical).filter(|candidate| candidate.distance < max_depth)
            else {
                continue;
            };

            let corrected =
                candidate.distance * normalize_angle(angle - pose.angle()).cos();
            let distance = corrected.clamp(f32::MIN_POSITIVE, max_depth);
            out.depth_buffer[column] = distance;

            let tile_kind = map.tile_at(candidate.tile);
            out.hits.push(RayHit {
                column,
                angle,
                raw_distance: candidate.distance,
                distance,
                face: candidate.face,
                tile: candidate.tile,
                tile_kind,
                texture: TextureKey::for_tile(tile_kind),
                texture_offset: candidate.offset,
            });
        }
    }
}

/// Casts a sweep with the provided tunables.
#[must_use]
pub fn cast_rays(pose: &Pose, map: &GridMap, config: RaycastConfig) -> RaySweep {
    let mut sweep = RaySweep::default();
    Raycaster::new(config).cast(pose, map, &mut sweep);
    sweep
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    distance: f32,
    tile: TileCoord,
    face: WallFace,
    offset: f32,
}

fn nearest(horizontal: Option<Candidate>, vertical: Option<Candidate>) -> Option<Candidate> {
    match (horizontal, vertical) {
        (Some(horizontal), Some(vertical)) if vertical.distance < horizontal.distance => {
            Some(vertical)
        }
        (Some(horizontal), _) => Some(horizontal),
        (None, vertical) => vertical,
    }
}

/// Walks one family of grid lines. Vertical searches run in swapped
/// coordinates so both families share the stepping code.
fn search(
    origin: Vec2,
    direction: Vec2,
    map: &GridMap,
    steps: u32,
    face: WallFace,
) -> Option<Candidate> {
    let swap = |v: Vec2| Vec2::new(v.y, v.x);
    let (origin, direction) = match face {
        WallFace::Horizontal => (origin, direction),
        WallFace::Vertical => (swap(origin), swap(direction)),
    };
    if direction.y == 0.0 {
        return None;
    }

    let ascending = direction.y > 0.0;
    let first_line = if ascending {
        origin.y.floor() + 1.0
    } else {
        origin.y.ceil() - 1.0
    };
    let slope = direction.x / direction.y;
    let step = if ascending { 1.0 } else { -1.0 };
    let increment = Vec2::new(step * slope, step);
    let mut current = Vec2::new(origin.x + (first_line - origin.y) * slope, first_line);

    for _ in 0..steps {
        let along = current.x.floor() as i32;
        let across = current.y.floor() as i32 - i32::from(!ascending);
        let (column, row) = match face {
            WallFace::Horizontal => (along, across),
            WallFace::Vertical => (across, along),
        };
        if !map.contains(column, row) {
            return None;
        }
        if map.is_solid(column, row, true) {
            return Some(Candidate {
                distance: origin.distance(current),
                tile: TileCoord::new(column, row),
                face,
                offset: current.x - current.x.floor(),
            });
        }
        current += increment;
    }

    None
}
