#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns a ray sweep and the visible entities into an
//! ordered list of draw instructions.
//!
//! Frames are composed back to front: ceiling and floor fills, one wall
//! slice per ray hit, billboard sprites from the farthest to the nearest,
//! and finally overlays such as enemy health bars. Sprites are clipped per
//! ray column against the depth buffer of the sweep.

use std::f32::consts::{PI, TAU};

use deepdelve_core::{
    normalize_angle, EnemyId, EnemyView, ExploredGrid, FloorItemSnapshot, GridMap, ItemId, Pose,
    TileCoord,
};
use deepdelve_rendering::{
    AssetProvider, Color, DrawInstruction, Frame, ScreenRect, Viewport,
};
use deepdelve_system_raycaster::{RaySweep, RaycastConfig, WallFace};
use glam::Vec2;

/// Colors used for fills and overlays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Upper half of the view.
    pub ceiling: Color,
    /// Lower half of the view.
    pub floor: Color,
    /// Empty part of a health bar.
    pub health_background: Color,
    /// Health above 60 %.
    pub health_high: Color,
    /// Health above 30 %.
    pub health_mid: Color,
    /// Health at or below 30 %.
    pub health_low: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ceiling: Color::from_hex(0x221e18),
            floor: Color::from_hex(0x403325),
            health_background: Color::from_hex(0x3a1a1a),
            health_high: Color::from_hex(0x33dd33),
            health_mid: Color::from_hex(0xd4af37),
            health_low: Color::from_hex(0xcc3333),
        }
    }
}

/// Scaling, clipping and shading constants of the compositor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionConfig {
    /// Nominal texture edge in texels.
    pub texture_size: u32,
    /// Sprite size relative to a wall tile.
    pub sprite_scale: f32,
    /// Extra factor applied to projected sprite heights.
    pub sprite_height_scale: f32,
    /// Smallest sprite height in pixels.
    pub min_sprite_height: f32,
    /// Largest sprite height as a multiple of the screen height.
    pub max_sprite_height_ratio: f32,
    /// Downward shift of sprites, as a fraction of `screen_h / distance`.
    pub sprite_lift: f32,
    /// Sprites closer than this are skipped.
    pub near_clip: f32,
    /// Sprites farther than `max_ray_depth - far_clip_margin` are skipped.
    pub far_clip_margin: f32,
    /// Angular slack beyond half the field of view, in radians.
    pub fov_margin: f32,
    /// Vertical offset of floor items as a fraction of their height.
    pub item_z_offset: f32,
    /// Sprites closer than this to the viewer are treated as behind the camera.
    pub min_sprite_depth: f32,
    /// Wall light reaches zero at this fraction of the ray depth.
    pub wall_light_falloff: f32,
    /// Darkest wall brightness.
    pub wall_min_brightness: f32,
    /// Brightness factor for faces struck across horizontal grid lines.
    pub horizontal_face_shade: f32,
    /// Sprite light reaches zero at this fraction of the ray depth.
    pub sprite_light_falloff: f32,
    /// Darkest sprite brightness.
    pub sprite_min_brightness: f32,
    /// Damaged enemies closer than this show a health bar.
    pub health_bar_range: f32,
    /// Fill colors.
    pub palette: Palette,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            texture_size: 128,
            sprite_scale: 0.8,
            sprite_height_scale: 0.9,
            min_sprite_height: 15.0,
            max_sprite_height_ratio: 1.1,
            sprite_lift: 0.1,
            near_clip: 0.3,
            far_clip_margin: 0.5,
            fov_margin: 5.0_f32.to_radians(),
            item_z_offset: -0.2,
            min_sprite_depth: 0.1,
            wall_light_falloff: 0.8,
            wall_min_brightness: 0.2,
            horizontal_face_shade: 0.85,
            sprite_light_falloff: 0.7,
            sprite_min_brightness: 0.25,
            health_bar_range: 10.0,
            palette: Palette::default(),
        }
    }
}

/// Entity a billboard sprite stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteSource {
    /// Living enemy.
    Enemy {
        /// Enemy identity.
        id: EnemyId,
        /// Current hit points.
        hp: i32,
        /// Hit points at spawn.
        max_hp: i32,
    },
    /// Item lying on the floor.
    Item {
        /// Item identity.
        id: ItemId,
    },
}

/// Billboard sprite positioned on screen but not yet clipped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenSprite {
    /// Entity drawn.
    pub source: SpriteSource,
    /// Sprite asset identifier.
    pub sprite: &'static str,
    /// Tile the entity occupies.
    pub tile: TileCoord,
    /// Euclidean distance from the viewer to the tile center.
    pub distance: f32,
    /// Signed angle between the view direction and the sprite, in `(-π, π]`.
    pub angle_offset: f32,
    /// Horizontal screen position of the sprite center.
    pub screen_x: f32,
    /// Vertical offset as a fraction of the sprite height.
    pub z_offset: f32,
}

/// Compositor that keeps scratch buffers between frames.
#[derive(Clone, Debug, Default)]
pub struct Projection {
    raycast: RaycastConfig,
    config: ProjectionConfig,
    overlays: Vec<DrawInstruction>,
}

impl Projection {
    /// Creates a compositor matching the sweep produced with `raycast`.
    #[must_use]
    pub fn new(raycast: RaycastConfig, config: ProjectionConfig) -> Self {
        Self {
            raycast,
            config,
            overlays: Vec::new(),
        }
    }

    /// Active constants.
    #[must_use]
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Collects the enemies and floor items that may appear on screen,
    /// ordered from the farthest to the nearest.
    ///
    /// Entities on tiles that are neither visible from the pose nor explored
    /// are skipped, as are entities too close, too far or outside the field
    /// of view.
    #[allow(clippy::too_many_arguments)]
    pub fn prepare_sprites(
        &self,
        pose: &Pose,
        enemies: &EnemyView,
        items: &[FloorItemSnapshot],
        map: &GridMap,
        explored: &ExploredGrid,
        viewport: Viewport,
        out: &mut Vec<ScreenSprite>,
    ) {
        out.clear();

        let candidates = enemies
            .iter()
            .map(|enemy| {
                (
                    SpriteSource::Enemy {
                        id: enemy.id,
                        hp: enemy.hp,
                        max_hp: enemy.max_hp,
                    },
                    enemy.base.template().sprite,
                    enemy.tile,
                    0.0,
                )
            })
            .chain(items.iter().map(|item| {
                (
                    SpriteSource::Item { id: item.id },
                    item.base.template().sprite,
                    item.tile,
                    self.config.item_z_offset,
                )
            }));

        let max_depth = self.raycast.max_ray_depth;
        let half_width = viewport.width() as f32 / 2.0;
        let half_fov = self.raycast.fov / 2.0 + self.config.fov_margin;
        let viewer = Vec2::new(pose.x(), pose.y());

        for (source, sprite, tile, z_offset) in candidates {
            if !map.is_tile_visible(tile, pose, max_depth) && !explored.is_explored(tile) {
                continue;
            }

            let (center_x, center_y) = tile.center();
            let delta = Vec2::new(center_x, center_y) - viewer;
            let distance = delta.length();
            if distance < self.config.near_clip
                || distance > max_depth - self.config.far_clip_margin
            {
                continue;
            }

            let mut angle_offset = normalize_angle(delta.y.atan2(delta.x) - pose.angle());
            if angle_offset > PI {
                angle_offset -= TAU;
            }
            if angle_offset.abs() >= half_fov {
                continue;
            }

            out.push(ScreenSprite {
                source,
                sprite,
                tile,
                distance,
                angle_offset,
                screen_x: angle_offset.tan() * half_width + half_width,
                z_offset,
            });
        }

        out.sort_by(|left, right| right.distance.total_cmp(&left.distance));
    }

    /// Replaces the frame contents with a fully composed view.
    pub fn compose(
        &mut self,
        sweep: &RaySweep,
        sprites: &[ScreenSprite],
        assets: &dyn AssetProvider,
        frame: &mut Frame,
    ) {
        frame.clear();
        self.draw_background(frame);
        self.draw_walls(sweep, assets, frame);
        self.draw_sprites(sweep, sprites, assets, frame);
    }

    /// Fills the ceiling and floor halves.
    pub fn draw_background(&self, frame: &mut Frame) {
        let size = frame.viewport().size();
        let half = size.y / 2.0;
        let palette = &self.config.palette;
        frame.push(DrawInstruction::Background {
            rect: ScreenRect::new(0.0, 0.0, size.x, half),
            color: palette.ceiling,
        });
        frame.push(DrawInstruction::Background {
            rect: ScreenRect::new(0.0, half, size.x, size.y - half),
            color: palette.floor,
        });
    }

    /// Emits one wall slice per ray hit.
    pub fn draw_walls(&self, sweep: &RaySweep, assets: &dyn AssetProvider, frame: &mut Frame) {
        let Some(slice_width) = self.slice_width(frame.viewport()) else {
            return;
        };
        let screen_height = frame.viewport().size().y;
        let max_depth = self.raycast.max_ray_depth;
        let texture_size = self.config.texture_size.max(1);

        for hit in sweep.hits() {
            let span = self.raycast.wall_span(hit.distance, screen_height);
            let rect = ScreenRect::new(
                hit.column as f32 * slice_width,
                span.top,
                slice_width + 0.5,
                span.height,
            );

            let texture = assets.resolve_texture(hit.texture);
            if texture.is_placeholder() {
                frame.push(DrawInstruction::FlatWall {
                    rect,
                    color: fallback_wall_color(hit.distance),
                });
                continue;
            }

            let mut brightness = (1.0
                - hit.distance / (max_depth * self.config.wall_light_falloff))
                .clamp(self.config.wall_min_brightness, 1.0);
            if hit.face == WallFace::Horizontal {
                brightness *= self.config.horizontal_face_shade;
            }
            let texel_column = ((hit.texture_offset * texture_size as f32).floor().max(0.0)
                as u32)
                .min(texture_size - 1);

            frame.push(DrawInstruction::TexturedWall {
                texture,
                texel_column,
                rect,
                brightness,
            });
        }
    }

    /// Emits the visible runs of every sprite followed by health bars.
    ///
    /// `sprites` must already be ordered from the farthest to the nearest.
    pub fn draw_sprites(
        &mut self,
        sweep: &RaySweep,
        sprites: &[ScreenSprite],
        assets: &dyn AssetProvider,
        frame: &mut Frame,
    ) {
        self.overlays.clear();
        let Some(slice_width) = self.slice_width(frame.viewport()) else {
            return;
        };
        let screen_height = frame.viewport().size().y;
        let config = &self.config;
        let max_depth = self.raycast.max_ray_depth;
        let depth_buffer = sweep.depth_buffer();

        for sprite in sprites {
            let depth = sprite.distance * sprite.angle_offset.cos();
            if depth <= config.min_sprite_depth {
                continue;
            }

            let texture_size = config.texture_size.max(1) as f32;
            let height = ((texture_size * config.sprite_scale / depth)
                * (screen_height / texture_size)
                * config.sprite_height_scale)
                .clamp(
                    config.min_sprite_height,
                    (screen_height * config.max_sprite_height_ratio)
                        .max(config.min_sprite_height),
                );
            let width = height;
            let top = screen_height / 2.0 - height / 2.0
                + sprite.z_offset * height
                + screen_height / depth * config.sprite_lift;
            let left = sprite.screen_x - width / 2.0;
            let right = left + width;

            let first = (left / slice_width).floor().max(0.0) as usize;
            let last = ((right / slice_width).ceil().max(0.0) as usize).min(depth_buffer.len());
            let runs = visible_runs(depth_buffer, first, last, depth);
            if runs.is_empty() {
                continue;
            }

            let raster = assets.resolve_sprite(sprite.sprite);
            let brightness = (1.0 - depth / (max_depth * config.sprite_light_falloff))
                .clamp(config.sprite_min_brightness, 1.0);
            for (run_start, run_end) in runs {
                let visible_left = (run_start as f32 * slice_width).max(left);
                let visible_right = (run_end as f32 * slice_width).min(right);
                if visible_right <= visible_left {
                    continue;
                }
                frame.push(DrawInstruction::Sprite {
                    sprite: raster,
                    rect: ScreenRect::new(visible_left, top, visible_right - visible_left, height),
                    source_start: ((visible_left - left) / width).max(0.0),
                    source_width: (visible_right - visible_left) / width,
                    brightness,
                });
            }

            if let SpriteSource::Enemy { hp, max_hp, .. } = sprite.source {
                if hp < max_hp && sprite.distance < config.health_bar_range {
                    self.overlays.push(health_bar(
                        config,
                        sprite.screen_x,
                        top,
                        width,
                        height,
                        hp,
                        max_hp,
                    ));
                }
            }
        }

        for overlay in self.overlays.drain(..) {
            frame.push(overlay);
        }
    }

    fn slice_width(&self, viewport: Viewport) -> Option<f32> {
        (self.raycast.ray_count > 0)
            .then(|| viewport.width() as f32 / self.raycast.ray_count as f32)
    }
}

/// Flat color for walls without a texture.
fn fallback_wall_color(distance: f32) -> Color {
    let shade = (150.0 - 10.0 * distance).clamp(30.0, 120.0).floor();
    Color::from_rgb_u8(
        shade as u8,
        (shade * 0.9).floor() as u8,
        (shade * 0.8).floor() as u8,
    )
}

fn health_bar(
    config: &ProjectionConfig,
    center_x: f32,
    sprite_top: f32,
    sprite_width: f32,
    sprite_height: f32,
    hp: i32,
    max_hp: i32,
) -> DrawInstruction {
    let bar_width = (sprite_width * 0.5).clamp(20.0, 60.0);
    let bar_height = (sprite_height * 0.05).clamp(4.0, 8.0);
    let bar_x = center_x - bar_width / 2.0;
    let bar_y = sprite_top - bar_height - 3.0;
    let ratio = if max_hp > 0 {
        (hp as f32 / max_hp as f32).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let palette = &config.palette;
    let color = if ratio > 0.6 {
        palette.health_high
    } else if ratio > 0.3 {
        palette.health_mid
    } else {
        palette.health_low
    };

    DrawInstruction::HealthBar {
        background: ScreenRect::new(bar_x, bar_y, bar_width, bar_height),
        background_color: palette.health_background,
        fill: ScreenRect::new(bar_x, bar_y, bar_width * ratio, bar_height),
        color,
    }
}

/// Half-open column ranges in `first..last` where a sprite at `depth` lies
/// in front of the walls.
fn visible_runs(depth_buffer: &[f32], first: usize, last: usize, depth: f32) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut open: Option<usize> = None;
    for column in first..last {
        let visible = depth_buffer
            .get(column)
            .map_or(false, |wall| depth < *wall);
        match (visible, open) {
            (true, None) => open = Some(column),
            (false, Some(start)) => {
                runs.push((start, column));
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        runs.push((start, last));
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepdelve_core::{AiBehavior, EnemyBaseId, EnemySnapshot, ItemBaseId, Tile};
    use deepdelve_rendering::{AssetTable, Layer, PlaceholderAssets};
    use deepdelve_system_raycaster::cast_rays;

    fn hall() -> GridMap {
        let mut map = GridMap::filled(9, 5, Tile::Wall);
        for row in 1..4 {
            for column in 1..8 {
                let _ = map.set_tile(TileCoord::new(column, row), Tile::Floor);
            }
        }
        map
    }

    fn goblin(id: u32, tile: TileCoord, hp: i32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            base: EnemyBaseId::GoblinGrunt,
            tile,
            hp,
            max_hp: 30,
            behavior: AiBehavior::MeleeAggressive,
        }
    }

    fn viewport() -> Viewport {
        Viewport::new(240, 200).expect("valid viewport")
    }

    fn prepare(
        pose: &Pose,
        map: &GridMap,
        explored: &ExploredGrid,
        enemies: Vec<EnemySnapshot>,
        items: &[FloorItemSnapshot],
    ) -> Vec<ScreenSprite> {
        let projection = Projection::default();
        let mut sprites = Vec::new();
        projection.prepare_sprites(
            pose,
            &EnemyView::from_snapshots(enemies),
            items,
            map,
            explored,
            viewport(),
            &mut sprites,
        );
        sprites
    }

    #[test]
    fn sprites_are_ordered_far_to_near_and_items_sit_lower() {
        let map = hall();
        let explored = ExploredGrid::new(9, 5);
        let pose = Pose::new(1.5, 2.5, 0.0);
        let items = [FloorItemSnapshot {
            id: ItemId::new(40),
            base: ItemBaseId::PotionMinorHealing,
            tile: TileCoord::new(3, 2),
        }];
        let sprites = prepare(
            &pose,
            &map,
            &explored,
            vec![goblin(1, TileCoord::new(6, 2), 30)],
            &items,
        );

        assert_eq!(sprites.len(), 2);
        assert_eq!(sprites[0].tile, TileCoord::new(6, 2));
        assert!((sprites[0].distance - 5.0).abs() < 1e-5);
        assert!((sprites[0].screen_x - 120.0).abs() < 1e-3);
        assert!(sprites[0].z_offset.abs() < f32::EPSILON);
        assert_eq!(sprites[1].source, SpriteSource::Item { id: ItemId::new(40) });
        assert!((sprites[1].z_offset + 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn sprites_behind_too_close_or_hidden_are_skipped() {
        let mut map = hall();
        let _ = map.set_tile(TileCoord::new(4, 1), Tile::DoorClosed);
        let _ = map.set_tile(TileCoord::new(4, 2), Tile::Wall);
        let _ = map.set_tile(TileCoord::new(4, 3), Tile::Wall);
        let mut explored = ExploredGrid::new(9, 5);
        let pose = Pose::new(2.5, 2.5, 0.0);

        let enemies = vec![
            goblin(1, TileCoord::new(2, 2), 30),
            goblin(2, TileCoord::new(1, 2), 30),
            goblin(3, TileCoord::new(6, 2), 30),
        ];
        assert!(prepare(&pose, &map, &explored, enemies.clone(), &[]).is_empty());

        explored.reveal(TileCoord::new(6, 2));
        let sprites = prepare(&pose, &map, &explored, enemies, &[]);
        assert_eq!(sprites.len(), 1);
        assert_eq!(sprites[0].tile, TileCoord::new(6, 2));
    }

    #[test]
    fn unobstructed_sprite_is_drawn_whole_with_a_health_bar() {
        let map = hall();
        let explored = ExploredGrid::new(9, 5);
        let pose = Pose::new(1.5, 2.5, 0.0);
        let raycast = RaycastConfig::default();
        let sweep = cast_rays(&pose, &map, raycast);
        let sprites = prepare(&pose, &map, &explored, vec![goblin(1, TileCoord::new(4, 2), 12)], &[]);

        let mut projection = Projection::new(raycast, ProjectionConfig::default());
        let mut frame = Frame::new(viewport());
        projection.compose(&sweep, &sprites, &PlaceholderAssets, &mut frame);
        assert!(frame.is_layered());

        let drawn: Vec<_> = frame
            .instructions()
            .iter()
            .filter(|instruction| instruction.layer() == Layer::Sprites)
            .collect();
        assert_eq!(drawn.len(), 1);
        let DrawInstruction::Sprite {
            rect,
            source_start,
            source_width,
            ..
        } = drawn[0]
        else {
            panic!("expected a sprite instruction");
        };
        assert!((rect.size.y - 48.0).abs() < 1e-3);
        assert!((rect.origin.x - 96.0).abs() < 1e-3);
        assert!((rect.size.x - 48.0).abs() < 1e-3);
        assert!(source_start.abs() < 1e-5);
        assert!((source_width - 1.0).abs() < 1e-5);

        let Some(DrawInstruction::HealthBar {
            background,
            background_color,
            fill,
            color,
        }) = frame.instructions().last()
        else {
            panic!("expected a health bar last");
        };
        assert!((background.size.x - 24.0).abs() < 1e-3);
        assert!((background.size.y - 4.0).abs() < 1e-3);
        assert!((fill.size.x - 24.0 * 0.4).abs() < 1e-3);
        assert_eq!(*color, Palette::default().health_mid);
        assert_eq!(*background_color, Palette::default().health_background);
    }

    #[test]
    fn off_axis_sprites_are_lit_by_corrected_depth() {
        let mut map = GridMap::filled(16, 16, Tile::Wall);
        for row in 1..15 {
            for column in 1..15 {
                let _ = map.set_tile(TileCoord::new(column, row), Tile::Floor);
            }
        }
        let mut explored = ExploredGrid::new(16, 16);
        explored.reveal(TileCoord::new(8, 4));
        let pose = Pose::new(1.5, 1.5, 0.0);
        let raycast = RaycastConfig::default();
        let sweep = cast_rays(&pose, &map, raycast);
        let sprites = prepare(&pose, &map, &explored, vec![goblin(1, TileCoord::new(8, 4), 30)], &[]);
        assert_eq!(sprites.len(), 1);
        assert!((sprites[0].distance - 58.0_f32.sqrt()).abs() < 1e-4);

        let mut projection = Projection::new(raycast, ProjectionConfig::default());
        let mut frame = Frame::new(viewport());
        projection.compose(&sweep, &sprites, &PlaceholderAssets, &mut frame);

        let brightness: Vec<f32> = frame
            .instructions()
            .iter()
            .filter_map(|instruction| match instruction {
                DrawInstruction::Sprite { brightness, .. } => Some(*brightness),
                _ => None,
            })
            .collect();
        assert!(!brightness.is_empty());
        // Perpendicular depth is 7 on a 20 * 0.7 falloff.
        for value in brightness {
            assert!((value - 0.5).abs() < 1e-4, "brightness {value}");
        }
    }

    #[test]
    fn sprites_behind_walls_are_clipped_by_the_depth_buffer() {
        let mut map = hall();
        let _ = map.set_tile(TileCoord::new(3, 2), Tile::DoorClosed);
        let mut explored = ExploredGrid::new(9, 5);
        explored.reveal(TileCoord::new(5, 2));
        let pose = Pose::new(1.5, 2.5, 0.0);
        let raycast = RaycastConfig::default();
        let sweep = cast_rays(&pose, &map, raycast);
        let sprites = prepare(&pose, &map, &explored, vec![goblin(1, TileCoord::new(5, 2), 10)], &[]);
        assert_eq!(sprites.len(), 1);

        let mut projection = Projection::new(raycast, ProjectionConfig::default());
        let mut frame = Frame::new(viewport());
        projection.compose(&sweep, &sprites, &PlaceholderAssets, &mut frame);

        assert!(frame
            .instructions()
            .iter()
            .all(|instruction| instruction.layer() < Layer::Sprites));
    }

    #[test]
    fn textured_walls_are_shaded_by_distance_and_face() {
        let map = hall();
        let pose = Pose::new(1.5, 2.5, 0.0);
        let raycast = RaycastConfig::default();
        let sweep = cast_rays(&pose, &map, raycast);
        let mut assets = AssetTable::new();
        let stone = assets.register("wall-stone", 128, 128);

        let projection = Projection::new(raycast, ProjectionConfig::default());
        let mut frame = Frame::new(viewport());
        projection.draw_walls(&sweep, &assets, &mut frame);
        assert_eq!(frame.instructions().len(), sweep.hits().len());

        let index = sweep
            .hits()
            .iter()
            .position(|hit| hit.column == 120)
            .expect("the hall is closed");
        let center = &sweep.hits()[index];
        let DrawInstruction::TexturedWall {
            texture,
            texel_column,
            brightness,
            rect,
        } = &frame.instructions()[index]
        else {
            panic!("expected a textured wall");
        };
        assert_eq!(*texture, stone);
        assert!(*texel_column < 128);
        let expected = (1.0 - center.distance / 16.0).clamp(0.2, 1.0);
        let expected = if center.face == WallFace::Horizontal {
            expected * 0.85
        } else {
            expected
        };
        assert!((brightness - expected).abs() < 1e-5);
        assert!((rect.origin.x - 120.0).abs() < 1e-3);
        assert!((rect.size.x - 1.5).abs() < 1e-3);
    }

    #[test]
    fn missing_textures_fall_back_to_flat_shades() {
        assert_eq!(fallback_wall_color(1.0), Color::from_rgb_u8(120, 108, 96));
        assert_eq!(fallback_wall_color(10.0), Color::from_rgb_u8(50, 45, 40));
        assert_eq!(fallback_wall_color(19.0), Color::from_rgb_u8(30, 27, 24));
    }

    #[test]
    fn visible_runs_split_around_occluders() {
        let depth = [5.0, 5.0, 1.0, 1.0, 5.0, 5.0, 5.0];
        assert_eq!(visible_runs(&depth, 0, 7, 3.0), vec![(0, 2), (4, 7)]);
        assert_eq!(visible_runs(&depth, 2, 4, 3.0), Vec::<(usize, usize)>::new());
        assert_eq!(visible_runs(&depth, 5, 9, 3.0), vec![(5, 7)]);
    }
}
