use anyhow::{ensure, Result};
use deepdelve_core::{EnemyView, ExploredGrid, GridMap, Pose, TileCoord};
use deepdelve_rendering::{AssetProvider, DrawInstruction, Frame, RenderingBackend, ScreenRect};
use glam::Vec2;

/// Glyphs ordered from darkest to brightest.
const SHADE_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];
/// Brightest flat wall fill produced by the compositor.
const FLAT_WALL_PEAK: f32 = 120.0 / 255.0;
const SPRITE_GLYPH: char = '&';
const HEALTH_FILL_GLYPH: char = '=';
const HEALTH_EMPTY_GLYPH: char = '_';

/// Backend that rasterizes frames into a grid of characters.
#[derive(Clone, Debug)]
pub(crate) struct AsciiBackend {
    columns: usize,
    rows: usize,
    cells: Vec<char>,
}

impl AsciiBackend {
    /// Creates a text canvas of the provided size.
    pub(crate) fn new(columns: usize, rows: usize) -> Result<Self> {
        ensure!(
            columns > 0 && rows > 0,
            "text canvas needs at least one cell (received {columns}x{rows})"
        );
        Ok(Self {
            columns,
            rows,
            cells: vec![' '; columns * rows],
        })
    }

    /// Canvas contents of the last presented frame, one string per row.
    pub(crate) fn lines(&self) -> Vec<String> {
        self.cells
            .chunks(self.columns)
            .map(|row| row.iter().collect())
            .collect()
    }

    fn fill(&mut self, rect: &ScreenRect, scale: Vec2, glyph: char) {
        let start = (rect.origin * scale).floor().max(Vec2::ZERO);
        let end = (Vec2::new(rect.right(), rect.bottom()) * scale).ceil();
        let first_column = start.x as usize;
        let first_row = start.y as usize;
        let last_column = (end.x.max(0.0) as usize).min(self.columns);
        let last_row = (end.y.max(0.0) as usize).min(self.rows);

        for row in first_row..last_row {
            for column in first_column..last_column {
                self.cells[row * self.columns + column] = glyph;
            }
        }
    }
}

impl RenderingBackend for AsciiBackend {
    fn present(&mut self, frame: &Frame, _assets: &dyn AssetProvider) -> Result<()> {
        let size = frame.viewport().size();
        let scale = Vec2::new(self.columns as f32, self.rows as f32) / size;
        self.cells.fill(' ');

        for instruction in frame.instructions() {
            match instruction {
                DrawInstruction::Background { rect, color } => {
                    self.fill(rect, scale, shade(color.luminance()));
                }
                DrawInstruction::TexturedWall {
                    rect, brightness, ..
                } => self.fill(rect, scale, shade(*brightness)),
                DrawInstruction::FlatWall { rect, color } => {
                    self.fill(rect, scale, shade(color.luminance() / FLAT_WALL_PEAK));
                }
                DrawInstruction::Sprite { rect, .. } => self.fill(rect, scale, SPRITE_GLYPH),
                DrawInstruction::HealthBar {
                    background, fill, ..
                } => {
                    self.fill(background, scale, HEALTH_EMPTY_GLYPH);
                    self.fill(fill, scale, HEALTH_FILL_GLYPH);
                }
            }
        }
        Ok(())
    }
}

fn shade(brightness: f32) -> char {
    let top = SHADE_RAMP.len() - 1;
    let index = (brightness.clamp(0.0, 1.0) * top as f32).round() as usize;
    SHADE_RAMP[index.min(top)]
}

/// Top-down map of the explored tiles with the party and known enemies.
pub(crate) fn automap(
    map: &GridMap,
    explored: &ExploredGrid,
    pose: &Pose,
    enemies: &EnemyView,
) -> Vec<String> {
    let party = pose.tile();
    (0..map.height() as i32)
        .map(|row| {
            (0..map.width() as i32)
                .map(|column| {
                    let tile = TileCoord::new(column, row);
                    if tile == party {
                        '@'
                    } else if !explored.is_explored(tile) {
                        ' '
                    } else if enemies.at(tile).is_some() {
                        'e'
                    } else {
                        map.tile_at(tile).glyph()
                    }
                })
                .collect()
        })
        .collect()
}
