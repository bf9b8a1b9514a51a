#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Deepdelve adapters.
//!
//! Systems describe a frame as an ordered list of [`DrawInstruction`]s in
//! screen space. Adapters resolve raster handles through an
//! [`AssetProvider`] and push finished frames to a [`RenderingBackend`].

use anyhow::Result as AnyResult;
use deepdelve_core::Tile;
use glam::Vec2;
use std::{collections::HashMap, error::Error, fmt};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Creates an opaque color from a `0xRRGGBB` literal.
    #[must_use]
    pub const fn from_hex(rgb: u32) -> Self {
        Self::from_rgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Returns the color with its RGB channels multiplied by `factor`.
    #[must_use]
    pub fn shaded(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        Self {
            red: self.red * factor,
            green: self.green * factor,
            blue: self.blue * factor,
            alpha: self.alpha,
        }
    }

    /// Perceived brightness in the range 0.0..=1.0.
    #[must_use]
    pub fn luminance(self) -> f32 {
        (0.299 * self.red + 0.587 * self.green + 0.114 * self.blue).clamp(0.0, 1.0)
    }
}

/// Pixel dimensions of the render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    /// Creates a viewport, rejecting zero-sized targets.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderingError> {
        if width == 0 || height == 0 {
            return Err(RenderingError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as a vector.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Axis-aligned rectangle in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenRect {
    /// Upper-left corner.
    pub origin: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl ScreenRect {
    /// Creates a rectangle from its corner and size.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.x
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.y
    }
}

/// Texture identifiers used for map surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKey {
    /// Plain stone wall.
    WallStone,
    /// Stone floor.
    FloorStone,
    /// Closed wooden door.
    DoorClosed,
    /// Open wooden door.
    DoorOpen,
    /// Unopened chest.
    ChestClosed,
    /// Looted chest.
    ChestOpen,
    /// Stairs leading down.
    StairsDown,
}

impl TextureKey {
    /// Texture used to draw a tile of the provided kind.
    #[must_use]
    pub const fn for_tile(tile: Tile) -> Self {
        match tile {
            Tile::DoorClosed => Self::DoorClosed,
            Tile::DoorOpen => Self::DoorOpen,
            Tile::ChestClosed => Self::ChestClosed,
            Tile::ChestOpen => Self::ChestOpen,
            Tile::StairsDown => Self::StairsDown,
            Tile::Floor => Self::FloorStone,
            Tile::Wall | Tile::Empty => Self::WallStone,
        }
    }

    /// Asset identifier looked up in asset tables.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::WallStone => "wall-stone",
            Self::FloorStone => "floor-stone",
            Self::DoorClosed => "door-wood-closed",
            Self::DoorOpen => "door-wood-open",
            Self::ChestClosed => "chest-closed",
            Self::ChestOpen => "chest-open",
            Self::StairsDown => "stairs-down",
        }
    }
}

/// Opaque reference to a decoded raster owned by an adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RasterHandle {
    id: u32,
    width: u32,
    height: u32,
}

impl RasterHandle {
    /// Handle returned for every unknown asset.
    pub const PLACEHOLDER: Self = Self {
        id: 0,
        width: 1,
        height: 1,
    };

    /// Adapter-assigned identifier. Zero is reserved for the placeholder.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Raster width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Raster height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the handle stands in for a missing asset.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        self.id == 0
    }
}

/// Source of decoded textures and sprites.
///
/// Lookups never fail; unknown identifiers resolve to
/// [`RasterHandle::PLACEHOLDER`].
pub trait AssetProvider {
    /// Resolves a map surface texture.
    fn resolve_texture(&self, key: TextureKey) -> RasterHandle;

    /// Resolves a billboard sprite by asset identifier.
    fn resolve_sprite(&self, sprite: &str) -> RasterHandle;
}

/// Provider without any assets; everything resolves to the placeholder.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaceholderAssets;

impl AssetProvider for PlaceholderAssets {
    fn resolve_texture(&self, _key: TextureKey) -> RasterHandle {
        RasterHandle::PLACEHOLDER
    }

    fn resolve_sprite(&self, _sprite: &str) -> RasterHandle {
        RasterHandle::PLACEHOLDER
    }
}

/// In-memory registry of decoded assets keyed by identifier.
#[derive(Clone, Debug, Default)]
pub struct AssetTable {
    entries: HashMap<String, RasterHandle>,
}

impl AssetTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an asset and returns its handle. Re-registering an
    /// identifier keeps the existing handle id but updates its size.
    pub fn register<T>(&mut self, id: T, width: u32, height: u32) -> RasterHandle
    where
        T: Into<String>,
    {
        let next_id = u32::try_from(self.entries.len())
            .unwrap_or(u32::MAX - 1)
            .saturating_add(1);
        let entry = self.entries.entry(id.into()).or_insert(RasterHandle {
            id: next_id,
            width,
            height,
        });
        entry.width = width;
        entry.height = height;
        *entry
    }

    /// Number of registered assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no asset has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, id: &str) -> RasterHandle {
        self.entries
            .get(id)
            .copied()
            .unwrap_or(RasterHandle::PLACEHOLDER)
    }
}

impl AssetProvider for AssetTable {
    fn resolve_texture(&self, key: TextureKey) -> RasterHandle {
        self.lookup(key.id())
    }

    fn resolve_sprite(&self, sprite: &str) -> RasterHandle {
        self.lookup(sprite)
    }
}

/// Compositing layer of an instruction. Frames are ordered by layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    /// Ceiling and floor fills.
    Background,
    /// Wall columns.
    Walls,
    /// Billboard sprites.
    Sprites,
    /// Health bars and other markers drawn over sprites.
    Overlays,
}

/// Single screen-space drawing operation.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawInstruction {
    /// Solid ceiling or floor fill.
    Background {
        /// Area to fill.
        rect: ScreenRect,
        /// Fill color.
        color: Color,
    },
    /// One texel column of a wall texture stretched over a screen slice.
    TexturedWall {
        /// Wall texture.
        texture: RasterHandle,
        /// Texel column sampled from the texture.
        texel_column: u32,
        /// Destination slice.
        rect: ScreenRect,
        /// Light factor in `0.0..=1.0`.
        brightness: f32,
    },
    /// Wall slice drawn without a texture.
    FlatWall {
        /// Destination slice.
        rect: ScreenRect,
        /// Shaded fill color.
        color: Color,
    },
    /// Visible part of a billboard sprite.
    Sprite {
        /// Sprite raster.
        sprite: RasterHandle,
        /// Destination rectangle covering the visible columns.
        rect: ScreenRect,
        /// Horizontal start of the sampled region as a fraction of the sprite.
        source_start: f32,
        /// Width of the sampled region as a fraction of the sprite.
        source_width: f32,
        /// Light factor in `0.0..=1.0`.
        brightness: f32,
    },
    /// Health bar floating above a damaged enemy.
    HealthBar {
        /// Full bar extent.
        background: ScreenRect,
        /// Color of the empty part of the bar.
        background_color: Color,
        /// Filled portion proportional to remaining health.
        fill: ScreenRect,
        /// Fill color.
        color: Color,
    },
}

impl DrawInstruction {
    /// Layer the instruction belongs to.
    #[must_use]
    pub const fn layer(&self) -> Layer {
        match self {
            Self::Background { .. } => Layer::Background,
            Self::TexturedWall { .. } | Self::FlatWall { .. } => Layer::Walls,
            Self::Sprite { .. } => Layer::Sprites,
            Self::HealthBar { .. } => Layer::Overlays,
        }
    }
}

/// Ordered instructions describing one rendered view.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    viewport: Viewport,
    instructions: Vec<DrawInstruction>,
}

impl Frame {
    /// Creates an empty frame for the viewport.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            instructions: Vec::new(),
        }
    }

    /// Target dimensions.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Instructions in drawing order.
    #[must_use]
    pub fn instructions(&self) -> &[DrawInstruction] {
        &self.instructions
    }

    /// Appends an instruction.
    pub fn push(&mut self, instruction: DrawInstruction) {
        self.instructions.push(instruction);
    }

    /// Removes every instruction while keeping the allocation.
    pub fn clear(&mut self) {
        self.instructions.clear();
    }

    /// Reports whether layers never go backwards in drawing order.
    #[must_use]
    pub fn is_layered(&self) -> bool {
        self.instructions
            .windows(2)
            .all(|pair| pair[0].layer() <= pair[1].layer())
    }
}

/// Rendering backend capable of presenting Deepdelve frames.
pub trait RenderingBackend {
    /// Presents a finished frame, resolving rasters through `assets`.
    fn present(&mut self, frame: &Frame, assets: &dyn AssetProvider) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Viewports need a positive width and height.
    InvalidViewport {
        /// Provided width.
        width: u32,
        /// Provided height.
        height: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidViewport { width, height } => {
                write!(
                    f,
                    "viewport dimensions must be positive (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
