//! World mesh queries
//!
//! The collision core never owns terrain. It asks the mesh for the floor
//! height and tile flags under a point and rolls back any move that would end
//! inside a wall.

use bitflags::bitflags;

use crate::foundation::math::Vec2;

bitflags! {
    /// Per-tile terrain flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TileFlags: u8 {
        /// Solid wall; nothing may stand here
        const WALL = 1 << 0;
        /// Passable for particles, blocked for characters
        const IMPASSABLE = 1 << 1;
        /// Hurts whoever stands on it (consumed outside the collision core)
        const DAMAGE = 1 << 2;
        /// Slippery floor (consumed outside the collision core)
        const SLIPPY = 1 << 3;
    }
}

impl TileFlags {
    /// Flags that block a character's move
    pub const BLOCKS_CHARACTERS: TileFlags = TileFlags::WALL.union(TileFlags::IMPASSABLE);
    /// Flags that block a particle's move
    pub const BLOCKS_PARTICLES: TileFlags = TileFlags::WALL;
}

/// Terrain queries consumed by the collision core
pub trait Mesh {
    /// Height of the floor under a world position
    fn floor_level_at(&self, x: f32, y: f32) -> f32;

    /// Tile flags under a world position; positions off the mesh report `WALL`
    fn tile_flags_at(&self, x: f32, y: f32) -> TileFlags;

    /// Size of the playable area, starting at the origin
    fn extent(&self) -> Vec2;
}

/// A rectangular grid of square tiles, each with a floor height and flags
#[derive(Debug, Clone)]
pub struct TileMesh {
    tile_size: f32,
    tiles_x: usize,
    tiles_y: usize,
    heights: Vec<f32>,
    flags: Vec<TileFlags>,
}

impl TileMesh {
    /// A flat, open mesh at height zero
    pub fn flat(tiles_x: usize, tiles_y: usize, tile_size: f32) -> Self {
        let count = tiles_x * tiles_y;
        Self {
            tile_size,
            tiles_x,
            tiles_y,
            heights: vec![0.0; count],
            flags: vec![TileFlags::empty(); count],
        }
    }

    /// Surround the mesh with a one-tile wall
    pub fn with_border_walls(mut self) -> Self {
        for tx in 0..self.tiles_x {
            self.set_flags(tx, 0, TileFlags::WALL);
            self.set_flags(tx, self.tiles_y.saturating_sub(1), TileFlags::WALL);
        }
        for ty in 0..self.tiles_y {
            self.set_flags(0, ty, TileFlags::WALL);
            self.set_flags(self.tiles_x.saturating_sub(1), ty, TileFlags::WALL);
        }
        self
    }

    /// Set the flags of one tile; out-of-range tiles are ignored
    pub fn set_flags(&mut self, tx: usize, ty: usize, flags: TileFlags) {
        if let Some(index) = self.index(tx, ty) {
            self.flags[index] = flags;
        }
    }

    /// Set the floor height of one tile; out-of-range tiles are ignored
    pub fn set_height(&mut self, tx: usize, ty: usize, height: f32) {
        if let Some(index) = self.index(tx, ty) {
            self.heights[index] = height;
        }
    }

    /// Edge length of one tile
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    fn index(&self, tx: usize, ty: usize) -> Option<usize> {
        (tx < self.tiles_x && ty < self.tiles_y).then(|| ty * self.tiles_x + tx)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn tile_at(&self, x: f32, y: f32) -> Option<usize> {
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
            return None;
        }
        let tx = (x / self.tile_size).floor() as usize;
        let ty = (y / self.tile_size).floor() as usize;
        self.index(tx, ty)
    }
}

impl Mesh for TileMesh {
    fn floor_level_at(&self, x: f32, y: f32) -> f32 {
        self.tile_at(x, y).map_or(0.0, |index| self.heights[index])
    }

    fn tile_flags_at(&self, x: f32, y: f32) -> TileFlags {
        self.tile_at(x, y).map_or(TileFlags::WALL, |index| self.flags[index])
    }

    #[allow(clippy::cast_precision_loss)]
    fn extent(&self) -> Vec2 {
        Vec2::new(self.tiles_x as f32 * self.tile_size, self.tiles_y as f32 * self.tile_size)
    }
}
