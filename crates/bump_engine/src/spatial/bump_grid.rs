//! Uniform bump grid
//!
//! The world is divided into square buckets of a fixed size. Every tick the
//! grid is cleared and each active character and particle is dropped into the
//! bucket containing its position. Bucket membership is never carried across
//! ticks; the bucket vectors themselves are kept so steady-state rebuilding
//! does not allocate.

use crate::foundation::math::Vec2;
use crate::world::{CharacterId, ParticleId, World};

/// Upper bound on columns or rows
pub const MAX_CELLS_PER_SIDE: usize = 4096;

/// Flat index of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId(pub u32);

/// Contents of one grid cell
#[derive(Debug, Clone, Default)]
pub struct Bucket {
    /// Characters whose position falls in this cell
    pub characters: Vec<CharacterId>,
    /// Particles whose position falls in this cell
    pub particles: Vec<ParticleId>,
}

impl Bucket {
    fn clear(&mut self) {
        self.characters.clear();
        self.particles.clear();
    }
}

/// Counts from one indexing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Characters placed in the grid
    pub characters: usize,
    /// Particles placed in the grid
    pub particles: usize,
}

/// Uniform grid of buckets covering the mesh
#[derive(Debug, Clone)]
pub struct BumpGrid {
    cell_size: f32,
    cols: usize,
    rows: usize,
    buckets: Vec<Bucket>,
    max_reach: f32,
}

impl BumpGrid {
    /// Create an empty grid; call [`BumpGrid::resize`] or [`BumpGrid::rebuild`] before use
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cols: 1,
            rows: 1,
            buckets: vec![Bucket::default()],
            max_reach: 0.0,
        }
    }

    /// Cell edge length
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Columns and rows
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Largest horizontal half-width of anything indexed this tick
    pub fn max_reach(&self) -> f32 {
        self.max_reach
    }

    /// Fit the grid to a world extent
    ///
    /// A cell size that is not positive, or so small the grid would exceed
    /// [`MAX_CELLS_PER_SIDE`] on either axis, is replaced by the smallest
    /// usable one.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn resize(&mut self, extent: Vec2) {
        let longest = extent.x.max(extent.y);
        let limit = MAX_CELLS_PER_SIDE as f32;
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) || longest / self.cell_size > limit {
            let usable = (longest / limit).max(1.0);
            log::error!(
                "Bump grid cell size {} is unusable for a {}x{} world, using {}",
                self.cell_size,
                extent.x,
                extent.y,
                usable
            );
            self.cell_size = usable;
        }
        let cols = ((extent.x / self.cell_size).ceil() as usize).max(1);
        let rows = ((extent.y / self.cell_size).ceil() as usize).max(1);
        if cols != self.cols || rows != self.rows {
            log::debug!("Bump grid resized to {}x{} cells of {}", cols, rows, self.cell_size);
            self.cols = cols;
            self.rows = rows;
            self.buckets.resize_with(cols * rows, Bucket::default);
        }
    }

    /// Empty every bucket
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.max_reach = 0.0;
    }

    /// Column of a world X coordinate, clamped onto the grid
    pub fn column(&self, x: f32) -> usize {
        Self::clamp_index(x / self.cell_size, self.cols)
    }

    /// Row of a world Y coordinate, clamped onto the grid
    pub fn row(&self, y: f32) -> usize {
        Self::clamp_index(y / self.cell_size, self.rows)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn clamp_index(scaled: f32, count: usize) -> usize {
        if scaled.is_nan() || scaled <= 0.0 {
            0
        } else {
            (scaled.floor() as usize).min(count - 1)
        }
    }

    /// Cell containing a world position, clamped onto the grid
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell_at(&self, x: f32, y: f32) -> CellId {
        CellId((self.row(y) * self.cols + self.column(x)) as u32)
    }

    /// Contents of a cell
    pub fn bucket(&self, cell: CellId) -> &Bucket {
        &self.buckets[cell.0 as usize]
    }

    /// Every cell overlapping the horizontal rectangle, clipped to the grid
    #[allow(clippy::cast_possible_truncation)]
    pub fn cells_in_rect(&self, min: Vec2, max: Vec2) -> impl Iterator<Item = CellId> + '_ {
        let (c0, c1) = (self.column(min.x), self.column(max.x));
        let (r0, r1) = (self.row(min.y), self.row(max.y));
        let cols = self.cols;
        (r0..=r1).flat_map(move |row| (c0..=c1).map(move |col| CellId((row * cols + col) as u32)))
    }

    /// Place a character in the cell containing `(x, y)`
    pub fn insert_character(&mut self, id: CharacterId, x: f32, y: f32, reach: f32) -> CellId {
        let cell = self.cell_at(x, y);
        self.buckets[cell.0 as usize].characters.push(id);
        self.max_reach = self.max_reach.max(reach);
        cell
    }

    /// Place a particle in the cell containing `(x, y)`
    pub fn insert_particle(&mut self, id: ParticleId, x: f32, y: f32, reach: f32) -> CellId {
        let cell = self.cell_at(x, y);
        self.buckets[cell.0 as usize].particles.push(id);
        self.max_reach = self.max_reach.max(reach);
        cell
    }

    /// Rebuild from scratch: index every collidable character and active
    /// particle and record each one's cell on the record itself.
    pub fn rebuild(&mut self, world: &mut World, extent: Vec2) -> IndexStats {
        self.resize(extent);
        self.clear();

        let mut stats = IndexStats::default();
        for (id, character) in &mut world.characters {
            if character.is_indexable() {
                let reach = character.reach();
                let cell = self.insert_character(id, character.position.x, character.position.y, reach);
                character.cell = Some(cell);
                stats.characters += 1;
            } else {
                character.cell = None;
            }
        }
        for (id, particle) in &mut world.particles {
            if particle.is_active() {
                let cell = self.insert_particle(id, particle.position.x, particle.position.y, particle.radius);
                particle.cell = Some(cell);
                stats.particles += 1;
            } else {
                particle.cell = None;
            }
        }

        log::trace!(
            "Bump grid holds {} characters and {} particles",
            stats.characters,
            stats.particles
        );
        stats
    }
}
