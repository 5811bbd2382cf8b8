//! Voxel dimensions and indices for 4-D (space + time) volumes.
//!
//! Conventions
//! -----------
//! - `x` is the fastest-varying spatial axis, followed by `y` then `z`;
//!   flattened voxel indices follow this (z, y, x) nesting.
//! - `t` counts frames; `t == 1` is a static volume.

/// `VoxelDim` — extents of a 4-D volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoxelDim {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub t: usize,
}

impl VoxelDim {
    pub fn new(x: usize, y: usize, z: usize, t: usize) -> Self {
        Self { x, y, z, t }
    }

    /// Number of spatial voxels per frame (`x * y * z`).
    pub fn num_voxels(&self) -> usize {
        self.x * self.y * self.z
    }

    /// True when the volume has more than one frame.
    pub fn is_dynamic(&self) -> bool {
        self.t > 1
    }

    /// Same spatial extents with a single frame.
    pub fn single_frame(&self) -> Self {
        Self { t: 1, ..*self }
    }

    /// Flattened spatial index of `(x, y, z)` with `x` fastest.
    pub fn spatial_index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.y + y) * self.x + x
    }

    /// Iterate over every spatial voxel of frame `t` in flattened order.
    pub fn voxels_in_frame(&self, t: usize) -> impl Iterator<Item = Voxel> + '_ {
        (0..self.z).flat_map(move |z| {
            (0..self.y).flat_map(move |y| (0..self.x).map(move |x| Voxel { x, y, z, t }))
        })
    }
}

/// `Voxel` — a single (x, y, z, t) index into a 4-D volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Voxel {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub t: usize,
}

impl Voxel {
    pub fn new(x: usize, y: usize, z: usize, t: usize) -> Self {
        Self { x, y, z, t }
    }
}
