//! Dense voxel model placed in a scene

use std::num::NonZeroU16;

use glam::{IVec3, Mat4, UVec3};

use super::mesh::{mesh_grid, MeshBuffer};
use super::voxel::Voxel;

/// One importable/placeable voxel model.
///
/// Voxels live in a single flat buffer indexed by `x + size.x * (y + size.y * z)`.
/// The array dimensions are fixed at construction. The mesh is a derived cache:
/// any voxel mutation drops it and [`VoxelGrid::regenerate_mesh`] rebuilds it.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
    name: String,
    size: UVec3,
    voxels: Vec<Voxel>,
    material_id: u16,
    placement: IVec3,
    transform: Mat4,
    mesh: Option<MeshBuffer>,
}

impl VoxelGrid {
    /// Create an all-empty model
    ///
    /// # Panics
    /// Panics if the cell count of `size` overflows `usize`.
    pub fn new(name: impl Into<String>, size: UVec3) -> Self {
        let len = Self::cell_count(size)
            .unwrap_or_else(|| panic!("model size {} overflows the cell count", size));
        Self::with_voxels(name, size, vec![Voxel::EMPTY; len])
    }

    /// Create a model from voxels already laid out in X-fastest order.
    ///
    /// # Panics
    /// Panics if `voxels.len()` does not match the volume of `size`.
    pub fn from_voxels(name: impl Into<String>, size: UVec3, voxels: Vec<Voxel>) -> Self {
        let len = Self::cell_count(size);
        assert_eq!(Some(voxels.len()), len, "voxel buffer does not match model size {}", size);
        Self::with_voxels(name, size, voxels)
    }

    /// Number of cells in a box of `size`, `None` if it overflows `usize`
    pub fn cell_count(size: UVec3) -> Option<usize> {
        (size.x as usize)
            .checked_mul(size.y as usize)?
            .checked_mul(size.z as usize)
    }

    fn with_voxels(name: impl Into<String>, size: UVec3, voxels: Vec<Voxel>) -> Self {
        Self {
            name: name.into(),
            size,
            voxels,
            material_id: 0,
            placement: IVec3::ZERO,
            transform: Mat4::IDENTITY,
            mesh: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Model dimensions in voxels
    pub fn size(&self) -> UVec3 {
        self.size
    }

    /// Total number of cells
    pub fn volume(&self) -> usize {
        self.voxels.len()
    }

    /// Number of non-empty voxels
    pub fn solid_count(&self) -> usize {
        self.voxels.iter().filter(|v| !v.is_empty()).count()
    }

    /// All voxels in X-fastest, then Y, then Z order
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    #[inline]
    fn index(&self, x: u32, y: u32, z: u32) -> usize {
        x as usize + self.size.x as usize * (y as usize + self.size.y as usize * z as usize)
    }

    /// Check whether a local coordinate lies inside the model
    #[inline]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as u32) < self.size.x
            && (y as u32) < self.size.y
            && (z as u32) < self.size.z
    }

    /// Voxel at a local coordinate, `None` outside the model
    pub fn get(&self, x: u32, y: u32, z: u32) -> Option<Voxel> {
        if x < self.size.x && y < self.size.y && z < self.size.z {
            Some(self.voxels[self.index(x, y, z)])
        } else {
            None
        }
    }

    /// Voxel at a signed local coordinate; outside the model reads as empty
    #[inline]
    pub fn get_or_empty(&self, x: i32, y: i32, z: i32) -> Voxel {
        if self.contains(x, y, z) {
            self.voxels[self.index(x as u32, y as u32, z as u32)]
        } else {
            Voxel::EMPTY
        }
    }

    /// Write a voxel. Returns `false` (and changes nothing) outside the model.
    ///
    /// Invalidates the cached mesh.
    pub fn set(&mut self, x: u32, y: u32, z: u32, voxel: Voxel) -> bool {
        if x < self.size.x && y < self.size.y && z < self.size.z {
            let idx = self.index(x, y, z);
            self.voxels[idx] = voxel;
            self.mesh = None;
            true
        } else {
            false
        }
    }

    /// Fill every cell with one voxel value. Invalidates the cached mesh.
    pub fn fill(&mut self, voxel: Voxel) {
        self.voxels.fill(voxel);
        self.mesh = None;
    }

    /// Material id applied to every non-empty voxel (0 = none assigned)
    pub fn material_id(&self) -> u16 {
        self.material_id
    }

    /// Assign a material. Id 0 is reserved and cannot be assigned.
    pub fn set_material_id(&mut self, id: NonZeroU16) {
        self.material_id = id.get();
    }

    /// Restore a raw material id read from a scene file (0 allowed)
    pub(crate) fn restore_material_id(&mut self, id: u16) {
        self.material_id = id;
    }

    /// Integer world translation of the model's local origin
    pub fn placement(&self) -> IVec3 {
        self.placement
    }

    /// Move the model to a new world position.
    ///
    /// Side effect: recomputes [`VoxelGrid::world_transform`].
    pub fn set_placement(&mut self, placement: IVec3) {
        self.placement = placement;
        self.transform = Mat4::from_translation(placement.as_vec3());
    }

    /// Shift the model by a delta, e.g. a one-cell keyboard nudge.
    ///
    /// Each axis stops at the i32 range.
    pub fn translate(&mut self, delta: IVec3) {
        self.set_placement(self.placement.saturating_add(delta));
    }

    /// Model-to-world matrix for the rendering collaborator
    pub fn world_transform(&self) -> Mat4 {
        self.transform
    }

    /// Cached mesh, `None` if never built or invalidated since
    pub fn mesh(&self) -> Option<&MeshBuffer> {
        self.mesh.as_ref()
    }

    /// Rebuild the cached mesh from the current voxel content
    pub fn regenerate_mesh(&mut self) -> &MeshBuffer {
        let mesh = mesh_grid(self);
        self.mesh.insert(mesh)
    }
}
