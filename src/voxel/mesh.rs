//! Exposed-face mesher.
//!
//! Every solid voxel emits one quad per face whose neighbour is empty or
//! outside the model. Quads are not merged, triangulated or indexed: the
//! renderer consumes the stream as a quad primitive, 4 vertices per face.

use bytemuck::{Pod, Zeroable};
use glam::IVec3;

use super::grid::VoxelGrid;

/// Floats per vertex in the flat buffer (position 3, color 4, normal 3)
pub const FLOATS_PER_VERTEX: usize = 10;

/// Vertices per emitted face
pub const VERTICES_PER_QUAD: usize = 4;

/// One mesh vertex, laid out as 10 consecutive f32 values
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// Model-local position in grid units
    pub position: [f32; 3],
    /// RGBA color in `[0, 1]`
    pub color: [f32; 4],
    /// Unit face normal
    pub normal: [f32; 3],
}

/// The six axis-aligned voxel faces
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    PosY,
    NegY,
    PosZ,
    NegZ,
    PosX,
    NegX,
}

impl Face {
    /// Faces in emission order
    pub const ALL: [Face; 6] = [
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
        Face::PosX,
        Face::NegX,
    ];

    /// Offset to the neighbouring cell across this face
    pub fn offset(self) -> IVec3 {
        match self {
            Face::PosY => IVec3::Y,
            Face::NegY => IVec3::NEG_Y,
            Face::PosZ => IVec3::Z,
            Face::NegZ => IVec3::NEG_Z,
            Face::PosX => IVec3::X,
            Face::NegX => IVec3::NEG_X,
        }
    }

    pub fn normal(self) -> [f32; 3] {
        self.offset().as_vec3().to_array()
    }

    /// Unit-cube corners of this face, in emission order
    fn corners(self) -> [[u32; 3]; 4] {
        match self {
            Face::PosY => [[0, 1, 0], [1, 1, 0], [1, 1, 1], [0, 1, 1]],
            Face::NegY => [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]],
            Face::PosZ => [[0, 1, 1], [1, 1, 1], [1, 0, 1], [0, 0, 1]],
            Face::NegZ => [[0, 1, 0], [1, 1, 0], [1, 0, 0], [0, 0, 0]],
            Face::PosX => [[1, 1, 1], [1, 1, 0], [1, 0, 0], [1, 0, 1]],
            Face::NegX => [[0, 1, 1], [0, 1, 0], [0, 0, 0], [0, 0, 1]],
        }
    }
}

/// Unindexed quad vertex stream for one model
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffer {
    vertices: Vec<MeshVertex>,
}

impl MeshBuffer {
    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    /// Flat float view: 10 floats per vertex, 4 vertices per quad
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw bytes for GPU upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_QUAD
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterate quads as 4-vertex slices
    pub fn quads(&self) -> impl Iterator<Item = &[MeshVertex]> {
        self.vertices.chunks_exact(VERTICES_PER_QUAD)
    }
}

/// Build the exposed-face mesh of a model.
///
/// Iterates `x` outer, `y` middle, `z` inner and emits faces in
/// [`Face::ALL`] order, so output is deterministic for a given grid.
pub fn mesh_grid(grid: &VoxelGrid) -> MeshBuffer {
    let size = grid.size();
    let mut vertices = Vec::new();

    for x in 0..size.x as i32 {
        for y in 0..size.y as i32 {
            for z in 0..size.z as i32 {
                let voxel = grid.get_or_empty(x, y, z);
                if voxel.is_empty() {
                    continue;
                }

                let color = voxel.to_normalized().to_array();
                let cell = IVec3::new(x, y, z);

                for face in Face::ALL {
                    let n = cell + face.offset();
                    if !grid.get_or_empty(n.x, n.y, n.z).is_empty() {
                        continue;
                    }

                    let normal = face.normal();
                    for [cx, cy, cz] in face.corners() {
                        vertices.push(MeshVertex {
                            position: [
                                (x as u32 + cx) as f32,
                                (y as u32 + cy) as f32,
                                (z as u32 + cz) as f32,
                            ],
                            color,
                            normal,
                        });
                    }
                }
            }
        }
    }

    MeshBuffer { vertices }
}
