//! Voxel data structures, import and meshing

pub mod voxel;
pub mod grid;
pub mod mesh;
pub mod xraw;

pub use voxel::Voxel;
pub use grid::VoxelGrid;
pub use mesh::{mesh_grid, Face, MeshBuffer, MeshVertex, FLOATS_PER_VERTEX, VERTICES_PER_QUAD};
pub use xraw::{import_file, import_xraw, read_xraw, XRAW_EXTENSION};
