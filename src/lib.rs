//! voxmat - voxel scene authoring engine
//!
//! Imports XRAW palette models, meshes their exposed faces, persists scenes
//! as `.voxmat` and exports a flattened, materialized `.ama` volume.

pub mod core;
pub mod voxel;
pub mod scene;
