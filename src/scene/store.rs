//! `.voxmat` scene persistence
//!
//! ```text
//! "voxmat"                     6-byte tag, no length, no terminator
//! size x, y, z                 i32 each
//! model count                  i32
//! per model:
//!   name length, name          i32 + UTF-8 bytes
//!   size x, y, z               i32 each
//!   placement x, y, z          i32 each
//!   material id                u16
//!   voxels                     RGBA per cell, Z outer, Y middle, X fastest
//! ```
//! All integers are little-endian. Meshes are not stored; they are rebuilt on load.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use glam::{IVec3, UVec3};

use crate::core::binary::{read_bytes, read_i32, read_i32x3, read_u16, read_up_to, write_i32, write_i32x3, write_u16};
use crate::core::error::SceneLoadError;
use crate::voxel::{Voxel, VoxelGrid};
use super::scene::Scene;

pub const SCENE_MAGIC: &[u8; 6] = b"voxmat";

/// File extension for scene files
pub const SCENE_EXTENSION: &str = "voxmat";

/// Fully decoded scene file contents
#[derive(Debug)]
pub struct SceneData {
    pub size: UVec3,
    pub models: Vec<VoxelGrid>,
}

/// Serialize a scene to bytes
pub fn save_scene(scene: &Scene) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    write_scene(scene, &mut out)?;
    Ok(out)
}

/// Write a scene to a file
pub fn save_scene_file(scene: &Scene, path: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_scene(scene, &mut writer)?;
    writer.flush()?;

    log::info!("Saved scene with {} models to {}", scene.len(), path.display());
    Ok(())
}

pub fn write_scene(scene: &Scene, writer: &mut impl Write) -> io::Result<()> {
    writer.write_all(SCENE_MAGIC)?;
    write_i32x3(writer, to_i32x3(scene.size())?)?;
    write_i32(writer, to_i32(scene.len())?)?;

    for model in scene.models() {
        write_model(writer, model)?;
    }

    Ok(())
}

fn write_model(writer: &mut impl Write, model: &VoxelGrid) -> io::Result<()> {
    let name = model.name().as_bytes();
    write_i32(writer, to_i32(name.len())?)?;
    writer.write_all(name)?;

    write_i32x3(writer, to_i32x3(model.size())?)?;
    write_i32x3(writer, model.placement().to_array())?;
    write_u16(writer, model.material_id())?;

    let bytes: Vec<u8> = model.voxels().iter().flat_map(|v| v.to_bytes()).collect();
    writer.write_all(&bytes)?;

    Ok(())
}

fn to_i32(n: usize) -> io::Result<i32> {
    i32::try_from(n).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("{} does not fit in an i32 field", n))
    })
}

fn to_i32x3(v: UVec3) -> io::Result<[i32; 3]> {
    Ok([to_i32(v.x as usize)?, to_i32(v.y as usize)?, to_i32(v.z as usize)?])
}

/// Decode scene bytes and append their models to `scene`.
///
/// The scene extent is replaced and the models are appended after any already
/// present; call [`Scene::clear`] first for a clean load. On error the scene
/// is left untouched. Returns the number of models appended.
pub fn load_scene(scene: &mut Scene, bytes: &[u8]) -> Result<usize, SceneLoadError> {
    let mut reader = bytes;
    let data = read_scene(&mut reader)?;
    Ok(apply(scene, data))
}

/// Load a scene file into `scene`, same semantics as [`load_scene`]
pub fn load_scene_file(scene: &mut Scene, path: &Path) -> Result<usize, SceneLoadError> {
    let mut reader = BufReader::new(File::open(path)?);
    let data = read_scene(&mut reader)?;
    let count = apply(scene, data);

    log::info!("Loaded {} models from {}", count, path.display());
    Ok(count)
}

fn apply(scene: &mut Scene, data: SceneData) -> usize {
    let count = data.models.len();
    scene.append_loaded(data.size, data.models);
    count
}

/// Decode a complete scene stream.
///
/// Each model's mesh is rebuilt and its placement applied once its voxels are
/// populated.
pub fn read_scene(reader: &mut impl Read) -> Result<SceneData, SceneLoadError> {
    let magic = read_up_to(reader, SCENE_MAGIC.len())?;
    if magic != SCENE_MAGIC {
        return Err(SceneLoadError::UnrecognizedFormat { expected: "voxmat", found: magic });
    }

    let size = read_dims(reader, "scene")?;
    if !Scene::is_valid_size(size) {
        return Err(SceneLoadError::InvalidDimensions {
            what: "scene",
            x: size.x as i32,
            y: size.y as i32,
            z: size.z as i32,
        });
    }

    let count = read_i32(reader)?;
    if count < 0 {
        return Err(SceneLoadError::InvalidModelCount(count));
    }

    let mut models = Vec::new();
    for _ in 0..count {
        models.push(read_model(reader)?);
    }

    Ok(SceneData { size, models })
}

fn read_model(reader: &mut impl Read) -> Result<VoxelGrid, SceneLoadError> {
    let name_len = read_i32(reader)?;
    if name_len < 0 {
        return Err(SceneLoadError::InvalidName(format!("negative length {}", name_len)));
    }
    let name = String::from_utf8(read_bytes(reader, name_len as usize)?)
        .map_err(|e| SceneLoadError::InvalidName(e.to_string()))?;

    let size = read_dims(reader, "model")?;
    let placement = IVec3::from_array(read_i32x3(reader)?);
    let material_id = read_u16(reader)?;

    let volume = (size.x as usize)
        .checked_mul(size.y as usize)
        .and_then(|n| n.checked_mul(size.z as usize))
        .and_then(|n| n.checked_mul(4))
        .ok_or(SceneLoadError::InvalidDimensions {
            what: "model",
            x: size.x as i32,
            y: size.y as i32,
            z: size.z as i32,
        })?;
    let voxels: Vec<Voxel> = read_bytes(reader, volume)?
        .chunks_exact(4)
        .map(|c| Voxel::new(c[0], c[1], c[2], c[3]))
        .collect();

    let mut model = VoxelGrid::from_voxels(name, size, voxels);
    model.restore_material_id(material_id);
    model.regenerate_mesh();
    model.set_placement(placement);

    Ok(model)
}

fn read_dims(reader: &mut impl Read, what: &'static str) -> Result<UVec3, SceneLoadError> {
    let [x, y, z] = read_i32x3(reader)?;
    if x < 0 || y < 0 || z < 0 {
        return Err(SceneLoadError::InvalidDimensions { what, x, y, z });
    }
    Ok(UVec3::new(x as u32, y as u32, z as u32))
}
