//! Flattened scene output: every placed model rasterized into one
//! world-sized materialized volume, serialized as `.ama`.
//!
//! ```text
//! "ama"                        3-byte tag
//! size x, y, z                 i32 each
//! cells                        R, G, B, A, material (u16), Z outer, X fastest
//! ```

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use glam::{IVec3, UVec3};

use crate::core::binary::{read_bytes, read_i32x3, read_up_to};
use crate::core::error::SceneLoadError;
use crate::voxel::{Voxel, VoxelGrid};
use super::scene::Scene;

pub const EXPORT_MAGIC: &[u8; 3] = b"ama";

/// File extension for materialized exports
pub const EXPORT_EXTENSION: &str = "ama";

/// Bytes per serialized cell: RGBA + u16 material
pub const CELL_BYTES: usize = 7;

/// One world cell of the merged volume
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaterializedCell {
    pub color: Voxel,
    /// 0 when the cell is empty
    pub material: u16,
}

/// Dense world-sized volume produced by [`flatten_scene`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterializedVolume {
    size: UVec3,
    cells: Vec<MaterializedCell>,
}

impl MaterializedVolume {
    /// All-empty volume
    ///
    /// # Panics
    /// Panics if the cell count of `size` overflows `usize`. [`Scene`] extents
    /// never do.
    pub fn new(size: UVec3) -> Self {
        let len = VoxelGrid::cell_count(size)
            .unwrap_or_else(|| panic!("volume size {} overflows the cell count", size));
        Self {
            size,
            cells: vec![MaterializedCell::default(); len],
        }
    }

    pub fn size(&self) -> UVec3 {
        self.size
    }

    /// Cells in Z outer, Y middle, X fastest order
    pub fn cells(&self) -> &[MaterializedCell] {
        &self.cells
    }

    #[inline]
    fn index(&self, p: IVec3) -> Option<usize> {
        let s = self.size.as_ivec3();
        if p.cmplt(IVec3::ZERO).any() || p.cmpge(s).any() {
            return None;
        }
        Some(p.x as usize + self.size.x as usize * (p.y as usize + self.size.y as usize * p.z as usize))
    }

    /// Cell at a world coordinate, `None` outside the volume
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<MaterializedCell> {
        self.index(IVec3::new(x, y, z)).map(|i| self.cells[i])
    }

    /// Number of cells carrying a material
    pub fn material_count(&self) -> usize {
        self.cells.iter().filter(|c| c.material != 0).count()
    }

    /// Serialize to `.ama` bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(EXPORT_MAGIC.len() + 12 + self.cells.len() * CELL_BYTES);
        out.extend_from_slice(EXPORT_MAGIC);
        for axis in self.size.to_array() {
            out.extend_from_slice(&(axis as i32).to_le_bytes());
        }
        for cell in &self.cells {
            out.extend_from_slice(&cell.color.to_bytes());
            out.extend_from_slice(&cell.material.to_le_bytes());
        }
        out
    }

    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        writer.write_all(&self.to_bytes())
    }

    /// Parse `.ama` bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SceneLoadError> {
        let mut reader = bytes;
        Self::read_from(&mut reader)
    }

    pub fn read_from(reader: &mut impl Read) -> Result<Self, SceneLoadError> {
        let magic = read_up_to(reader, EXPORT_MAGIC.len())?;
        if magic != EXPORT_MAGIC {
            return Err(SceneLoadError::UnrecognizedFormat { expected: "ama", found: magic });
        }

        let [x, y, z] = read_i32x3(reader)?;
        if x < 0 || y < 0 || z < 0 {
            return Err(SceneLoadError::InvalidDimensions { what: "export", x, y, z });
        }
        let size = UVec3::new(x as u32, y as u32, z as u32);
        let len = (x as usize)
            .checked_mul(y as usize)
            .and_then(|n| n.checked_mul(z as usize))
            .and_then(|n| n.checked_mul(CELL_BYTES))
            .ok_or(SceneLoadError::InvalidDimensions { what: "export", x, y, z })?;

        let cells = read_bytes(reader, len)?
            .chunks_exact(CELL_BYTES)
            .map(|c| MaterializedCell {
                color: Voxel::new(c[0], c[1], c[2], c[3]),
                material: u16::from_le_bytes([c[4], c[5]]),
            })
            .collect();

        Ok(Self { size, cells })
    }
}

/// Rasterize every model into one volume of the scene's extent.
///
/// Models are visited in list order and each in-range voxel (empty ones
/// included) overwrites the destination cell, so the last model wins.
/// Voxels whose world position falls outside the extent are dropped.
pub fn flatten_scene(scene: &Scene) -> MaterializedVolume {
    let mut volume = MaterializedVolume::new(scene.size());
    let mut dropped = 0usize;

    for model in scene.models() {
        let size = model.size();
        let offset = model.placement();
        let mut src = model.voxels().iter();

        for k in 0..size.z as i32 {
            for j in 0..size.y as i32 {
                for i in 0..size.x as i32 {
                    let Some(&voxel) = src.next() else { continue };
                    let dst = world_position(IVec3::new(i, j, k), offset).and_then(|p| volume.index(p));
                    let Some(dst) = dst else {
                        dropped += 1;
                        continue;
                    };

                    volume.cells[dst] = MaterializedCell {
                        color: voxel,
                        material: if voxel.is_empty() { 0 } else { model.material_id() },
                    };
                }
            }
        }
    }

    if dropped > 0 {
        log::debug!("Export dropped {} voxels outside the {} scene extent", dropped, scene.size());
    }

    volume
}

/// Model-local coordinate moved by its placement, `None` past the i32 range
fn world_position(local: IVec3, offset: IVec3) -> Option<IVec3> {
    Some(IVec3::new(
        local.x.checked_add(offset.x)?,
        local.y.checked_add(offset.y)?,
        local.z.checked_add(offset.z)?,
    ))
}

/// Flatten and serialize a scene to `.ama` bytes
pub fn export_merged(scene: &Scene) -> Vec<u8> {
    flatten_scene(scene).to_bytes()
}

/// Flatten a scene and write it to an `.ama` file
pub fn export_file(scene: &Scene, path: &Path) -> io::Result<()> {
    let volume = flatten_scene(scene);
    let mut writer = BufWriter::new(File::create(path)?);
    volume.write_to(&mut writer)?;
    writer.flush()?;

    log::info!(
        "Exported {} models into {} volume ({} material cells) at {}",
        scene.len(),
        volume.size(),
        volume.material_count(),
        path.display(),
    );
    Ok(())
}

/// Read an `.ama` file
pub fn read_export_file(path: &Path) -> Result<MaterializedVolume, SceneLoadError> {
    let mut reader = BufReader::new(File::open(path)?);
    MaterializedVolume::read_from(&mut reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{load_scene, save_scene};
    use std::num::NonZeroU16;

    fn cube(name: &str, color: Voxel, material: u16, at: IVec3) -> VoxelGrid {
        let mut grid = VoxelGrid::new(name, UVec3::ONE);
        grid.set(0, 0, 0, color);
        grid.set_material_id(NonZeroU16::new(material).unwrap());
        grid.set_placement(at);
        grid
    }

    #[test]
    fn test_last_model_wins() {
        let mut scene = Scene::with_size(UVec3::splat(2)).unwrap();
        let red = Voxel::rgb(255, 0, 0);
        let blue = Voxel::rgb(0, 0, 255);
        scene.add_model(cube("first", red, 1, IVec3::new(1, 0, 1)));
        scene.add_model(cube("second", blue, 2, IVec3::new(1, 0, 1)));

        let volume = MaterializedVolume::from_bytes(&export_merged(&scene)).unwrap();
        assert_eq!(volume.get(1, 0, 1), Some(MaterializedCell { color: blue, material: 2 }));
        assert!(volume.cells().iter().all(|c| c.color != red && c.material != 1));
    }

    #[test]
    fn test_reorder_changes_winner() {
        let mut scene = Scene::with_size(UVec3::ONE).unwrap();
        scene.add_model(cube("a", Voxel::rgb(1, 0, 0), 1, IVec3::ZERO));
        scene.add_model(cube("b", Voxel::rgb(2, 0, 0), 2, IVec3::ZERO));
        scene.move_model_down(0);

        let volume = flatten_scene(&scene);
        assert_eq!(volume.get(0, 0, 0).unwrap().material, 1);
    }

    #[test]
    fn test_out_of_bounds_dropped() {
        let mut scene = Scene::with_size(UVec3::new(3, 1, 1)).unwrap();
        let mut bar = VoxelGrid::new("bar", UVec3::new(4, 1, 1));
        bar.fill(Voxel::rgb(7, 7, 7));
        bar.set_material_id(NonZeroU16::new(5).unwrap());
        bar.set_placement(IVec3::new(-2, 0, 0));
        scene.add_model(bar);

        let volume = flatten_scene(&scene);
        assert_eq!(volume.get(0, 0, 0).unwrap().material, 5);
        assert_eq!(volume.get(1, 0, 0).unwrap().material, 5);
        assert_eq!(volume.get(2, 0, 0).unwrap().material, 0);
        assert_eq!(volume.material_count(), 2);
    }

    #[test]
    fn test_far_placement_dropped() {
        let mut scene = Scene::with_size(UVec3::splat(2)).unwrap();
        let mut far = VoxelGrid::new("far", UVec3::new(2, 1, 1));
        far.fill(Voxel::rgb(5, 5, 5));
        far.set_material_id(NonZeroU16::new(3).unwrap());
        far.set_placement(IVec3::new(i32::MAX, 0, 0));
        scene.add_model(far);
        scene.add_model(cube("low", Voxel::rgb(6, 6, 6), 4, IVec3::new(0, i32::MIN, 0)));
        scene.add_model(cube("near", Voxel::rgb(7, 7, 7), 2, IVec3::new(1, 1, 1)));

        let mut loaded = Scene::new();
        load_scene(&mut loaded, &save_scene(&scene).unwrap()).unwrap();
        assert_eq!(loaded.model(0).unwrap().placement(), IVec3::new(i32::MAX, 0, 0));

        let volume = MaterializedVolume::from_bytes(&export_merged(&loaded)).unwrap();
        assert_eq!(volume.material_count(), 1);
        assert_eq!(volume.get(1, 1, 1).unwrap().material, 2);
    }

    #[test]
    fn test_empty_voxel_has_no_material() {
        let mut scene = Scene::with_size(UVec3::new(2, 1, 1)).unwrap();
        let mut m = VoxelGrid::new("half", UVec3::new(2, 1, 1));
        m.set(0, 0, 0, Voxel::rgb(3, 3, 3));
        m.set_material_id(NonZeroU16::new(9).unwrap());
        scene.add_model(m);

        let volume = flatten_scene(&scene);
        assert_eq!(volume.get(0, 0, 0).unwrap().material, 9);
        assert_eq!(volume.get(1, 0, 0).unwrap(), MaterializedCell::default());
    }

    #[test]
    fn test_byte_layout() {
        let mut scene = Scene::with_size(UVec3::new(2, 1, 1)).unwrap();
        scene.add_model(cube("c", Voxel::new(1, 2, 3, 4), 0x0A0B, IVec3::new(1, 0, 0)));

        let bytes = export_merged(&scene);
        let mut expected = b"ama".to_vec();
        for v in [2i32, 1, 1] {
            expected.extend_from_slice(&v.to_le_bytes());
        }
        expected.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
        expected.extend_from_slice(&[1, 2, 3, 4, 0x0B, 0x0A]);

        assert_eq!(bytes.len(), 3 + 12 + 2 * CELL_BYTES);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_zero_extent() {
        let mut scene = Scene::with_size(UVec3::ZERO).unwrap();
        scene.add_model(cube("c", Voxel::rgb(1, 1, 1), 1, IVec3::ZERO));
        assert_eq!(export_merged(&scene).len(), 15);
    }

    #[test]
    fn test_read_rejects_bad_tag() {
        let err = MaterializedVolume::from_bytes(b"amx\0\0\0\0").unwrap_err();
        assert!(matches!(err, SceneLoadError::UnrecognizedFormat { expected: "ama", .. }));
    }

    #[test]
    fn test_export_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ama");
        let mut scene = Scene::with_size(UVec3::splat(2)).unwrap();
        scene.add_model(cube("c", Voxel::rgb(1, 1, 1), 4, IVec3::new(1, 1, 1)));

        export_file(&scene, &path).unwrap();
        let volume = read_export_file(&path).unwrap();
        assert_eq!(volume.get(1, 1, 1).unwrap().material, 4);
        assert_eq!(std::fs::read(&path).unwrap(), export_merged(&scene));
    }
}
