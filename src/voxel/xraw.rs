//! XRAW indexed-palette model import
//!
//! Layout: `"XRAW"`, channel encoding (0 = uint), channel count (4 = RGBA),
//! bits per channel (8), index width in bits (8 or 16), width/height/depth as
//! i32, palette size as u32, one index per voxel (Z outer, X fastest), then
//! the RGBA palette.
//!
//! XRAW stores depth along its own Y axis. On import the source Y axis becomes
//! the model's Z axis (reversed) and the source Z axis becomes the model's Y
//! axis: `model[i, j, k] = source[i, sy - 1 - k, j]`.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use glam::UVec3;

use crate::core::binary::{read_bytes, read_i32x3, read_u8, read_u32, read_up_to};
use crate::core::error::ImportError;
use super::grid::VoxelGrid;
use super::voxel::Voxel;

pub const XRAW_MAGIC: &[u8; 4] = b"XRAW";

/// File extension for XRAW models (by convention only)
pub const XRAW_EXTENSION: &str = "xraw";

const CHANNEL_ENCODING_UINT: u8 = 0;
const CHANNEL_COUNT_RGBA: u8 = 4;
const BITS_PER_CHANNEL: u8 = 8;

/// Decode an in-memory XRAW stream
pub fn import_xraw(bytes: &[u8], name: impl Into<String>) -> Result<VoxelGrid, ImportError> {
    let mut reader = bytes;
    read_xraw(&mut reader, name)
}

/// Import an XRAW file, naming the model after the file name up to its first `.`
pub fn import_file(path: &Path) -> Result<VoxelGrid, ImportError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .unwrap_or_default()
        .to_string();

    let mut reader = BufReader::new(File::open(path)?);
    let grid = read_xraw(&mut reader, name)?;

    log::info!(
        "Imported {} as '{}' ({}x{}x{}, {} solid voxels)",
        path.display(),
        grid.name(),
        grid.size().x,
        grid.size().y,
        grid.size().z,
        grid.solid_count(),
    );

    Ok(grid)
}

/// Decode an XRAW stream into a model
pub fn read_xraw(reader: &mut impl Read, name: impl Into<String>) -> Result<VoxelGrid, ImportError> {
    let magic = read_up_to(reader, XRAW_MAGIC.len())?;
    if magic != XRAW_MAGIC {
        return Err(ImportError::UnsupportedFormat { found: magic });
    }

    let encoding = read_u8(reader)?;
    if encoding != CHANNEL_ENCODING_UINT {
        return Err(ImportError::UnsupportedChannelEncoding(encoding));
    }

    let channels = read_u8(reader)?;
    if channels != CHANNEL_COUNT_RGBA {
        return Err(ImportError::UnsupportedChannelLayout(channels));
    }

    let bits = read_u8(reader)?;
    if bits != BITS_PER_CHANNEL {
        return Err(ImportError::UnsupportedBitDepth(bits));
    }

    let index_bits = read_u8(reader)?;
    let index_width = match index_bits {
        8 => 1,
        16 => 2,
        other => return Err(ImportError::UnsupportedIndexWidth(other)),
    };

    let [sx, sy, sz] = read_i32x3(reader)?;
    let invalid = || ImportError::InvalidDimensions { x: sx, y: sy, z: sz };
    if sx < 0 || sy < 0 || sz < 0 {
        return Err(invalid());
    }
    let (sx, sy, sz) = (sx as usize, sy as usize, sz as usize);
    let count = sx
        .checked_mul(sy)
        .and_then(|n| n.checked_mul(sz))
        .ok_or_else(invalid)?;

    let palette_len = read_u32(reader)?;

    let raw = read_bytes(reader, count.checked_mul(index_width).ok_or_else(invalid)?)?;
    let indices: Vec<u32> = if index_width == 1 {
        raw.iter().map(|&b| b as u32).collect()
    } else {
        raw.chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]) as u32)
            .collect()
    };

    let palette_bytes = read_bytes(reader, (palette_len as usize).saturating_mul(4))?;
    let palette: Vec<Voxel> = palette_bytes
        .chunks_exact(4)
        .map(|c| Voxel::new(c[0], c[1], c[2], c[3]))
        .collect();

    if let Some(&index) = indices.iter().find(|&&i| i >= palette_len) {
        return Err(ImportError::PaletteIndexOutOfRange { index, palette_len });
    }

    // Model axes: X' = sx, Y' = sz, Z' = sy. Push in model flat order (k outer, i fastest).
    let mut voxels = Vec::with_capacity(count);
    for k in 0..sy {
        let src_y = sy - 1 - k;
        for j in 0..sz {
            for i in 0..sx {
                let src = i + sx * (src_y + sy * j);
                voxels.push(palette[indices[src] as usize]);
            }
        }
    }

    let size = UVec3::new(sx as u32, sz as u32, sy as u32);
    Ok(VoxelGrid::from_voxels(name, size, voxels))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assemble an XRAW stream with the given source dimensions
    fn xraw_bytes(
        dims: [i32; 3],
        index_bits: u8,
        indices: &[u16],
        palette: &[[u8; 4]],
    ) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(XRAW_MAGIC);
        out.extend_from_slice(&[0, 4, 8, index_bits]);
        for d in dims {
            out.extend_from_slice(&d.to_le_bytes());
        }
        out.extend_from_slice(&(palette.len() as u32).to_le_bytes());
        for &i in indices {
            if index_bits == 8 {
                out.push(i as u8);
            } else {
                out.extend_from_slice(&i.to_le_bytes());
            }
        }
        for c in palette {
            out.extend_from_slice(c);
        }
        out
    }

    /// 2x3x4 source where every voxel has its own palette entry
    fn unique_source() -> (Vec<u8>, Vec<[u8; 4]>) {
        let indices: Vec<u16> = (0..24).collect();
        let palette: Vec<[u8; 4]> = (0..24u8).map(|i| [i + 1, 2 * i, 100, 255]).collect();
        (xraw_bytes([2, 3, 4], 8, &indices, &palette), palette)
    }

    #[test]
    fn test_axis_remap() {
        let (bytes, palette) = unique_source();
        let grid = import_xraw(&bytes, "m").unwrap();

        assert_eq!(grid.size(), UVec3::new(2, 4, 3));
        let (sx, sy) = (2u32, 3u32);
        for i in 0..2 {
            for j in 0..4 {
                for k in 0..3 {
                    let src = i + sx * ((sy - 1 - k) + sy * j);
                    let expected = Voxel::from_bytes(palette[src as usize]);
                    assert_eq!(grid.get(i, j, k), Some(expected), "at {} {} {}", i, j, k);
                }
            }
        }

        // Source (x=1, y=0, z=0) lands at model (1, 0, Z'-1).
        assert_eq!(grid.get(1, 0, 2), Some(Voxel::from_bytes(palette[1])));
    }

    #[test]
    fn test_sixteen_bit_indices() {
        let mut palette = vec![[0u8; 4]; 300];
        palette[299] = [9, 8, 7, 6];
        let bytes = xraw_bytes([1, 1, 1], 16, &[299], &palette);
        let grid = import_xraw(&bytes, "wide").unwrap();
        assert_eq!(grid.get(0, 0, 0), Some(Voxel::new(9, 8, 7, 6)));
    }

    #[test]
    fn test_zero_index_entry_can_be_empty() {
        let bytes = xraw_bytes([2, 1, 1], 8, &[0, 1], &[[0, 0, 0, 0], [1, 1, 1, 255]]);
        let grid = import_xraw(&bytes, "m").unwrap();
        assert_eq!(grid.solid_count(), 1);
    }

    #[test]
    fn test_deterministic() {
        let (bytes, _) = unique_source();
        let a = import_xraw(&bytes, "a").unwrap();
        let b = import_xraw(&bytes, "b").unwrap();
        assert_eq!(a.voxels(), b.voxels());
    }

    #[test]
    fn test_wrong_magic() {
        let (mut bytes, _) = unique_source();
        bytes[3] = b'Z';
        let err = import_xraw(&bytes, "m").unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat { ref found } if found == b"XRAZ"));

        let err = import_xraw(b"XR", "m").unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_unsupported_header_fields() {
        let (bytes, _) = unique_source();

        let mut b = bytes.clone();
        b[4] = 1;
        assert!(matches!(import_xraw(&b, "m"), Err(ImportError::UnsupportedChannelEncoding(1))));

        let mut b = bytes.clone();
        b[5] = 3;
        assert!(matches!(import_xraw(&b, "m"), Err(ImportError::UnsupportedChannelLayout(3))));

        let mut b = bytes.clone();
        b[6] = 16;
        assert!(matches!(import_xraw(&b, "m"), Err(ImportError::UnsupportedBitDepth(16))));

        let mut b = bytes;
        b[7] = 32;
        assert!(matches!(import_xraw(&b, "m"), Err(ImportError::UnsupportedIndexWidth(32))));
    }

    #[test]
    fn test_negative_dimensions() {
        let bytes = xraw_bytes([2, -1, 1], 8, &[], &[]);
        assert!(matches!(
            import_xraw(&bytes, "m"),
            Err(ImportError::InvalidDimensions { y: -1, .. })
        ));
    }

    #[test]
    fn test_truncated_stream() {
        let (bytes, _) = unique_source();
        for cut in [6, 10, 20, 30, bytes.len() - 1] {
            let err = import_xraw(&bytes[..cut], "m").unwrap_err();
            assert!(matches!(err, ImportError::Truncated), "cut at {}: {:?}", cut, err);
        }
    }

    #[test]
    fn test_palette_index_out_of_range() {
        let bytes = xraw_bytes([2, 1, 1], 8, &[0, 2], &[[1, 1, 1, 1], [2, 2, 2, 2]]);
        let err = import_xraw(&bytes, "m").unwrap_err();
        assert!(matches!(
            err,
            ImportError::PaletteIndexOutOfRange { index: 2, palette_len: 2 }
        ));
    }

    #[test]
    fn test_import_file_names_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("castle.v2.xraw");
        let (bytes, _) = unique_source();
        std::fs::write(&path, bytes).unwrap();

        let grid = import_file(&path).unwrap();
        assert_eq!(grid.name(), "castle");
        assert_eq!(grid.volume(), 24);
    }

    #[test]
    fn test_import_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = import_file(&dir.path().join("missing.xraw")).unwrap_err();
        assert!(matches!(err, ImportError::Io(_)));
    }
}
