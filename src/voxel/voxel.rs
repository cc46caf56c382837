//! Voxel data type

use bytemuck::{Pod, Zeroable};
use glam::Vec4;

/// Single voxel - exactly 4 bytes of RGBA8 color
///
/// The all-zero value is the empty sentinel. A fully transparent voxel with a
/// non-zero color channel is still solid.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Voxel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Voxel {
    /// Empty/air voxel
    pub const EMPTY: Voxel = Voxel { r: 0, g: 0, b: 0, a: 0 };

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque voxel from RGB888 values
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    /// Channels in R, G, B, A order
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Check if voxel is empty (bit-for-bit zero)
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Color with every channel mapped to `[0, 1]`
    pub fn to_normalized(self) -> Vec4 {
        Vec4::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        )
    }
}
