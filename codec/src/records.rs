//! Composite numeric records.
//!
//! Vectors and colors are plain fixed arrays, so any geometry library can wrap
//! its own struct around them; arrays encode as the ordered tuple of their
//! elements (see [`Field`]). `Ray`, `Ray2D` and [`Quaternion`] are small named
//! records on top of those.
//!
//! # Quaternion compression
//!
//! A packed quaternion uses the smallest-three scheme, 47 bits in total:
//!
//! ```text
//! [index: 2 bits][a: 15 bits][b: 15 bits][c: 15 bits]
//! ```
//!
//! `index` names the component with the largest magnitude. The quaternion is
//! negated if needed so that component is positive (q and -q are the same
//! rotation), which bounds the other three to `[-1/√2, 1/√2]`. Those three are
//! quantized uniformly over that range and the dropped one is rebuilt from
//! the unit-length constraint. Inputs are normalized first; zero-length or
//! non-finite inputs encode as the identity.
//!
//! The stored components are off by at most half a step, `(1/√2) / (2^15 - 1)`
//! ≈ 2.16e-5. Every decoded component is within [`QUATERNION_PACKED_TOLERANCE`]
//! of the normalized input, up to overall sign.

use std::f32::consts::FRAC_1_SQRT_2;

use bitstream::BitStream;

use crate::error::CodecResult;
use crate::field::Field;
use crate::limits::CodecLimits;

/// Two-component vector.
pub type Vector2 = [f32; 2];
/// Three-component vector.
pub type Vector3 = [f32; 3];
/// Four-component vector.
pub type Vector4 = [f32; 4];
/// Linear RGBA color.
pub type Color = [f32; 4];
/// 8-bit RGBA color. Always one raw byte per channel.
pub type Color32 = [u8; 4];

const INDEX_BITS: u8 = 2;
const COMPONENT_BITS: u8 = 15;
const COMPONENT_MAX: u32 = (1 << COMPONENT_BITS) - 1;

/// Largest per-component error of a packed quaternion round trip.
pub const QUATERNION_PACKED_TOLERANCE: f32 = 1.0e-4;

/// Bits used by a packed quaternion.
pub const QUATERNION_PACKED_BITS: usize = INDEX_BITS as usize + 3 * COMPONENT_BITS as usize;

/// A 3D ray.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

/// A 2D ray.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ray2D {
    pub origin: Vector2,
    pub direction: Vector2,
}

macro_rules! impl_ray {
    ($($ty:ident => $vector:ty),*) => {$(
        impl $ty {
            #[must_use]
            pub const fn new(origin: $vector, direction: $vector) -> Self {
                Self { origin, direction }
            }
        }

        impl Field for $ty {
            const MIN_BITS: usize = 2 * <$vector as Field>::MIN_BITS;

            fn encode(&self, stream: &mut BitStream, packed: bool) -> CodecResult<()> {
                self.origin.encode(stream, packed)?;
                self.direction.encode(stream, packed)
            }

            fn decode(
                stream: &mut BitStream,
                packed: bool,
                limits: &CodecLimits,
            ) -> CodecResult<Self> {
                Ok(Self {
                    origin: Field::decode(stream, packed, limits)?,
                    direction: Field::decode(stream, packed, limits)?,
                })
            }
        }
    )*};
}

impl_ray!(Ray => Vector3, Ray2D => Vector2);

/// A rotation quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f32; 4]> for Quaternion {
    fn from([x, y, z, w]: [f32; 4]) -> Self {
        Self { x, y, z, w }
    }
}

impl From<Quaternion> for [f32; 4] {
    fn from(q: Quaternion) -> Self {
        q.to_array()
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Components in `[x, y, z, w]` order.
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Returns the unit quaternion, or the identity if `self` has zero or
    /// non-finite length.
    #[must_use]
    pub fn normalized(self) -> Self {
        let length = self.dot(self).sqrt();
        if !length.is_finite() || length <= f32::EPSILON {
            return Self::IDENTITY;
        }
        let [x, y, z, w] = self.to_array().map(|c| c / length);
        Self::new(x, y, z, w)
    }

    fn write_smallest_three(self, stream: &mut BitStream) -> CodecResult<()> {
        let components = self.normalized().to_array();
        let mut largest = 0;
        for (index, component) in components.iter().enumerate() {
            if component.abs() > components[largest].abs() {
                largest = index;
            }
        }
        let sign = if components[largest] < 0.0 { -1.0 } else { 1.0 };

        stream.write_bits(largest as u64, INDEX_BITS)?;
        for (index, component) in components.iter().enumerate() {
            if index != largest {
                stream.write_bits(u64::from(quantize_component(component * sign)), COMPONENT_BITS)?;
            }
        }
        Ok(())
    }

    fn read_smallest_three(stream: &mut BitStream) -> CodecResult<Self> {
        let largest = stream.read_bits(INDEX_BITS)? as usize;
        let mut components = [0.0f32; 4];
        let mut sum_squares = 0.0;
        for (index, component) in components.iter_mut().enumerate() {
            if index != largest {
                let code = stream.read_bits(COMPONENT_BITS)? as u32;
                *component = dequantize_component(code);
                sum_squares += *component * *component;
            }
        }
        components[largest] = (1.0 - sum_squares).max(0.0).sqrt();
        Ok(components.into())
    }
}

fn quantize_component(value: f32) -> u32 {
    let unit = ((value + FRAC_1_SQRT_2) / (2.0 * FRAC_1_SQRT_2)).clamp(0.0, 1.0);
    (unit * COMPONENT_MAX as f32).round() as u32
}

fn dequantize_component(code: u32) -> f32 {
    (code as f32 / COMPONENT_MAX as f32).mul_add(2.0 * FRAC_1_SQRT_2, -FRAC_1_SQRT_2)
}

impl Field for Quaternion {
    const MIN_BITS: usize = QUATERNION_PACKED_BITS;

    fn encode(&self, stream: &mut BitStream, packed: bool) -> CodecResult<()> {
        if packed {
            self.write_smallest_three(stream)
        } else {
            self.to_array().encode(stream, false)
        }
    }

    fn decode(stream: &mut BitStream, packed: bool, limits: &CodecLimits) -> CodecResult<Self> {
        if packed {
            Self::read_smallest_three(stream)
        } else {
            <[f32; 4]>::decode(stream, false, limits).map(Self::from)
        }
    }
}
