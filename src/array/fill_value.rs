//! Fill values.
//!
//! A fill value is the element value of unwritten portions of an array.
//! It is held as the bytes of a single element in native byte order.

use half::f16;

/// The fill value of an array.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FillValue(Vec<u8>);

impl core::fmt::Display for FillValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl From<Vec<u8>> for FillValue {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

macro_rules! impl_from_ne_bytes {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FillValue {
                fn from(value: $t) -> Self {
                    Self(value.to_ne_bytes().to_vec())
                }
            }
        )*
    };
}

impl_from_ne_bytes!(u8, u16, u32, u64, i8, i16, i32, i64, f16, f32, f64);

impl FillValue {
    /// Create a new fill value from the bytes of one element in native byte order.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the size in bytes of the fill value.
    #[must_use]
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Return the bytes of the fill value in native byte order.
    #[must_use]
    pub fn as_ne_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the bytes of `num_elements` repetitions of the fill value.
    #[must_use]
    pub fn repeat(&self, num_elements: usize) -> Vec<u8> {
        if self.0.iter().all(|byte| *byte == 0) {
            vec![0; num_elements * self.size()]
        } else {
            self.0.repeat(num_elements)
        }
    }
}
