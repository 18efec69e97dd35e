//! Fill value metadata.
//!
//! The interpretation of a fill value depends on the data type, so it is handled by [`DataType::fill_value_from_metadata`](crate::array::DataType::fill_value_from_metadata).

use derive_more::{Display, From};
use half::f16;
use serde::{Deserialize, Serialize};

/// Fill value metadata.
///
/// A fill value is either `null` (zero initialised chunks), a JSON number, or one of the strings `"NaN"`, `"Infinity"` and `"-Infinity"`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Display, Default)]
#[serde(untagged)]
pub enum FillValueMetadata {
    /// No fill value. Unwritten chunks are zero.
    #[default]
    #[display("null")]
    Null,
    /// An unsigned integer.
    UInt(u64),
    /// A signed integer.
    Int(i64),
    /// A float.
    Float(FillValueFloat),
}

/// A float fill value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, From, Display)]
#[serde(untagged)]
pub enum FillValueFloat {
    /// A float number.
    Float(f64),
    /// A string representation of a non finite value.
    NonFinite(FillValueFloatStringNonFinite),
}

/// A string representation of a non finite value.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Display)]
pub enum FillValueFloatStringNonFinite {
    /// Positive infinity.
    #[serde(rename = "Infinity")]
    #[display("Infinity")]
    PosInfinity,
    /// Negative infinity.
    #[serde(rename = "-Infinity")]
    #[display("-Infinity")]
    NegInfinity,
    /// NaN (not-a-number).
    #[serde(rename = "NaN")]
    #[display("NaN")]
    NaN,
}

impl FillValueFloat {
    /// Return the fill value as an [`f64`].
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Float(float) => *float,
            Self::NonFinite(FillValueFloatStringNonFinite::PosInfinity) => f64::INFINITY,
            Self::NonFinite(FillValueFloatStringNonFinite::NegInfinity) => f64::NEG_INFINITY,
            Self::NonFinite(FillValueFloatStringNonFinite::NaN) => f64::NAN,
        }
    }
}

impl FillValueMetadata {
    /// Returns true if the fill value is `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert the fill value to a signed integer.
    ///
    /// Returns [`None`] if the fill value is not an integer or is out of range of `T`.
    #[must_use]
    pub fn try_as_int<T: TryFrom<i64> + TryFrom<u64>>(&self) -> Option<T> {
        match self {
            Self::Int(int) => T::try_from(*int).ok(),
            Self::UInt(uint) => T::try_from(*uint).ok(),
            Self::Null | Self::Float(_) => None,
        }
    }

    /// Convert the fill value to an unsigned integer.
    ///
    /// Returns [`None`] if the fill value is not an integer or is out of range of `T`.
    #[must_use]
    pub fn try_as_uint<T: TryFrom<u64>>(&self) -> Option<T> {
        match self {
            Self::UInt(uint) => T::try_from(*uint).ok(),
            Self::Int(int) => u64::try_from(*int).ok().and_then(|uint| T::try_from(uint).ok()),
            Self::Null | Self::Float(_) => None,
        }
    }

    /// Convert the fill value to an [`f64`].
    ///
    /// Integers are converted to their nearest float.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn try_as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(float) => Some(float.to_f64()),
            Self::Int(int) => Some(*int as f64),
            Self::UInt(uint) => Some(*uint as f64),
            Self::Null => None,
        }
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $($t:ty),*) => {
        $(
            impl From<$t> for FillValueMetadata {
                fn from(value: $t) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

impl_from_int!(UInt, u8, u16, u32, u64);
impl_from_int!(Int, i8, i16, i32, i64);

impl From<f64> for FillValueMetadata {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Self::Float(FillValueFloatStringNonFinite::NaN.into())
        } else if value.is_infinite() {
            if value.is_sign_positive() {
                Self::Float(FillValueFloatStringNonFinite::PosInfinity.into())
            } else {
                Self::Float(FillValueFloatStringNonFinite::NegInfinity.into())
            }
        } else {
            Self::Float(value.into())
        }
    }
}

impl From<f32> for FillValueMetadata {
    fn from(value: f32) -> Self {
        f64::from(value).into()
    }
}

impl From<f16> for FillValueMetadata {
    fn from(value: f16) -> Self {
        value.to_f64().into()
    }
}
