//! Data types.
//!
//! A data type is identified by a token of an optional byte order marker (`<` little endian, `>` big endian), a kind character, and a size in bytes.
//!
//! Supported data types:
//!  - `i1`, `u1`: 8-bit integers (no byte order marker),
//!  - `<i2`, `>i2`, `<i4`, `>i4`, `<i8`, `>i8`: signed integers,
//!  - `<u2`, `>u2`, `<u4`, `>u4`, `<u8`, `>u8`: unsigned integers,
//!  - `<f2`, `>f2`, `<f4`, `>f4`, `<f8`, `>f8`: IEEE 754 floating point numbers.
//!
//! `bool`, `b1`, complex numbers, the `|` marker, and byte order markers on 8-bit integers are recognised but unsupported.

use derive_more::Display;
use half::f16;
use thiserror::Error;

use crate::metadata::FillValueMetadata;

use super::{Endianness, FillValue};

/// The kind of a data type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum DataTypeKind {
    /// A signed integer.
    #[display("i")]
    Int,
    /// An unsigned integer.
    #[display("u")]
    UInt,
    /// An IEEE 754 floating point number.
    #[display("f")]
    Float,
}

/// A data type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct DataType {
    kind: DataTypeKind,
    size: usize,
    /// [`None`] for 8-bit data types.
    endianness: Option<Endianness>,
}

/// A data type error.
#[derive(Debug, Error)]
pub enum DataTypeError {
    /// A malformed data type token.
    #[error("invalid data type {0}")]
    Invalid(String),
    /// A recognised but unsupported data type.
    #[error("unsupported data type {0}")]
    Unsupported(String),
}

/// A fill value is incompatible with a data type.
#[derive(Debug, Error)]
#[error("incompatible fill value {1} for data type {0}")]
pub struct IncompatibleFillValueError(String, FillValueMetadata);

impl DataType {
    /// Create a data type from a token such as `<f8` or `u1`.
    ///
    /// # Errors
    /// Returns [`DataTypeError::Unsupported`] if the data type is recognised but unsupported, or [`DataTypeError::Invalid`] otherwise.
    pub fn from_token(token: &str) -> Result<Self, DataTypeError> {
        let invalid = || DataTypeError::Invalid(token.to_string());
        let unsupported = || DataTypeError::Unsupported(token.to_string());
        if token == "bool" {
            return Err(unsupported());
        }

        let mut chars = token.chars();
        let (marker, kind) = match chars.next() {
            Some(marker @ ('<' | '>' | '|')) => (Some(marker), chars.next().ok_or_else(invalid)?),
            Some(kind) => (None, kind),
            None => return Err(invalid()),
        };
        let size = chars.as_str();
        if size.is_empty() || !size.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid());
        }
        let size: usize = size.parse().map_err(|_| invalid())?;

        let kind = match kind {
            'i' => DataTypeKind::Int,
            'u' => DataTypeKind::UInt,
            'f' => DataTypeKind::Float,
            'b' | 'c' => return Err(unsupported()),
            _ => return Err(invalid()),
        };
        let valid_size = match kind {
            DataTypeKind::Int | DataTypeKind::UInt => matches!(size, 1 | 2 | 4 | 8),
            DataTypeKind::Float => matches!(size, 2 | 4 | 8),
        };
        if !valid_size {
            return Err(invalid());
        }

        let endianness = match (marker, size) {
            (Some('|'), _) | (Some(_), 1) => return Err(unsupported()),
            (None, 1) => None,
            (Some('<'), _) => Some(Endianness::Little),
            (Some('>'), _) => Some(Endianness::Big),
            _ => return Err(invalid()),
        };

        Ok(Self {
            kind,
            size,
            endianness,
        })
    }

    /// The kind of the data type.
    #[must_use]
    pub const fn kind(&self) -> DataTypeKind {
        self.kind
    }

    /// The size of an element in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// The byte order of encoded elements, or [`None`] for 8-bit data types.
    #[must_use]
    pub const fn endianness(&self) -> Option<Endianness> {
        self.endianness
    }

    /// Returns true if encoded elements must be byte swapped to or from native order.
    #[must_use]
    pub fn needs_byte_swap(&self) -> bool {
        self.endianness
            .is_some_and(|endianness| !endianness.is_native())
    }

    /// Create a fill value in native byte order from metadata.
    ///
    /// A `null` fill value is zero.
    ///
    /// # Errors
    /// Returns [`IncompatibleFillValueError`] if the fill value is incompatible with the data type.
    #[allow(clippy::cast_possible_truncation)]
    pub fn fill_value_from_metadata(
        &self,
        fill_value: &FillValueMetadata,
    ) -> Result<FillValue, IncompatibleFillValueError> {
        use DataTypeKind as K;
        use FillValue as FV;
        if fill_value.is_null() {
            return Ok(FV::new(vec![0; self.size]));
        }
        let err = || IncompatibleFillValueError(self.to_string(), fill_value.clone());
        match (self.kind, self.size) {
            (K::Int, 1) => Ok(FV::from(fill_value.try_as_int::<i8>().ok_or_else(err)?)),
            (K::Int, 2) => Ok(FV::from(fill_value.try_as_int::<i16>().ok_or_else(err)?)),
            (K::Int, 4) => Ok(FV::from(fill_value.try_as_int::<i32>().ok_or_else(err)?)),
            (K::Int, 8) => Ok(FV::from(fill_value.try_as_int::<i64>().ok_or_else(err)?)),
            (K::UInt, 1) => Ok(FV::from(fill_value.try_as_uint::<u8>().ok_or_else(err)?)),
            (K::UInt, 2) => Ok(FV::from(fill_value.try_as_uint::<u16>().ok_or_else(err)?)),
            (K::UInt, 4) => Ok(FV::from(fill_value.try_as_uint::<u32>().ok_or_else(err)?)),
            (K::UInt, 8) => Ok(FV::from(fill_value.try_as_uint::<u64>().ok_or_else(err)?)),
            (K::Float, 2) => Ok(FV::from(f16::from_f64(
                fill_value.try_as_f64().ok_or_else(err)?,
            ))),
            (K::Float, 4) => Ok(FV::from(fill_value.try_as_f64().ok_or_else(err)? as f32)),
            (K::Float, 8) => Ok(FV::from(fill_value.try_as_f64().ok_or_else(err)?)),
            _ => Err(err()),
        }
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if let Some(endianness) = self.endianness {
            write!(f, "{}", endianness.marker())?;
        }
        write!(f, "{}{}", self.kind, self.size)
    }
}

impl TryFrom<&str> for DataType {
    type Error = DataTypeError;

    fn try_from(token: &str) -> Result<Self, Self::Error> {
        Self::from_token(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_supported() {
        for token in [
            "i1", "u1", "<i2", ">i2", "<i4", ">i4", "<i8", ">i8", "<u2", ">u2", "<u4", ">u4",
            "<u8", ">u8", "<f2", ">f2", "<f4", ">f4", "<f8", ">f8",
        ] {
            let data_type = DataType::from_token(token).unwrap();
            assert_eq!(data_type.to_string(), token);
        }
        let data_type = DataType::from_token(">f8").unwrap();
        assert_eq!(data_type.kind(), DataTypeKind::Float);
        assert_eq!(data_type.size(), 8);
        assert_eq!(data_type.endianness(), Some(Endianness::Big));
        assert_eq!(data_type.needs_byte_swap(), !Endianness::Big.is_native());
        assert!(!DataType::from_token("u1").unwrap().needs_byte_swap());
    }

    #[test]
    fn data_type_unsupported() {
        for token in ["bool", "b1", "<b1", "|b1", "<c8", "<u1", ">i1", "|u1", "|i4"] {
            assert!(
                matches!(DataType::from_token(token), Err(DataTypeError::Unsupported(_))),
                "{token}"
            );
        }
    }

    #[test]
    fn data_type_invalid() {
        for token in ["", "<", "x", "<i3", "<f1", "i2", "<x4", "<i", "<i4x", "int32", "f8"] {
            assert!(
                matches!(DataType::from_token(token), Err(DataTypeError::Invalid(_))),
                "{token}"
            );
        }
    }

    #[test]
    fn data_type_fill_value() {
        let data_type = DataType::from_token(">i2").unwrap();
        assert_eq!(
            data_type
                .fill_value_from_metadata(&FillValueMetadata::Int(-2))
                .unwrap()
                .as_ne_bytes(),
            (-2i16).to_ne_bytes()
        );
        assert_eq!(
            data_type
                .fill_value_from_metadata(&FillValueMetadata::Null)
                .unwrap()
                .as_ne_bytes(),
            &[0, 0]
        );
        assert!(data_type
            .fill_value_from_metadata(&FillValueMetadata::UInt(40000))
            .is_err());
        assert!(data_type
            .fill_value_from_metadata(&FillValueMetadata::from(1.5f64))
            .is_err());

        let data_type = DataType::from_token("u1").unwrap();
        assert!(data_type
            .fill_value_from_metadata(&FillValueMetadata::Int(-1))
            .is_err());

        let data_type = DataType::from_token("<f4").unwrap();
        assert_eq!(
            data_type
                .fill_value_from_metadata(&FillValueMetadata::from(f64::NAN))
                .unwrap()
                .as_ne_bytes()
                .len(),
            4
        );
        assert_eq!(
            data_type
                .fill_value_from_metadata(&FillValueMetadata::UInt(3))
                .unwrap()
                .as_ne_bytes(),
            3.0f32.to_ne_bytes()
        );

        let data_type = DataType::from_token("<f2").unwrap();
        assert_eq!(
            data_type
                .fill_value_from_metadata(&FillValueMetadata::from(0.5f64))
                .unwrap()
                .as_ne_bytes(),
            f16::from_f32(0.5).to_ne_bytes()
        );
    }
}
