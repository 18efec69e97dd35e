//! Chunk key encoding.
//!
//! The key of a chunk with grid coordinates `(k, j, i, ...)` is the prefix `c` followed by the ASCII decimal coordinates joined by a [`ChunkKeySeparator`], e.g. `c1/23/45` or `c1.23.45`.
//! A chunk key is relative to the data prefix of its array, see [`data_key`](crate::storage::data_key).

use derive_more::Display;
use itertools::Itertools;

/// A chunk key separator.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Default)]
pub enum ChunkKeySeparator {
    /// The slash '/' character.
    #[default]
    #[display("/")]
    Slash,
    /// The dot '.' character.
    #[display(".")]
    Dot,
}

impl ChunkKeySeparator {
    /// Encode chunk grid coordinates into a chunk key, e.g. `c1/23/45`.
    #[must_use]
    pub fn encode(self, chunk_grid_indices: &[u64]) -> String {
        format!("c{}", chunk_grid_indices.iter().join(&self.to_string()))
    }
}

impl TryFrom<char> for ChunkKeySeparator {
    type Error = char;

    fn try_from(separator: char) -> Result<Self, Self::Error> {
        if separator == '/' {
            Ok(Self::Slash)
        } else if separator == '.' {
            Ok(Self::Dot)
        } else {
            Err(separator)
        }
    }
}

impl serde::Serialize for ChunkKeySeparator {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Slash => s.serialize_char('/'),
            Self::Dot => s.serialize_char('.'),
        }
    }
}

impl<'de> serde::Deserialize<'de> for ChunkKeySeparator {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(d)?;
        if let serde_json::Value::String(separator) = value {
            if separator == "/" {
                return Ok(Self::Slash);
            } else if separator == "." {
                return Ok(Self::Dot);
            }
        }
        Err(serde::de::Error::custom(
            "chunk key separator must be a `.` or `/`.",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_key_separator() {
        assert_eq!(ChunkKeySeparator::Slash.encode(&[1, 23, 45]), "c1/23/45");
        assert_eq!(ChunkKeySeparator::Dot.encode(&[1, 23, 45]), "c1.23.45");
        assert_eq!(ChunkKeySeparator::Dot.encode(&[]), "c");
        assert_eq!(ChunkKeySeparator::try_from('.'), Ok(ChunkKeySeparator::Dot));
        assert_eq!(ChunkKeySeparator::try_from('-'), Err('-'));
        assert_eq!(ChunkKeySeparator::default(), ChunkKeySeparator::Slash);
    }

    #[test]
    fn chunk_key_separator_serde() {
        assert_eq!(serde_json::to_string(&ChunkKeySeparator::Dot).unwrap(), r#"".""#);
        assert_eq!(
            serde_json::from_str::<ChunkKeySeparator>(r#""/""#).unwrap(),
            ChunkKeySeparator::Slash
        );
        assert!(serde_json::from_str::<ChunkKeySeparator>(r#""-""#).is_err());
    }
}
