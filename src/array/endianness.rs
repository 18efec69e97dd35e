use derive_more::Display;

/// The endianness of each element in an array, either `big` or `little`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum Endianness {
    /// Little endian.
    #[display("little")]
    Little,

    /// Big endian.
    #[display("big")]
    Big,
}

impl Endianness {
    /// Return true if the endianness matches the endianness of the CPU.
    #[must_use]
    pub fn is_native(self) -> bool {
        self == NATIVE_ENDIAN
    }

    /// The byte order marker of a data type token, `<` (little) or `>` (big).
    #[must_use]
    pub const fn marker(self) -> char {
        match self {
            Self::Little => '<',
            Self::Big => '>',
        }
    }
}

/// The endianness of the CPU.
pub const NATIVE_ENDIAN: Endianness = if cfg!(target_endian = "big") {
    Endianness::Big
} else {
    Endianness::Little
};

/// Reverse the bytes of each `element_size` element of `bytes` in place.
///
/// Byte swapping is self-inverse. A trailing partial element is left untouched.
pub fn byte_swap(bytes: &mut [u8], element_size: usize) {
    if element_size > 1 {
        for element in bytes.chunks_exact_mut(element_size) {
            element.reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endianness() {
        assert!(NATIVE_ENDIAN.is_native());
        assert_eq!(Endianness::Little.marker(), '<');
        assert_eq!(Endianness::Big.to_string(), "big");
    }

    #[test]
    fn byte_swap_self_inverse() {
        let original: Vec<u8> = (0..24).collect();
        for element_size in [1, 2, 4, 8] {
            let mut bytes = original.clone();
            byte_swap(&mut bytes, element_size);
            if element_size > 1 {
                assert_ne!(bytes, original);
            }
            byte_swap(&mut bytes, element_size);
            assert_eq!(bytes, original);
        }
    }

    #[test]
    fn byte_swap_u32() {
        let mut bytes = 0x0102_0304u32.to_le_bytes().to_vec();
        byte_swap(&mut bytes, 4);
        assert_eq!(bytes, 0x0102_0304u32.to_be_bytes());
    }
}
