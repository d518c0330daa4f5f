//! Big-endian scalar transfer and 4-byte-padded length arithmetic.
//!
//! Every OSC field is 4-byte aligned on the wire; this module is the one
//! place that knows how to compute a field's padded length. Readers and
//! writers both call into it so the padding rule only exists once.

use byteorder::{BigEndian, ByteOrder};

use crate::error::OscError;

/// Rounds `n` up to the next multiple of 4.
pub(crate) const fn round_up_4(n: usize) -> usize {
    (n + 3) & !3
}

/// Wire length of a NUL-terminated, zero-padded string of `len` content bytes
/// (not counting the NUL), minimum 4.
pub(crate) fn padded_string_len(len: usize) -> usize {
    round_up_4(len + 1).max(4)
}

/// Wire length of a blob: a 4-byte size prefix plus `size` payload bytes,
/// zero-padded to a multiple of 4.
pub(crate) fn padded_blob_len(size: usize) -> usize {
    4 + round_up_4(size)
}

pub(crate) const BUNDLE_TAG: &[u8; 8] = b"#bundle\0";

/// Reads the 4-byte size prefix of a bundle element at `*pos`, advances
/// `*pos` past it, and returns the element's payload length. Shared by the
/// validator, unroller and dispatcher so the bounds arithmetic for "a
/// length-prefixed element inside a bundle" exists exactly once.
pub(crate) fn read_element_len(buf: &[u8], pos: &mut usize) -> Result<usize, OscError> {
    if *pos + 4 > buf.len() {
        return Err(OscError::Truncated);
    }
    let n = BigEndian::read_i32(&buf[*pos..*pos + 4]);
    if n < 0 {
        return Err(OscError::NegativeLength);
    }
    let n = n as usize;
    *pos += 4;
    if *pos + n > buf.len() {
        return Err(OscError::Truncated);
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_multiple_of_four() {
        assert_eq!(round_up_4(0), 0);
        assert_eq!(round_up_4(1), 4);
        assert_eq!(round_up_4(4), 4);
        assert_eq!(round_up_4(5), 8);
    }

    #[test]
    fn string_length_has_a_floor_of_four() {
        assert_eq!(padded_string_len(0), 4); // "" -> "\0\0\0\0"
        assert_eq!(padded_string_len(1), 4); // "/a" path body -> 4
        assert_eq!(padded_string_len(3), 4); // len+1=4
        assert_eq!(padded_string_len(4), 8); // len+1=5 -> 8
    }

    #[test]
    fn blob_length_adds_the_size_prefix() {
        assert_eq!(padded_blob_len(0), 4);
        assert_eq!(padded_blob_len(1), 8);
        assert_eq!(padded_blob_len(4), 8);
        assert_eq!(padded_blob_len(5), 12);
    }
}
