//! Pure structural validation of untrusted input.
//!
//! `check_message`/`check_bundle`/`check_packet` never allocate and never
//! mutate the buffer they inspect, and are idempotent: calling one twice on
//! the same bytes always agrees with itself. They're built on the same
//! bounds-checked [`Cursor`] the decoder uses, rather than a second,
//! unchecked walk — see DESIGN.md's Open Question resolution #1.

use crate::error::OscError;
use crate::reader::Cursor;
use crate::wire;

fn is_legal_tag(c: char) -> bool {
    match c {
        'i' | 'f' | 's' | 'b' | 'T' | 'F' | 'N' | 'I' | 'h' | 'd' | 't' | 'S' | 'c' | 'm' => true,
        #[cfg(feature = "osc-1-1")]
        'r' => true,
        _ => false,
    }
}

fn is_valid_path(path: &str) -> bool {
    path.starts_with('/')
        && path
            .chars()
            .skip(1)
            .all(|c| c.is_ascii_graphic() && c != '#')
}

fn validate_message(buf: &[u8]) -> Result<(), OscError> {
    let mut cursor = Cursor::new(buf);

    let path = cursor.read_raw_path()?;
    if !is_valid_path(path) {
        return Err(OscError::BadPath);
    }

    let type_tags = cursor.read_raw_type_tags()?;
    if !type_tags.chars().all(is_legal_tag) {
        return Err(OscError::BadTypeTag);
    }

    for tag in type_tags.chars() {
        cursor.skip(tag)?;
    }

    if cursor.is_at_end() {
        Ok(())
    } else {
        Err(OscError::TrailingBytes)
    }
}

fn validate_bundle(buf: &[u8]) -> Result<(), OscError> {
    if buf.len() < 16 || &buf[0..8] != wire::BUNDLE_TAG {
        return Err(OscError::BadBundleMagic);
    }

    let mut pos = 16;
    while pos < buf.len() {
        let n = wire::read_element_len(buf, &mut pos)?;
        let element = &buf[pos..pos + n];

        match element.first() {
            Some(b'/') => validate_message(element)?,
            Some(b'#') => validate_bundle(element)?,
            _ => return Err(OscError::BadElement),
        }

        pos += n;
    }

    if pos == buf.len() {
        Ok(())
    } else {
        Err(OscError::TrailingBytes)
    }
}

/// Checks that `buf` is a structurally well-formed OSC message: a valid
/// path, a valid type-tag string, and arguments that consume exactly the
/// buffer's length.
pub fn check_message(buf: &[u8]) -> bool {
    match validate_message(buf) {
        Ok(()) => true,
        Err(e) => {
            log::debug!("message failed validation: {e}");
            false
        }
    }
}

/// Checks that `buf` is a structurally well-formed OSC bundle: the
/// `#bundle\0` magic, a timetag, and a sequence of length-prefixed elements
/// that are themselves valid messages or bundles, consuming exactly the
/// buffer's length.
pub fn check_bundle(buf: &[u8]) -> bool {
    match validate_bundle(buf) {
        Ok(()) => true,
        Err(e) => {
            log::debug!("bundle failed validation: {e}");
            false
        }
    }
}

/// Checks that `buf` is a structurally well-formed OSC packet: a message or
/// a bundle, dispatched on its first byte.
pub fn check_packet(buf: &[u8]) -> bool {
    match buf.first() {
        Some(b'/') => check_message(buf),
        Some(b'#') => check_bundle(buf),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_message_is_valid() {
        // "/a" + ",i" + 42
        let buf = [
            b'/', b'a', 0, 0, b',', b'i', 0, 0, 0x00, 0x00, 0x00, 0x2A,
        ];
        assert!(check_packet(&buf));
        assert!(check_message(&buf));
    }

    #[test]
    fn empty_argument_list_is_valid() {
        let buf = [b'/', b'p', b'i', b'n', b'g', 0, 0, 0, b',', 0, 0, 0];
        assert!(check_packet(&buf));
    }

    #[test]
    fn space_in_path_is_rejected() {
        let buf = [b'/', b' ', 0, 0, b',', 0, 0, 0];
        assert!(!check_packet(&buf));
    }

    #[test]
    fn hash_in_path_is_rejected() {
        let buf = [b'/', b'#', 0, 0, b',', 0, 0, 0];
        assert!(!check_packet(&buf));
    }

    #[test]
    fn missing_leading_slash_is_rejected() {
        let buf = [b'a', 0, 0, 0, b',', 0, 0, 0];
        assert!(!check_packet(&buf));
    }

    #[test]
    fn unknown_type_tag_is_rejected() {
        let buf = [b'/', b'a', 0, 0, b',', b'z', 0, 0];
        assert!(!check_packet(&buf));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut buf = vec![b'/', b'a', 0, 0, b',', 0, 0, 0];
        buf.extend_from_slice(&[0, 0, 0, 0]);
        assert!(!check_packet(&buf));
    }

    #[test]
    fn empty_bundle_is_valid() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"#bundle\0");
        buf.extend_from_slice(&1u64.to_be_bytes());
        assert!(check_packet(&buf));
        assert!(check_bundle(&buf));
    }

    #[test]
    fn bundle_with_two_messages() {
        let msg_a = [b'/', b'a', 0, 0, b',', b'i', 0, 0, 0, 0, 0, 1];
        let msg_b = [b'/', b'b', 0, 0, b',', b'i', 0, 0, 0, 0, 0, 2];

        let mut buf = Vec::new();
        buf.extend_from_slice(b"#bundle\0");
        buf.extend_from_slice(&1u64.to_be_bytes());
        buf.extend_from_slice(&(msg_a.len() as i32).to_be_bytes());
        buf.extend_from_slice(&msg_a);
        buf.extend_from_slice(&(msg_b.len() as i32).to_be_bytes());
        buf.extend_from_slice(&msg_b);

        assert!(check_packet(&buf));
    }

    #[test]
    fn element_size_extending_past_end_is_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"#bundle\0");
        buf.extend_from_slice(&1u64.to_be_bytes());
        buf.extend_from_slice(&100i32.to_be_bytes()); // way past the actual data
        buf.extend_from_slice(&[b'/', b'a', 0, 0]);
        assert!(!check_packet(&buf));
    }

    #[test]
    fn bundle_missing_magic_is_rejected() {
        let buf = [0u8; 16];
        assert!(!check_bundle(&buf));
    }
}
