//! Bounded, zero-copy cursor over a byte slice.
//!
//! `Cursor` walks a borrowed buffer one argument at a time; every step is
//! bounds-checked against the slice it borrows, so a truncated or malformed
//! buffer surfaces as an `Err` rather than an out-of-bounds read — see
//! DESIGN.md's Open Question resolution #1 for why this crate always
//! bounds-checks the reader instead of requiring validation up front.

use byteorder::{BigEndian, ByteOrder};

use crate::error::OscError;
use crate::types::{MidiMessage, OscArg, TimeTag};
use crate::wire;

#[cfg(feature = "osc-1-1")]
use crate::types::Rgba;

/// A cursor walking a borrowed byte slice one argument at a time.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Cursor { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether the cursor has consumed the entire buffer, exactly.
    pub fn is_at_end(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// The unconsumed tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    fn require(&self, n: usize) -> Result<(), OscError> {
        if n > self.remaining() {
            Err(OscError::Truncated)
        } else {
            Ok(())
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], OscError> {
        self.require(n)?;
        let s = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }

    fn nul_terminated_str(&mut self) -> Result<&'a str, OscError> {
        let rest = self.rest();
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(OscError::UnterminatedString)?;
        let total = wire::padded_string_len(nul);
        self.require(total)?;
        let s = std::str::from_utf8(&rest[..nul]).map_err(|_| OscError::InvalidUtf8)?;
        self.pos += total;
        Ok(s)
    }

    /// Reads a 32-bit signed integer (`i`).
    pub fn get_i32(&mut self) -> Result<i32, OscError> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    /// Reads a 32-bit float (`f`).
    pub fn get_f32(&mut self) -> Result<f32, OscError> {
        Ok(BigEndian::read_f32(self.take(4)?))
    }

    /// Reads a 64-bit signed integer (`h`).
    pub fn get_i64(&mut self) -> Result<i64, OscError> {
        Ok(BigEndian::read_i64(self.take(8)?))
    }

    /// Reads a 64-bit float (`d`).
    pub fn get_f64(&mut self) -> Result<f64, OscError> {
        Ok(BigEndian::read_f64(self.take(8)?))
    }

    /// Reads a raw 64-bit timetag (`t`).
    pub fn get_timetag(&mut self) -> Result<TimeTag, OscError> {
        Ok(TimeTag(BigEndian::read_u64(self.take(8)?)))
    }

    /// Reads a NUL-terminated, zero-padded string (`s`).
    pub fn get_str(&mut self) -> Result<&'a str, OscError> {
        self.nul_terminated_str()
    }

    /// Reads a NUL-terminated, zero-padded symbol (`S`) — same wire shape as a string.
    pub fn get_symbol(&mut self) -> Result<&'a str, OscError> {
        self.nul_terminated_str()
    }

    /// Reads a length-prefixed, zero-padded blob (`b`). The returned slice
    /// excludes the padding.
    pub fn get_blob(&mut self) -> Result<&'a [u8], OscError> {
        let size = self.get_i32()?;
        if size < 0 {
            return Err(OscError::NegativeLength);
        }
        let size = size as usize;
        // `padded_blob_len` counts the 4-byte size prefix already consumed above.
        let bytes = self.take(wire::padded_blob_len(size) - 4)?;
        Ok(&bytes[..size])
    }

    /// Reads a char (`c`): a 32-bit int on the wire, low byte significant.
    pub fn get_char(&mut self) -> Result<char, OscError> {
        let raw = self.get_i32()? as u32 & 0xff;
        char::from_u32(raw).ok_or(OscError::InvalidUtf8)
    }

    /// Reads a raw 4-byte MIDI packet (`m`).
    pub fn get_midi(&mut self) -> Result<MidiMessage, OscError> {
        let b = self.take(4)?;
        Ok(MidiMessage::from_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads an RGBA color (`r`, OSC 1.1 only).
    #[cfg(feature = "osc-1-1")]
    pub fn get_color(&mut self) -> Result<Rgba, OscError> {
        let b = self.take(4)?;
        Ok(Rgba {
            red: b[0],
            green: b[1],
            blue: b[2],
            alpha: b[3],
        })
    }

    /// Reads a single argument whose shape is given by `tag`, dispatched on
    /// the tag character.
    pub fn get(&mut self, tag: char) -> Result<OscArg<'a>, OscError> {
        Ok(match tag {
            'i' => OscArg::Int(self.get_i32()?),
            'f' => OscArg::Float(self.get_f32()?),
            's' => OscArg::Str(self.get_str()?),
            'b' => OscArg::Blob(self.get_blob()?),
            'h' => OscArg::Long(self.get_i64()?),
            'd' => OscArg::Double(self.get_f64()?),
            't' => OscArg::Time(self.get_timetag()?),
            'S' => OscArg::Symbol(self.get_symbol()?),
            'c' => OscArg::Char(self.get_char()?),
            'm' => OscArg::Midi(self.get_midi()?),
            'T' => OscArg::True,
            'F' => OscArg::False,
            'N' => OscArg::Nil,
            'I' => OscArg::Inf,
            #[cfg(feature = "osc-1-1")]
            'r' => OscArg::Color(self.get_color()?),
            other => return Err(OscError::UnknownTag(other)),
        })
    }

    /// Advances past a single argument of the given tag's shape without
    /// materializing it. Used by the validator, which only needs to
    /// know that the cursor arithmetic works out, not the decoded values.
    pub fn skip(&mut self, tag: char) -> Result<(), OscError> {
        match tag {
            'i' | 'f' | 'c' | 'm' => {
                self.take(4)?;
            }
            'h' | 'd' | 't' => {
                self.take(8)?;
            }
            's' | 'S' => {
                self.nul_terminated_str()?;
            }
            'b' => {
                self.get_blob()?;
            }
            'T' | 'F' | 'N' | 'I' => {}
            #[cfg(feature = "osc-1-1")]
            'r' => {
                self.take(4)?;
            }
            other => return Err(OscError::UnknownTag(other)),
        }
        Ok(())
    }

    /// Reads an OSC address path (a NUL-terminated, zero-padded string) with
    /// no grammar checking — used where the caller trusts the buffer has
    /// already passed [`crate::validate::check_packet`].
    pub(crate) fn read_raw_path(&mut self) -> Result<&'a str, OscError> {
        self.nul_terminated_str()
    }

    /// Reads a type-tag field (the comma plus the tag characters) with no
    /// grammar checking, returning the tag characters with the comma
    /// stripped.
    pub(crate) fn read_raw_type_tags(&mut self) -> Result<&'a str, OscError> {
        let full = self.nul_terminated_str()?;
        full.strip_prefix(',').ok_or(OscError::BadTypeTag)
    }
}

/// Advances `cursor` past one argument of `tag`'s shape without
/// materializing it — the free-function form of [`Cursor::skip`].
pub fn skip(tag: char, cursor: &mut Cursor<'_>) -> Result<(), OscError> {
    cursor.skip(tag)
}

/// Reads one argument of `tag`'s shape from `cursor` — the free-function
/// form of [`Cursor::get`].
pub fn get<'a>(tag: char, cursor: &mut Cursor<'a>) -> Result<OscArg<'a>, OscError> {
    cursor.get(tag)
}

/// Walks a type-tag string against a cursor, yielding one decoded argument
/// per tag character.
#[derive(Debug)]
pub struct ArgIter<'a> {
    tags: std::str::Chars<'a>,
    cursor: Cursor<'a>,
    poisoned: bool,
}

impl<'a> ArgIter<'a> {
    pub(crate) fn new(type_tags: &'a str, arg_bytes: &'a [u8]) -> Self {
        ArgIter {
            tags: type_tags.chars(),
            cursor: Cursor::new(arg_bytes),
            poisoned: false,
        }
    }
}

impl<'a> Iterator for ArgIter<'a> {
    type Item = Result<OscArg<'a>, OscError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned {
            return None;
        }
        let tag = self.tags.next()?;
        match self.cursor.get(tag) {
            Ok(arg) => Some(Ok(arg)),
            Err(e) => {
                self.poisoned = true;
                Some(Err(e))
            }
        }
    }
}
