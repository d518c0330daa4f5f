//! The decoded data model: atomic argument values, messages and bundles.
//!
//! Everything here borrows from the input buffer it was decoded from —
//! strings, blobs and MIDI packets are views, never copies, and none of this
//! module allocates on the read path.

use std::fmt;

/// An opaque 64-bit OSC time value (NTP-style seconds.fraction on the wire;
/// this codec never interprets the bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeTag(pub u64);

impl TimeTag {
    /// The reserved value meaning "dispatch immediately".
    pub const IMMEDIATE: TimeTag = TimeTag(1);

    /// Whether this is the reserved "immediate" value.
    pub fn is_immediate(&self) -> bool {
        self.0 == Self::IMMEDIATE.0
    }
}

impl From<u64> for TimeTag {
    fn from(raw: u64) -> Self {
        TimeTag(raw)
    }
}

/// A 4-byte MIDI message, as carried by the `m` type tag: port id followed by
/// three raw MIDI bytes (status, data1, data2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiMessage {
    /// The MIDI port/cable number this message arrived on.
    pub port: u8,
    /// The MIDI status byte (message type and channel).
    pub status: u8,
    /// The first MIDI data byte.
    pub data1: u8,
    /// The second MIDI data byte.
    pub data2: u8,
}

impl MidiMessage {
    pub(crate) fn from_bytes(b: [u8; 4]) -> Self {
        MidiMessage {
            port: b[0],
            status: b[1],
            data1: b[2],
            data2: b[3],
        }
    }

    pub(crate) fn to_bytes(self) -> [u8; 4] {
        [self.port, self.status, self.data1, self.data2]
    }
}

/// A color value, as carried by the OSC 1.1 `r` type tag.
#[cfg(feature = "osc-1-1")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
    /// Alpha channel.
    pub alpha: u8,
}

/// A single decoded OSC argument value, borrowing from the packet it came
/// from.
#[derive(Clone, PartialEq)]
pub enum OscArg<'a> {
    /// A 32-bit signed integer (`i`).
    Int(i32),
    /// A 32-bit float (`f`).
    Float(f32),
    /// A NUL-terminated string (`s`).
    Str(&'a str),
    /// A length-prefixed byte blob (`b`), excluding its padding.
    Blob(&'a [u8]),
    /// A 64-bit signed integer (`h`).
    Long(i64),
    /// A 64-bit float (`d`).
    Double(f64),
    /// A 64-bit timetag (`t`).
    Time(TimeTag),
    /// A NUL-terminated symbol (`S`), wire-identical to [`Self::Str`].
    Symbol(&'a str),
    /// A single character (`c`), carried in the low byte of a 32-bit slot.
    Char(char),
    /// A 4-byte MIDI packet (`m`).
    Midi(MidiMessage),
    /// The boolean `true` (`T`); carries no payload bytes.
    True,
    /// The boolean `false` (`F`); carries no payload bytes.
    False,
    /// A nil/null value (`N`); carries no payload bytes.
    Nil,
    /// "Infinitum"/bang (`I`); carries no payload bytes.
    Inf,
    /// An RGBA color (`r`, OSC 1.1 only).
    #[cfg(feature = "osc-1-1")]
    Color(Rgba),
}

impl<'a> OscArg<'a> {
    /// The type-tag character this value is encoded under.
    pub fn tag(&self) -> char {
        match self {
            OscArg::Int(_) => 'i',
            OscArg::Float(_) => 'f',
            OscArg::Str(_) => 's',
            OscArg::Blob(_) => 'b',
            OscArg::Long(_) => 'h',
            OscArg::Double(_) => 'd',
            OscArg::Time(_) => 't',
            OscArg::Symbol(_) => 'S',
            OscArg::Char(_) => 'c',
            OscArg::Midi(_) => 'm',
            OscArg::True => 'T',
            OscArg::False => 'F',
            OscArg::Nil => 'N',
            OscArg::Inf => 'I',
            #[cfg(feature = "osc-1-1")]
            OscArg::Color(_) => 'r',
        }
    }
}

impl<'a> fmt::Debug for OscArg<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OscArg::Int(v) => write!(f, "Int({v})"),
            OscArg::Float(v) => write!(f, "Float({v})"),
            OscArg::Str(v) => write!(f, "Str({v:?})"),
            OscArg::Blob(v) => write!(f, "Blob({} bytes)", v.len()),
            OscArg::Long(v) => write!(f, "Long({v})"),
            OscArg::Double(v) => write!(f, "Double({v})"),
            OscArg::Time(v) => write!(f, "Time({})", v.0),
            OscArg::Symbol(v) => write!(f, "Symbol({v:?})"),
            OscArg::Char(v) => write!(f, "Char({v:?})"),
            OscArg::Midi(v) => write!(f, "Midi({v:?})"),
            OscArg::True => write!(f, "True"),
            OscArg::False => write!(f, "False"),
            OscArg::Nil => write!(f, "Nil"),
            OscArg::Inf => write!(f, "Inf"),
            #[cfg(feature = "osc-1-1")]
            OscArg::Color(v) => write!(f, "Color({v:?})"),
        }
    }
}

/// A decoded OSC message: an address path, a type-tag string (without its
/// leading comma) and the raw argument bytes, walked lazily via [`Self::args`].
#[derive(Clone, Copy)]
pub struct Message<'a> {
    /// The OSC address path, e.g. `/synth/1/freq`.
    pub path: &'a str,
    /// The type-tag string, decoded, with the leading `,` stripped.
    pub type_tags: &'a str,
    pub(crate) arg_bytes: &'a [u8],
}

impl<'a> fmt::Debug for Message<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("path", &self.path)
            .field("type_tags", &self.type_tags)
            .finish()
    }
}

impl<'a> Message<'a> {
    /// Iterates the decoded arguments in order: each step consumes exactly
    /// the wire width of its type-tag character.
    pub fn args(&self) -> crate::reader::ArgIter<'a> {
        crate::reader::ArgIter::new(self.type_tags, self.arg_bytes)
    }

    /// A cursor positioned at the start of the raw, undecoded argument
    /// bytes — what a dispatch callback receives instead of a pre-walked
    /// [`Self::args`] iterator, so it can bail out early without decoding
    /// arguments it doesn't need.
    pub fn arg_cursor(&self) -> crate::reader::Cursor<'a> {
        crate::reader::Cursor::new(self.arg_bytes)
    }

    /// Parses a message's path and type-tag header from `buf`, leaving the
    /// argument bytes unread (consumed lazily via [`Self::args`]).
    ///
    /// This does not check address-path or type-tag grammar — that's
    /// [`crate::validate::check_message`]'s job. Callers that haven't
    /// already validated untrusted input should run that first.
    pub fn parse(buf: &'a [u8]) -> Result<Self, crate::error::OscError> {
        let mut cursor = crate::reader::Cursor::new(buf);
        let path = cursor.read_raw_path()?;
        let type_tags = cursor.read_raw_type_tags()?;
        Ok(Message {
            path,
            type_tags,
            arg_bytes: cursor.rest(),
        })
    }
}
