//! Bounded packet assembly: writing messages and nested bundles.
//!
//! `Writer` assembles a message or a tree of nested bundles into a
//! caller-provided buffer. Every write is checked against the buffer's end;
//! the first failure poisons the writer so every subsequent call becomes a
//! no-op, and [`Writer::finish`] is where that poisoning finally surfaces as
//! an `Err` — a single trailing check instead of threading a `Result`
//! through every chained call, with `Option<usize>` standing in for a null
//! cursor.

use byteorder::{BigEndian, ByteOrder};

use crate::error::OscError;
use crate::types::{MidiMessage, OscArg, TimeTag};
use crate::wire;

#[cfg(feature = "osc-1-1")]
use crate::types::Rgba;

/// A handle to an in-progress bundle, returned by [`Writer::start_bundle`]
/// and consumed by [`Writer::end_bundle`].
#[derive(Debug, Clone, Copy)]
pub struct BundleMark(usize);

/// A handle to an in-progress bundle element, returned by
/// [`Writer::start_bundle_item`] and consumed by [`Writer::end_bundle_item`].
#[derive(Debug, Clone, Copy)]
pub struct ItemMark(usize);

/// A bounded cursor writing into a borrowed, mutable output buffer.
#[derive(Debug)]
pub struct Writer<'a> {
    buf: &'a mut [u8],
    pos: Option<usize>,
}

impl<'a> Writer<'a> {
    /// Creates a writer over the full extent of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Writer { buf, pos: Some(0) }
    }

    /// Bytes written so far, or `None` if a prior write has already failed.
    pub fn position(&self) -> Option<usize> {
        self.pos
    }

    fn reserve(&mut self, n: usize) -> Option<usize> {
        let p = self.pos?;
        if p + n > self.buf.len() {
            self.pos = None;
            return None;
        }
        self.pos = Some(p + n);
        Some(p)
    }

    fn write_padded(&mut self, bytes: &[u8], total: usize) -> Option<usize> {
        let p = self.reserve(total)?;
        self.buf[p..p + bytes.len()].copy_from_slice(bytes);
        for b in &mut self.buf[p + bytes.len()..p + total] {
            *b = 0;
        }
        Some(p)
    }

    /// Writes a 32-bit signed integer (`i`).
    pub fn set_i32(&mut self, v: i32) -> &mut Self {
        if let Some(p) = self.reserve(4) {
            BigEndian::write_i32(&mut self.buf[p..p + 4], v);
        }
        self
    }

    /// Writes a 32-bit float (`f`).
    pub fn set_f32(&mut self, v: f32) -> &mut Self {
        if let Some(p) = self.reserve(4) {
            BigEndian::write_f32(&mut self.buf[p..p + 4], v);
        }
        self
    }

    /// Writes a 64-bit signed integer (`h`).
    pub fn set_i64(&mut self, v: i64) -> &mut Self {
        if let Some(p) = self.reserve(8) {
            BigEndian::write_i64(&mut self.buf[p..p + 8], v);
        }
        self
    }

    /// Writes a 64-bit float (`d`).
    pub fn set_f64(&mut self, v: f64) -> &mut Self {
        if let Some(p) = self.reserve(8) {
            BigEndian::write_f64(&mut self.buf[p..p + 8], v);
        }
        self
    }

    /// Writes a raw 64-bit timetag (`t`).
    pub fn set_timetag(&mut self, t: TimeTag) -> &mut Self {
        if let Some(p) = self.reserve(8) {
            BigEndian::write_u64(&mut self.buf[p..p + 8], t.0);
        }
        self
    }

    /// Writes a NUL-terminated, zero-padded string (`s`).
    pub fn set_str(&mut self, s: &str) -> &mut Self {
        let total = wire::padded_string_len(s.len());
        self.write_padded(s.as_bytes(), total);
        self
    }

    /// Writes a NUL-terminated, zero-padded symbol (`S`) — same wire shape
    /// as a string.
    pub fn set_symbol(&mut self, s: &str) -> &mut Self {
        self.set_str(s)
    }

    /// Writes a length-prefixed, zero-padded blob (`b`).
    pub fn set_blob(&mut self, data: &[u8]) -> &mut Self {
        self.set_i32(data.len() as i32);
        // `padded_blob_len` counts the 4-byte size prefix already written above.
        self.write_padded(data, wire::padded_blob_len(data.len()) - 4);
        self
    }

    /// Reserves `size` bytes for a blob payload and returns a mutable view
    /// into them, so the caller can fill it in place instead of building a
    /// separate buffer first.
    pub fn reserve_blob(&mut self, size: usize) -> Option<&mut [u8]> {
        self.set_i32(size as i32);
        let payload_total = wire::padded_blob_len(size) - 4;
        let p = self.reserve(payload_total)?;
        for b in &mut self.buf[p + size..p + payload_total] {
            *b = 0;
        }
        Some(&mut self.buf[p..p + size])
    }

    /// Writes a char (`c`): the low byte of the codepoint, in a 32-bit slot.
    pub fn set_char(&mut self, c: char) -> &mut Self {
        self.set_i32((c as u32 & 0xff) as i32)
    }

    /// Writes a raw 4-byte MIDI packet (`m`).
    pub fn set_midi(&mut self, m: MidiMessage) -> &mut Self {
        if let Some(p) = self.reserve(4) {
            self.buf[p..p + 4].copy_from_slice(&m.to_bytes());
        }
        self
    }

    /// Reserves a 4-byte MIDI slot and returns it for the caller to fill
    /// directly instead of building it in a separate buffer first.
    pub fn reserve_midi(&mut self) -> Option<&mut [u8]> {
        let p = self.reserve(4)?;
        Some(&mut self.buf[p..p + 4])
    }

    /// Writes an RGBA color (`r`, OSC 1.1 only).
    #[cfg(feature = "osc-1-1")]
    pub fn set_color(&mut self, c: Rgba) -> &mut Self {
        if let Some(p) = self.reserve(4) {
            self.buf[p..p + 4].copy_from_slice(&[c.red, c.green, c.blue, c.alpha]);
        }
        self
    }

    /// Writes a single argument, dispatching on its variant.
    pub fn set(&mut self, arg: &OscArg<'_>) -> &mut Self {
        match arg {
            OscArg::Int(v) => self.set_i32(*v),
            OscArg::Float(v) => self.set_f32(*v),
            OscArg::Str(v) => self.set_str(v),
            OscArg::Blob(v) => self.set_blob(v),
            OscArg::Long(v) => self.set_i64(*v),
            OscArg::Double(v) => self.set_f64(*v),
            OscArg::Time(v) => self.set_timetag(*v),
            OscArg::Symbol(v) => self.set_symbol(v),
            OscArg::Char(v) => self.set_char(*v),
            OscArg::Midi(v) => self.set_midi(*v),
            OscArg::True | OscArg::False | OscArg::Nil | OscArg::Inf => self,
            #[cfg(feature = "osc-1-1")]
            OscArg::Color(v) => self.set_color(*v),
        }
    }

    /// Writes a complete message: path, a type-tag string derived from
    /// `args`, then the arguments themselves, over a slice of values instead
    /// of a variadic argument list.
    pub fn write_message(&mut self, path: &str, args: &[OscArg<'_>]) -> &mut Self {
        self.set_str(path);
        let mut tags = String::with_capacity(args.len() + 1);
        tags.push(',');
        tags.extend(args.iter().map(|a| a.tag()));
        self.set_str(&tags);
        for arg in args {
            self.set(arg);
        }
        self
    }

    /// Begins a bundle: writes the `#bundle\0` magic and the timetag, and
    /// returns a mark to pass to [`Self::end_bundle`].
    pub fn start_bundle(&mut self, timetag: TimeTag) -> Option<BundleMark> {
        let base = self.pos?;
        self.write_padded(wire::BUNDLE_TAG, 8)?;
        self.set_timetag(timetag);
        self.pos?;
        Some(BundleMark(base))
    }

    /// Closes a bundle opened with `bndl`. If nothing was written inside it
    /// (header and timetag only), the bundle is rolled back entirely.
    pub fn end_bundle(&mut self, bndl: BundleMark) -> Option<()> {
        let cur = self.pos?;
        if cur == bndl.0 + 16 {
            self.pos = Some(bndl.0);
        }
        Some(())
    }

    /// Reserves a 4-byte size placeholder for a bundle element and returns a
    /// mark to pass to [`Self::end_bundle_item`].
    pub fn start_bundle_item(&mut self) -> Option<ItemMark> {
        let base = self.pos?;
        self.reserve(4)?;
        Some(ItemMark(base))
    }

    /// Back-patches the size placeholder reserved by `item` with the number
    /// of payload bytes written since. If the payload is empty, the
    /// reservation itself is rolled back.
    pub fn end_bundle_item(&mut self, item: ItemMark) -> Option<()> {
        let cur = self.pos?;
        let payload_len = cur - (item.0 + 4);
        if payload_len == 0 {
            self.pos = Some(item.0);
        } else {
            BigEndian::write_u32(&mut self.buf[item.0..item.0 + 4], payload_len as u32);
        }
        Some(())
    }

    /// `start_bundle_item; write_message; end_bundle_item`, composed
    /// atomically.
    pub fn write_bundle_item(&mut self, path: &str, args: &[OscArg<'_>]) -> Option<()> {
        let item = self.start_bundle_item()?;
        self.write_message(path, args);
        self.end_bundle_item(item)
    }

    /// Finishes the build, returning the written slice or `Err` if any
    /// write along the way exceeded the buffer's bound.
    pub fn finish(self) -> Result<&'a [u8], OscError> {
        match self.pos {
            Some(p) => Ok(&self.buf[..p]),
            None => Err(OscError::BufferFull),
        }
    }
}
