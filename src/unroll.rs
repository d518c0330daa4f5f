//! Bundle unrolling: turning a possibly-nested bundle into a flat sequence
//! of callbacks, at one of three fidelities.
//!
//! `unroll` assumes its input already passed [`crate::validate::check_packet`]
//! — like the reader, it trusts bundle framing rather than re-deriving it.

use byteorder::{BigEndian, ByteOrder};

use crate::error::OscError;
use crate::types::{Message, TimeTag};
use crate::wire;

/// How deep `unroll` descends into nested bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnrollMode {
    /// Leave bundles intact; only `inject.bundle` fires for the outermost one.
    None,
    /// Re-pack each level's direct messages into a bundle of their own,
    /// stripped of nested bundles, then recurse into each nested bundle in
    /// turn. Mutates `buf` in place to avoid a copy of the top level.
    Partial,
    /// Recurse all the way down; every message at every level reaches
    /// `inject.message` individually, alongside a `stamp` per bundle level.
    Full,
}

/// Per-level callbacks fired while unrolling a bundle. All three default to
/// doing nothing, so implementors only override what they care about.
pub trait Unroll {
    /// Fired once per bundle level, before its contents.
    fn stamp(&mut self, timetag: TimeTag) {
        let _ = timetag;
    }
    /// Fired for a single message — either a bare one, or one that survived
    /// unrolling to its innermost representation.
    fn message(&mut self, msg: Message<'_>) {
        let _ = msg;
    }
    /// Fired for a bundle that isn't being unrolled any further this call —
    /// the whole of [`UnrollMode::None`], or a re-packed level under
    /// [`UnrollMode::Partial`].
    fn bundle(&mut self, bytes: &[u8]) {
        let _ = bytes;
    }
}

/// Unrolls a validated OSC packet, firing `inject`'s callbacks according to
/// `mode`.
pub fn unroll(buf: &mut [u8], mode: UnrollMode, inject: &mut impl Unroll) -> Result<(), OscError> {
    match buf.first().copied() {
        Some(b'/') => {
            inject.message(Message::parse(buf)?);
            Ok(())
        }
        Some(b'#') => match mode {
            UnrollMode::None => {
                inject.bundle(buf);
                Ok(())
            }
            UnrollMode::Partial => unroll_partial(buf, inject),
            UnrollMode::Full => unroll_full(buf, inject),
        },
        _ => Err(OscError::BadHeader),
    }
}

fn bundle_timetag(buf: &[u8]) -> Result<TimeTag, OscError> {
    if buf.len() < 16 || &buf[0..8] != wire::BUNDLE_TAG {
        return Err(OscError::BadBundleMagic);
    }
    Ok(TimeTag(BigEndian::read_u64(&buf[8..16])))
}

fn unroll_full(buf: &[u8], inject: &mut impl Unroll) -> Result<(), OscError> {
    let timetag = bundle_timetag(buf)?;
    log::trace!("full unroll entering bundle at timetag {}", timetag.0);
    inject.stamp(timetag);

    let mut pos = 16;
    let mut nested_ranges = Vec::new();
    while pos < buf.len() {
        let n = wire::read_element_len(buf, &mut pos)?;
        let element = &buf[pos..pos + n];
        match element.first() {
            Some(b'/') => inject.message(Message::parse(element)?),
            Some(b'#') => nested_ranges.push((pos, n)),
            _ => return Err(OscError::BadElement),
        }
        pos += n;
    }

    for (start, len) in nested_ranges {
        unroll_full(&buf[start..start + len], inject)?;
    }
    Ok(())
}

/// Repacks a bundle's direct messages into `buf` in place, over the gaps left
/// by its nested bundles, and returns the number of live bytes. Nested bundle
/// payloads are copied out to `nested` *before* compaction runs, since
/// compaction reclaims exactly the space they occupy.
fn unroll_partial(buf: &mut [u8], inject: &mut impl Unroll) -> Result<(), OscError> {
    let timetag = bundle_timetag(buf)?;
    log::trace!("partial unroll entering bundle at timetag {}", timetag.0);
    inject.stamp(timetag);

    let mut pos = 16;
    let mut has_messages = false;
    let mut nested: Vec<Vec<u8>> = Vec::new();
    while pos < buf.len() {
        let n = wire::read_element_len(buf, &mut pos)?;
        let element = &buf[pos..pos + n];
        match element.first() {
            Some(b'/') => has_messages = true,
            Some(b'#') => nested.push(element.to_vec()),
            _ => return Err(OscError::BadElement),
        }
        pos += n;
    }

    if nested.is_empty() {
        if has_messages {
            inject.bundle(buf);
        } else {
            log::debug!("bundle at timetag {} has neither messages nor nested bundles, discarding", timetag.0);
        }
        return Ok(());
    }

    if has_messages {
        let mut src = 16;
        let mut dst = 16;
        while src < buf.len() {
            let n = wire::read_element_len(buf, &mut src)?;
            if buf[src..src + n].first() == Some(&b'/') {
                let total = 4 + n;
                buf.copy_within(src - 4..src - 4 + total, dst);
                dst += total;
            }
            src += n;
        }
        inject.bundle(&buf[..dst]);
    }

    for mut payload in nested {
        unroll_partial(&mut payload, inject)?;
    }
    Ok(())
}
