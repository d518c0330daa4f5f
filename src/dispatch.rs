//! Method dispatch: routing a packet's messages to callbacks registered by
//! address path and type-tag format.
//!
//! Methods are tried in declaration order; the first whose `path` and `fmt`
//! both match (or are left as a wildcard) gets the message. A callback that
//! returns `true` has *consumed* the message and dispatch moves to the next
//! message in the packet; one that returns `false` lets later methods in the
//! table see the same message.

use byteorder::{BigEndian, ByteOrder};

use crate::error::OscError;
use crate::reader::Cursor;
use crate::types::{Message, TimeTag};
use crate::wire;

/// A single entry in a dispatch table.
///
/// `path` and `fmt` are exact-match filters; `None` in either matches
/// anything. The callback receives the message's timetag (immediate, for a bare
/// message outside any bundle), its path and type-tag string, and a cursor
/// positioned at the start of its arguments.
pub struct Method<'a> {
    path: Option<&'a str>,
    fmt: Option<&'a str>,
    callback: Box<dyn FnMut(TimeTag, &str, &str, Cursor<'_>) -> bool + 'a>,
}

impl<'a> std::fmt::Debug for Method<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Method")
            .field("path", &self.path)
            .field("fmt", &self.fmt)
            .field("callback", &"<closure>")
            .finish()
    }
}

impl<'a> Method<'a> {
    /// Registers a method. Pass `None` for `path` or `fmt` to match any
    /// value in that slot.
    pub fn new(
        path: Option<&'a str>,
        fmt: Option<&'a str>,
        callback: impl FnMut(TimeTag, &str, &str, Cursor<'_>) -> bool + 'a,
    ) -> Self {
        Method {
            path,
            fmt,
            callback: Box::new(callback),
        }
    }

    fn matches(&self, path: &str, fmt: &str) -> bool {
        self.path.map_or(true, |p| p == path) && self.fmt.map_or(true, |f| f == fmt)
    }
}

/// Dispatches a validated OSC packet against `methods`, optionally notified
/// of bundle boundaries via `bundle_in`/`bundle_out`.
pub fn dispatch(
    buf: &[u8],
    methods: &mut [Method<'_>],
    mut bundle_in: Option<&mut dyn FnMut(TimeTag)>,
    mut bundle_out: Option<&mut dyn FnMut(TimeTag)>,
) -> Result<(), OscError> {
    match buf.first().copied() {
        Some(b'/') => dispatch_message(TimeTag::IMMEDIATE, buf, methods),
        Some(b'#') => dispatch_bundle(buf, methods, &mut bundle_in, &mut bundle_out),
        _ => Err(OscError::BadHeader),
    }
}

fn dispatch_message(
    timetag: TimeTag,
    buf: &[u8],
    methods: &mut [Method<'_>],
) -> Result<(), OscError> {
    let msg = Message::parse(buf)?;
    let mut matched = false;
    for method in methods.iter_mut() {
        if method.matches(msg.path, msg.type_tags) {
            matched = true;
            let consumed = (method.callback)(timetag, msg.path, msg.type_tags, msg.arg_cursor());
            log::trace!(
                "{} ,{} matched a method (consumed={consumed})",
                msg.path,
                msg.type_tags
            );
            if consumed {
                break;
            }
        }
    }
    if !matched {
        log::trace!("{} ,{} matched no registered method", msg.path, msg.type_tags);
    }
    Ok(())
}

fn dispatch_bundle(
    buf: &[u8],
    methods: &mut [Method<'_>],
    bundle_in: &mut Option<&mut dyn FnMut(TimeTag)>,
    bundle_out: &mut Option<&mut dyn FnMut(TimeTag)>,
) -> Result<(), OscError> {
    if buf.len() < 16 || &buf[0..8] != wire::BUNDLE_TAG {
        return Err(OscError::BadBundleMagic);
    }
    let timetag = TimeTag(BigEndian::read_u64(&buf[8..16]));
    log::debug!("entering bundle at timetag {}", timetag.0);
    if let Some(cb) = bundle_in.as_deref_mut() {
        cb(timetag);
    }

    let mut pos = 16;
    while pos < buf.len() {
        let n = wire::read_element_len(buf, &mut pos)?;
        let element = &buf[pos..pos + n];
        match element.first() {
            Some(b'/') => dispatch_message(timetag, element, methods)?,
            Some(b'#') => dispatch_bundle(element, methods, bundle_in, bundle_out)?,
            _ => return Err(OscError::BadElement),
        }
        pos += n;
    }

    if let Some(cb) = bundle_out.as_deref_mut() {
        cb(timetag);
    }
    log::debug!("left bundle at timetag {}", timetag.0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OscArg;
    use crate::writer::Writer;
    use std::cell::RefCell;

    #[test]
    fn bare_message_dispatches_with_the_immediate_timetag() {
        let mut buf = [0u8; 16];
        let mut w = Writer::new(&mut buf);
        w.write_message("/ping", &[]);
        let len = w.finish().unwrap().len();

        let seen = RefCell::new(None);
        let mut methods = [Method::new(Some("/ping"), None, |t, path, _fmt, _args| {
            *seen.borrow_mut() = Some((t, path.to_string()));
            true
        })];
        dispatch(&buf[..len], &mut methods, None, None).unwrap();
        assert_eq!(seen.borrow().as_ref().unwrap().0, TimeTag::IMMEDIATE);
        assert_eq!(seen.borrow().as_ref().unwrap().1, "/ping");
    }

    #[test]
    fn first_matching_method_wins_in_declaration_order() {
        let mut buf = [0u8; 16];
        let mut w = Writer::new(&mut buf);
        w.write_message("/a", &[]);
        let len = w.finish().unwrap().len();

        let calls = RefCell::new(Vec::new());
        let mut methods = [
            Method::new(None, None, |_t, _p, _f, _a| {
                calls.borrow_mut().push(1);
                true
            }),
            Method::new(None, None, |_t, _p, _f, _a| {
                calls.borrow_mut().push(2);
                true
            }),
        ];
        dispatch(&buf[..len], &mut methods, None, None).unwrap();
        assert_eq!(*calls.borrow(), vec![1]);
    }

    #[test]
    fn unconsumed_message_falls_through_to_the_next_method() {
        let mut buf = [0u8; 16];
        let mut w = Writer::new(&mut buf);
        w.write_message("/a", &[]);
        let len = w.finish().unwrap().len();

        let calls = RefCell::new(Vec::new());
        let mut methods = [
            Method::new(None, None, |_t, _p, _f, _a| {
                calls.borrow_mut().push(1);
                false
            }),
            Method::new(None, None, |_t, _p, _f, _a| {
                calls.borrow_mut().push(2);
                true
            }),
        ];
        dispatch(&buf[..len], &mut methods, None, None).unwrap();
        assert_eq!(*calls.borrow(), vec![1, 2]);
    }

    #[test]
    fn bundle_messages_carry_their_bundles_timetag_and_fire_bundle_hooks() {
        let mut buf = [0u8; 64];
        let mut w = Writer::new(&mut buf);
        let bndl = w.start_bundle(TimeTag(99)).unwrap();
        w.write_bundle_item("/x", &[OscArg::Int(1)]);
        w.end_bundle(bndl);
        let len = w.finish().unwrap().len();

        let seen_timetag = RefCell::new(None);
        let mut methods = [Method::new(Some("/x"), None, |t, _p, _f, _a| {
            *seen_timetag.borrow_mut() = Some(t);
            true
        })];
        let ins = RefCell::new(Vec::new());
        let outs = RefCell::new(Vec::new());
        let mut bundle_in = |t: TimeTag| ins.borrow_mut().push(t);
        let mut bundle_out = |t: TimeTag| outs.borrow_mut().push(t);
        dispatch(
            &buf[..len],
            &mut methods,
            Some(&mut bundle_in),
            Some(&mut bundle_out),
        )
        .unwrap();
        assert_eq!(*seen_timetag.borrow(), Some(TimeTag(99)));
        assert_eq!(*ins.borrow(), vec![TimeTag(99)]);
        assert_eq!(*outs.borrow(), vec![TimeTag(99)]);
    }
}
