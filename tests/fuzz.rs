//! Property-style coverage for untrusted-input bounds safety, plus a couple
//! of assertions that lean on the dev-dependency tooling the rest of the
//! suite doesn't happen to exercise (`pretty_assertions`, `assert_matches`).
//! No byte string of any length should make the codec panic — every
//! in-bounds failure is already a `Result::Err` or `false`.

use anyhow::Context;
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rand::Rng;

use oscpkt::{check_packet, dispatch, unroll, Method, OscArg, UnrollMode, Writer};

/// No byte string of any length should make `check_packet`, `dispatch` or
/// `unroll` read outside the slice they were given — the only way that
/// would surface here is a panic (out-of-bounds slicing), since every
/// in-bounds failure is already a `Result::Err`/`false`.
#[test_log::test]
fn bounds_safety_holds_for_random_and_truncated_buffers() -> anyhow::Result<()> {
    let mut rng = rand::rng();

    for _ in 0..2000 {
        let len = rng.random_range(0..64);
        let mut buf: Vec<u8> = (0..len).map(|_| rng.random()).collect();

        let valid = check_packet(&buf);

        let mut methods = [Method::new(None, None, |_t, _p, _f, _a| true)];
        let _ = dispatch(&buf, &mut methods, None, None);

        let mut collector = NullCollector;
        let _ = unroll(&mut buf, UnrollMode::Full, &mut collector);
        let _ = unroll(&mut buf, UnrollMode::Partial, &mut collector);

        if valid {
            // A buffer that passed validation must also decode losslessly
            // under `None` mode without reporting an error.
            let mut none_copy = buf.clone();
            unroll(&mut none_copy, UnrollMode::None, &mut collector)
                .context("a validated packet failed to unroll under UnrollMode::None")?;
        }
    }

    Ok(())
}

/// Also feed the codec a handful of bundle-shaped buffers with random
/// interior bytes, since those exercise the recursive element-size walk
/// rather than just the flat message path.
#[test_log::test]
fn bounds_safety_holds_for_random_bundle_shaped_buffers() {
    let mut rng = rand::rng();

    for _ in 0..500 {
        let len = rng.random_range(16..96);
        let mut buf: Vec<u8> = (0..len).map(|_| rng.random()).collect();
        buf[0..8].copy_from_slice(b"#bundle\0");

        let _ = check_packet(&buf);
        let mut collector = NullCollector;
        let _ = unroll(&mut buf, UnrollMode::Partial, &mut collector);
    }
}

struct NullCollector;
impl oscpkt::Unroll for NullCollector {}

#[test]
fn decoded_arguments_match_the_values_that_were_written() {
    let mut buf = [0u8; 32];
    let mut w = Writer::new(&mut buf);
    w.write_message("/mixer/gain", &[OscArg::Float(0.75), OscArg::Int(-3)]);
    let out = w.finish().unwrap();
    assert!(check_packet(out));

    let msg = oscpkt::Message::parse(out).unwrap();
    let mut args = msg.args();
    assert_matches!(args.next(), Some(Ok(OscArg::Float(g))) if g == 0.75);
    assert_matches!(args.next(), Some(Ok(OscArg::Int(-3))));
    assert_matches!(args.next(), None);

    // Re-decode the header fields explicitly too, so the comparison isn't
    // solely mediated through `Message::args`.
    assert_eq!(msg.path, "/mixer/gain");
    assert_eq!(msg.type_tags, "fi");
}
