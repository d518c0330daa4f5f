//! A zero-copy codec, validator, unroller and dispatcher for Open Sound
//! Control (OSC) packets.
//!
//! OSC is a wire format for real-time control messages, widely used between
//! audio and lighting software: an address path (`/synth/1/freq`), a
//! type-tag string describing its arguments, and the arguments themselves,
//! optionally grouped into timestamped bundles that can nest.
//!
//! - [`reader`] and [`writer`] decode and encode single messages.
//! - [`validate`] checks untrusted bytes are structurally well-formed before
//!   anything else in this crate trusts them.
//! - [`unroll`] flattens a bundle tree to a sequence of callbacks, at one of
//!   three fidelities.
//! - [`dispatch`] routes a packet's messages to registered method callbacks.
//!
//! Decoded strings, blobs and MIDI packets all borrow from the buffer they
//! were read from — nothing in the read path allocates.

#![warn(
    anonymous_parameters,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_qualifications,
    variant_size_differences
)]

pub mod dispatch;
pub mod error;
pub mod reader;
pub mod types;
pub mod unroll;
pub mod validate;
pub mod writer;

mod wire;

pub use dispatch::{dispatch, Method};
pub use error::OscError;
pub use reader::{ArgIter, Cursor};
pub use types::{MidiMessage, Message, OscArg, TimeTag};
pub use unroll::{unroll, Unroll, UnrollMode};
pub use validate::{check_bundle, check_message, check_packet};
pub use writer::{BundleMark, ItemMark, Writer};

#[cfg(feature = "osc-1-1")]
pub use types::Rgba;
