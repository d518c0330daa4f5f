//! Failure modes for encoding, decoding and validating OSC packets.

use thiserror::Error;

/// A failure encountered while reading, writing or validating an OSC packet.
///
/// Every decode/encode step returns `Result<_, OscError>`, so a single `?`
/// chain poisons the whole operation the moment one step fails.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscError {
    /// The first byte of a packet was neither `/` nor `#`.
    #[error("packet does not start with '/' or '#'")]
    BadHeader,
    /// A bundle didn't start with the `#bundle\0` magic.
    #[error("bundle is missing the '#bundle\\0' magic")]
    BadBundleMagic,
    /// An address path didn't start with `/`, or contained a disallowed byte.
    #[error("address path is malformed")]
    BadPath,
    /// A type-tag string didn't start with `,`, or contained a disallowed byte.
    #[error("type-tag string is malformed")]
    BadTypeTag,
    /// A type-tag character isn't a recognized atomic type.
    #[error("unrecognized type-tag character {0:?}")]
    UnknownTag(char),
    /// A bundle element's first payload byte was neither `/` nor `#`.
    #[error("bundle element is neither a message nor a nested bundle")]
    BadElement,
    /// A string, blob or element length would advance past the buffer's end.
    #[error("a length-prefixed field extends past the end of the buffer")]
    Truncated,
    /// A well-formed read didn't end exactly at the declared packet length.
    #[error("packet has trailing bytes after its last argument")]
    TrailingBytes,
    /// A string wasn't terminated by a NUL within the buffer.
    #[error("string is not NUL-terminated")]
    UnterminatedString,
    /// A string or symbol's bytes weren't valid UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
    /// A blob or element declared a negative length.
    #[error("a length-prefixed field declared a negative length")]
    NegativeLength,
    /// A builder write would exceed the output buffer's bound.
    #[error("output buffer is too small for this write")]
    BufferFull,
}
