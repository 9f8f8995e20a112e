//! Driver-Facing Command Abstraction
//!
//! The hook never talks to a concrete Redis client type. Drivers expose
//! their command objects through the [`Command`] trait and the hook reads
//! them back as a name, an argument sequence, and an optional terminal
//! error.

use std::borrow::Cow;
use std::error::Error;

use bytes::BytesMut;

/// A single command argument in textual-renderable form.
///
/// Covers the value shapes Redis clients put on the wire. Borrowed
/// variants reference the command's own storage; nothing is copied until
/// the argument is rendered into a trace tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg<'a> {
    /// A nil/absent argument, rendered as `<nil>`.
    Nil,
    Str(&'a str),
    /// Raw bytes, rendered verbatim (display is lossy-UTF-8 at the end).
    Bytes(&'a [u8]),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
}

/// An executed (or executing) Redis command as seen by the hook.
///
/// Read-only: the hook inspects commands, it never mutates them.
pub trait Command {
    /// Canonical command keyword, used for span naming and for grouping
    /// commands inside a pipeline span name.
    fn full_name(&self) -> Cow<'_, str>;

    /// Arguments in wire order, command keyword included.
    fn args(&self) -> Box<dyn Iterator<Item = Arg<'_>> + '_>;

    /// Terminal error already recorded on the command, if execution has
    /// failed by the time the hook observes it.
    fn err(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

/// Append the textual rendering of one argument to `buf`.
pub fn append_arg(buf: &mut BytesMut, arg: &Arg<'_>) {
    match arg {
        Arg::Nil => buf.extend_from_slice(b"<nil>"),
        Arg::Str(s) => buf.extend_from_slice(s.as_bytes()),
        Arg::Bytes(v) => buf.extend_from_slice(v),
        Arg::Int(v) => buf.extend_from_slice(v.to_string().as_bytes()),
        Arg::Uint(v) => buf.extend_from_slice(v.to_string().as_bytes()),
        Arg::Float(v) => buf.extend_from_slice(v.to_string().as_bytes()),
        Arg::Bool(true) => buf.extend_from_slice(b"true"),
        Arg::Bool(false) => buf.extend_from_slice(b"false"),
    }
}
