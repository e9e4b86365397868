//! UTF-8 adapter over the byte-level core.
//!
//! A machine whose logical alphabet is Unicode scalar values stores each
//! codepoint as its 1–4 UTF-8 bytes, folded through the core's key mapping
//! before they become transition keys: ASCII and continuation bytes are
//! their own keys, lead bytes are masked down into the continuation range,
//! and everything lands in the 192-slot keyspace. Query walks apply the
//! same fold, so the frozen [`Machine`] type is shared with byte-level
//! machines and the core never learns about Unicode.

use std::fmt;

use crate::machine::{byte_key, Conflict, Cursors, Input, Machine, MutableMachine};

/// Builder for machines over Unicode scalar values.
pub struct Utf8Machine<V> {
    inner: MutableMachine<V>,
}

/// A value-less UTF-8 machine, usable as a pattern for the combinators.
pub type Utf8Regex = Utf8Machine<()>;

/// The folded byte-key chain for one codepoint.
fn encoded(ch: char) -> impl Iterator<Item = u8> {
    let mut buf = [0u8; 4];
    let len = ch.encode_utf8(&mut buf).len();
    buf.into_iter().take(len).map(byte_key)
}

impl<V: Clone + PartialEq + fmt::Debug> Utf8Machine<V> {
    pub fn new() -> Self {
        Utf8Machine {
            inner: MutableMachine::new(),
        }
    }

    /// Select the conflict policy for subsequent writes.
    pub fn conflict(&mut self, policy: Conflict) -> &mut Self {
        self.inner.conflict(policy);
        self
    }

    /// Consume a literal sequence of codepoints.
    pub fn match_literal(&mut self, seq: &str) -> &mut Self {
        for ch in seq.chars() {
            for byte in encoded(ch) {
                self.inner.cursor_transition(Input::Byte(byte));
            }
        }
        self
    }

    /// Consume exactly one of the given codepoints.
    pub fn match_any_of(&mut self, options: &str) -> &mut Self {
        if options.is_empty() {
            panic!("match_any_of requires at least one codepoint");
        }
        let snapshot = self.inner.cursors();
        let mut union = Cursors::empty();
        for ch in options.chars() {
            self.inner.set_cursors(snapshot.clone());
            for byte in encoded(ch) {
                self.inner.cursor_transition(Input::Byte(byte));
            }
            union.extend(self.inner.cursors().iter());
        }
        self.inner.set_cursors(union);
        self
    }

    /// Transition on the end-of-input sentinel.
    pub fn match_eof(&mut self) -> &mut Self {
        self.inner.match_eof();
        self
    }

    /// Wildcard transition out of the current cursors.
    pub fn match_default(&mut self) -> &mut Self {
        self.inner.match_default();
        self
    }

    /// Splice `pattern` in at the current cursors.
    pub fn match_pattern(&mut self, pattern: &Utf8Regex) -> &mut Self {
        self.inner.match_pattern(&pattern.inner);
        self
    }

    /// Optionally splice `pattern` in.
    pub fn match_optionally(&mut self, pattern: &Utf8Regex) -> &mut Self {
        self.inner.match_optionally(&pattern.inner);
        self
    }

    /// Splice `pattern` in one-or-more times.
    pub fn match_many(&mut self, pattern: &Utf8Regex) -> &mut Self {
        self.inner.match_many(&pattern.inner);
        self
    }

    /// Splice `pattern` in zero-or-more times.
    pub fn match_many_optionally(&mut self, pattern: &Utf8Regex) -> &mut Self {
        self.inner.match_many_optionally(&pattern.inner);
        self
    }

    /// Attach `value` at the cursors, then reset them to the root.
    pub fn commit(&mut self, value: V) -> &mut Self {
        self.inner.commit(value);
        self
    }

    /// Attach `value` at the cursors and keep them.
    pub fn commit_continue(&mut self, value: V) -> &mut Self {
        self.inner.commit_continue(value);
        self
    }

    /// Reset the cursors to the root.
    pub fn goback(&mut self) -> &mut Self {
        self.inner.goback();
        self
    }

    /// Optimize and freeze. Queries mask input bytes the same way the
    /// builder masked stored keys, so plain `&str` queries line up.
    pub fn compile(self) -> Machine<V> {
        self.inner.compile()
    }
}

impl Utf8Regex {
    /// Mark every current cursor accepting.
    pub fn terminal(&mut self) -> &mut Self {
        self.inner.terminal();
        self
    }

    /// Mark every current cursor accepting with a lookahead give-back,
    /// counted in bytes of input.
    pub fn terminal_back(&mut self, back_by: usize) -> &mut Self {
        self.inner.terminal_back(back_by);
        self
    }
}

impl<V: Clone + PartialEq + fmt::Debug> Default for Utf8Machine<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for Utf8Machine<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}
