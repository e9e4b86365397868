//! Character-class sugar: fixed byte sets over `match_any_of`.

use std::fmt;

use crate::machine::MutableMachine;

/// ASCII decimal digits.
pub const DIGITS: &str = "0123456789";

/// ASCII lowercase letters.
pub const ALPHA_LOWER: &str = "abcdefghijklmnopqrstuvwxyz";

/// ASCII uppercase letters.
pub const ALPHA_UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// ASCII letters, both cases.
pub const ALPHA: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Visual whitespace: tab, line feed, vertical tab, form feed, carriage
/// return, space.
pub const WHITESPACE: &str = "\t\n\x0b\x0c\r ";

/// ASCII control characters outside the whitespace set, plus DEL.
pub const CONTROL: &str = "\x01\x02\x03\x04\x05\x06\x07\x08\
                           \x0e\x0f\x10\x11\x12\x13\x14\x15\x16\x17\
                           \x18\x19\x1a\x1b\x1c\x1d\x1e\x1f\x7f";

impl<V: Clone + PartialEq + fmt::Debug> MutableMachine<V> {
    /// Match any ASCII digit `[0-9]`.
    pub fn match_digit(&mut self) -> &mut Self {
        self.match_any_of(DIGITS)
    }

    /// Match any ASCII letter `[A-Za-z]`.
    pub fn match_alpha(&mut self) -> &mut Self {
        self.match_any_of(ALPHA)
    }

    /// Match any lowercase ASCII letter `[a-z]`.
    pub fn match_lowercase(&mut self) -> &mut Self {
        self.match_any_of(ALPHA_LOWER)
    }

    /// Match any uppercase ASCII letter `[A-Z]`.
    pub fn match_uppercase(&mut self) -> &mut Self {
        self.match_any_of(ALPHA_UPPER)
    }

    /// Match any visual whitespace character.
    pub fn match_whitespace(&mut self) -> &mut Self {
        self.match_any_of(WHITESPACE)
    }

    /// Match any non-whitespace ASCII control character.
    pub fn match_control(&mut self) -> &mut Self {
        self.match_any_of(CONTROL)
    }
}
