//! Ready-made patterns for common lexical shapes.
//!
//! Each constructor returns an optimized [`MutableRegex`], usable directly
//! or as a sub-pattern for the splice combinators.

use crate::machine::MutableRegex;

/// A single decimal digit.
pub fn digit() -> MutableRegex {
    let mut rg = MutableRegex::new();
    rg.match_digit().terminal().optimize();
    rg
}

/// A C-like integer literal. Leading zeros are illegal: either a nonzero
/// digit followed by any digits, or a lone `0`.
pub fn integer() -> MutableRegex {
    let digit = digit();
    let mut rg = MutableRegex::new();
    rg.match_any_of("123456789")
        .match_many_optionally(&digit)
        .terminal()
        .goback()
        .match_any_of("0")
        .terminal()
        .optimize();
    rg
}

/// An integer literal where leading zeros are allowed.
pub fn zero_prefixable_integer() -> MutableRegex {
    let digit = digit();
    let mut rg = MutableRegex::new();
    rg.match_many(&digit).terminal().optimize();
    rg
}

/// A plain identifier: a letter or underscore, then letters, digits and
/// underscores.
pub fn simple_identifier() -> MutableRegex {
    let mut first_char = MutableRegex::new();
    first_char
        .match_alpha()
        .terminal()
        .goback()
        .match_any_of("_")
        .terminal()
        .optimize();

    let mut other_chars = MutableRegex::new();
    other_chars
        .match_pattern(&first_char)
        .terminal()
        .goback()
        .match_digit()
        .terminal()
        .optimize();

    let mut rg = MutableRegex::new();
    rg.match_pattern(&first_char)
        .match_many_optionally(&other_chars)
        .terminal()
        .optimize();
    rg
}

/// A `//` line comment: any characters up to a newline or the end of input.
///
/// The newline exit gives the `\n` back (`back_by = 1`), so prefix lookups
/// end just before it; the end-of-input exit is reachable through the `Eof`
/// sentinel queries.
pub fn c_like_comment() -> MutableRegex {
    let mut body_char = MutableRegex::new();
    body_char.match_default().terminal().optimize();

    let mut rg = MutableRegex::new();
    rg.match_literal("//").match_many_optionally(&body_char);
    let at_body = rg.cursors();
    rg.match_any_of("\n").terminal_back(1);
    rg.set_cursors(at_body);
    rg.match_eof().terminal().optimize();
    rg
}
