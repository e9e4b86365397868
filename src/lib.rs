//! regex-table: imperative construction of deterministic byte-driven state
//! machines.
//!
//! This is the automaton layer a regex surface syntax would normally
//! compile into, exposed directly as a builder API. Chain primitives to
//! grow a transition graph, splice sub-patterns in, optimize, and query:
//!
//! ```
//! use regex_table::{presets, MutableMachine};
//!
//! #[derive(Clone, PartialEq, Debug)]
//! enum Token {
//!     If,
//!     Integer,
//! }
//!
//! let mut lexer: MutableMachine<Token> = MutableMachine::new();
//! lexer.match_literal("if").commit(Token::If);
//! lexer.match_pattern(&presets::integer()).commit(Token::Integer);
//! let lexer = lexer.compile();
//!
//! assert_eq!(lexer.matches("if"), Some(&Token::If));
//! assert_eq!(lexer.matches("42"), Some(&Token::Integer));
//! assert_eq!(lexer.matches("043"), None);
//! assert_eq!(
//!     lexer.find_first("x = 42").map(|m| (m.begin, m.end)),
//!     Some((4, 6))
//! );
//! ```
//!
//! Construction is single-threaded; [`MutableMachine::compile`] freezes the
//! graph into a [`Machine`], which is immutable and `Send + Sync`. For
//! shared querying with occasional rebuilds, see [`SharedMachine`].
//!
//! Machines over Unicode alphabets are built through [`Utf8Machine`], which
//! rewrites codepoints into byte chains over the same core.

mod machine;
mod utf8;

pub mod classes;
pub mod presets;

pub use machine::{
    Acceptance, Conflict, Cursors, FindAll, Input, Machine, Match, MutableMachine, MutableRegex,
    SharedMachine, StateId,
};
pub use utf8::{Utf8Machine, Utf8Regex};
