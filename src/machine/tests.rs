//! Machine-wide tests: construction scenarios, the minimizer, and the
//! structural invariants that must hold for any build sequence.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use super::{Acceptance, Conflict, Input, MutableMachine, MutableRegex, StateId};

/// Every non-null transition must land inside the store, and the root must
/// be present. Run after anything that rewrites the graph.
fn audit<V: Clone + PartialEq + fmt::Debug>(machine: &MutableMachine<V>) {
    assert!(machine.store.len() >= 1, "the root is never deleted");
    for (id, node) in machine.store.iter() {
        node.each_transition(|key, to| {
            assert!(
                machine.store.contains(to),
                "dangling transition {:?} --{}--> {:?}",
                id,
                key,
                to
            );
        });
    }
    for cursor in machine.cursors.iter() {
        assert!(machine.store.contains(cursor), "dangling cursor {:?}", cursor);
    }
}

fn union_of(words: &[&str]) -> MutableRegex {
    let mut rg = MutableRegex::new();
    for word in words {
        rg.match_literal(word).terminal().goback();
    }
    rg.optimize();
    rg
}

/// Renumber states in breadth-first discovery order (slot order within a
/// node), producing a representation that is insensitive to allocation
/// order. Equal canonical forms mean equal machines up to id renaming.
fn canonical_form(machine: &MutableRegex) -> Vec<(Option<Acceptance<()>>, Vec<(Input, usize)>)> {
    let mut position: HashMap<StateId, usize> = HashMap::new();
    let mut order = vec![StateId::ROOT];
    position.insert(StateId::ROOT, 0);

    let mut queue = VecDeque::from([StateId::ROOT]);
    while let Some(id) = queue.pop_front() {
        machine.store.get(id).each_transition(|_, to| {
            if !position.contains_key(&to) {
                position.insert(to, order.len());
                order.push(to);
                queue.push_back(to);
            }
        });
    }
    assert_eq!(
        order.len(),
        machine.store.len(),
        "every state is reachable after optimize"
    );

    order
        .iter()
        .map(|&id| {
            let node = machine.store.get(id);
            let mut transitions = Vec::new();
            node.each_transition(|key, to| transitions.push((key, position[&to])));
            (node.payload.clone(), transitions)
        })
        .collect()
}

#[test]
fn test_equivalence_of_reversed_insertion() {
    // These two particular orders land on identical stores, ids included.
    let mut regex1 = MutableRegex::new();
    regex1
        .match_literal("ABC").terminal().goback()
        .match_literal("DEF").terminal().goback()
        .match_literal("GHI").terminal().goback()
        .match_literal("DEFABC").terminal().goback()
        .optimize();

    let mut regex2 = MutableRegex::new();
    regex2
        .match_literal("DEFABC").terminal().goback()
        .match_literal("GHI").terminal().goback()
        .match_literal("ABC").terminal().goback()
        .match_literal("DEF").terminal().goback()
        .optimize();

    audit(&regex1);
    audit(&regex2);
    assert_eq!(
        regex1, regex2,
        "the same transitions declared in different orders are equivalent"
    );
}

#[test]
fn test_union_is_order_independent() {
    // Property: any insertion order optimizes to the same machine up to id
    // renaming.
    let words = ["ABC", "DEF", "GHI", "DEFABC"];
    let reference = canonical_form(&union_of(&words));

    let mut permutations: Vec<Vec<&str>> = Vec::new();
    permute(&words, &mut Vec::new(), &mut permutations);
    assert_eq!(permutations.len(), 24);

    for permutation in permutations {
        let machine = union_of(&permutation);
        audit(&machine);
        assert_eq!(
            canonical_form(&machine),
            reference,
            "insertion order {:?} produced a different machine",
            permutation
        );
    }
}

fn permute<'a>(rest: &[&'a str], prefix: &mut Vec<&'a str>, out: &mut Vec<Vec<&'a str>>) {
    if rest.is_empty() {
        out.push(prefix.clone());
        return;
    }
    for (i, &word) in rest.iter().enumerate() {
        let mut remaining = rest.to_vec();
        remaining.remove(i);
        prefix.push(word);
        permute(&remaining, prefix, out);
        prefix.pop();
    }
}

#[test]
fn test_overlapping_prefixes() {
    let words = [
        "", "foo", "foobar", "foobarbaz", "foobaz", "foobazbaz", "barbaz", "baz",
    ];
    let rg = union_of(&words);
    audit(&rg);
    let rg = rg.compile();

    for word in words {
        assert!(rg.is_match(word), "{:?} must match", word);
    }
    assert!(!rg.is_match("foob"));
    assert!(!rg.is_match("ba"));
    assert!(!rg.is_match("foobarb"));
}

#[test]
fn test_optional_pattern() {
    let mut foobar = MutableRegex::new();
    foobar.match_literal("foobar").terminal();

    let mut rg = MutableRegex::new();
    rg.match_literal("ABCDEF").match_optionally(&foobar).terminal();
    audit(&rg);
    let rg = rg.compile();

    assert!(rg.is_match("ABCDEF"), "the unbranched path matches");
    assert!(rg.is_match("ABCDEFfoobar"), "the optional path matches");

    assert!(!rg.is_match(""));
    assert!(!rg.is_match("ABCDEFG"));
    assert!(!rg.is_match("ABCDEFfoo"));
    assert!(!rg.is_match("ABCD"));
}

#[test]
fn test_star_pattern() {
    let mut abc = MutableRegex::new();
    abc.match_literal("abc").terminal();

    let mut rg = MutableRegex::new();
    rg.match_literal("alphabet.")
        .match_many_optionally(&abc)
        .match_literal(".done")
        .terminal();
    audit(&rg);
    let rg = rg.compile();

    assert!(rg.is_match("alphabet..done"), "zero repetitions");
    assert!(rg.is_match("alphabet.abc.done"), "one repetition");
    assert!(rg.is_match("alphabet.abcabc.done"), "two repetitions");
    assert!(!rg.is_match("alphabet.alphabet.done"));
    assert!(!rg.is_match("alphabet.ab.done"));
}

#[test]
fn test_kleene_closure_accepts_exactly_the_concatenations() {
    let mut body = MutableRegex::new();
    body.match_literal("ab").terminal().goback();
    body.match_literal("c").terminal().goback();
    body.optimize();

    let mut rg = MutableRegex::new();
    rg.match_many_optionally(&body).match_eof().terminal();
    audit(&rg);
    let rg = rg.compile();

    // Concatenations of {"ab", "c"} are accepted...
    for s in ["", "ab", "c", "abc", "cab", "abab", "ccc", "abcabc"] {
        assert!(rg.is_match_eof(s), "{:?} is a concatenation", s);
    }
    // ...anything else is not.
    for s in ["a", "b", "ba", "ac", "abx", "cb a"] {
        assert!(!rg.is_match_eof(s), "{:?} is not a concatenation", s);
    }
}

#[test]
fn test_star_collapses_to_one_loop_state() {
    // Kleene over a one-state body: after optimization the whole loop is a
    // single self-looping accept state besides the root.
    let mut a = MutableRegex::new();
    a.match_literal("a").terminal();

    let mut rg = MutableRegex::new();
    rg.match_many(&a).terminal();
    rg.optimize();
    audit(&rg);
    assert_eq!(rg.state_count(), 2);
}

#[test]
fn test_optimize_is_idempotent_on_spliced_machines() {
    let mut inner = MutableRegex::new();
    inner.match_literal("xy").terminal();

    let mut rg = MutableRegex::new();
    rg.match_literal("go")
        .match_many_optionally(&inner)
        .match_eof()
        .terminal();
    rg.optimize();
    audit(&rg);

    let once = rg.clone();
    rg.optimize();
    assert_eq!(rg, once);
}

#[test]
fn test_root_is_stable_across_optimize() {
    let mut rg = MutableRegex::new();
    rg.match_literal("word").terminal().goback();
    rg.optimize();
    audit(&rg);
    assert!(rg.store.get(StateId::ROOT).transition(super::Input::Byte(b'w')) != StateId::NONE);
    assert_eq!(rg.cursors().as_slice(), &[StateId::ROOT]);
}

#[test]
fn test_lookup_returns_longest_accepted_prefix() {
    let mut rg = MutableRegex::new();
    rg.match_literal("a").terminal().goback();
    rg.match_literal("aaa").terminal().goback();
    let rg = rg.compile();

    // "aa" is not accepted; the best prefix of "aax" is "a".
    assert_eq!(rg.lookup("aax"), Some((1, &())));
    assert_eq!(rg.lookup("aaax"), Some((3, &())));
    assert_eq!(rg.lookup("aaaa"), Some((3, &())));
    assert_eq!(rg.lookup("x"), None);
}

#[test]
fn test_number_lexer_end_to_end() {
    // The integer pattern is committed first; the float pattern is then
    // spliced over it, colliding with the committed digit states. Clones
    // minted during linking must keep the integer payloads while the new
    // fraction branch gets its own.
    #[derive(Clone, Copy, PartialEq, Debug)]
    enum Tok {
        Int,
        Float,
    }

    let digit = crate::presets::digit();
    let mut float = MutableRegex::new();
    float
        .match_pattern(&crate::presets::integer())
        .match_literal(".")
        .match_many_optionally(&digit)
        .terminal()
        .optimize();

    let mut lexer: MutableMachine<Tok> = MutableMachine::new();
    lexer.match_pattern(&crate::presets::integer()).commit(Tok::Int);
    lexer.match_pattern(&float).commit(Tok::Float);
    audit(&lexer);
    let lexer = lexer.compile();

    assert_eq!(lexer.matches("12"), Some(&Tok::Int));
    assert_eq!(lexer.matches("0"), Some(&Tok::Int));
    assert_eq!(lexer.matches("3.14"), Some(&Tok::Float));
    assert_eq!(lexer.matches("0.5"), Some(&Tok::Float));
    // The fraction part may be empty, as in C.
    assert_eq!(lexer.matches("12."), Some(&Tok::Float));
    assert_eq!(lexer.matches(".5"), None);
    assert_eq!(lexer.matches("00"), None);

    let hits: Vec<_> = lexer.find_all("x = 3.5 + 12").collect();
    let values: Vec<Tok> = hits.iter().map(|m| *m.value).collect();
    assert_eq!(values, [Tok::Float, Tok::Int]);
    assert_eq!((hits[0].begin, hits[0].end), (4, 7));
    assert_eq!((hits[1].begin, hits[1].end), (10, 12));
}

#[test]
fn test_splicing_into_committed_branches_propagates_payloads() {
    // A valued machine where a spliced pattern collides with a branch that
    // already carries a payload: the minted clones keep it.
    let mut machine: MutableMachine<u32> = MutableMachine::new();
    machine.match_literal("ab").commit_continue(7);
    machine.goback();

    let mut wide = MutableRegex::new();
    wide.match_literal("a").match_any_of("bc").terminal();
    // The clone standing in for the "ab" accept state arrives carrying 7;
    // Skip leaves it alone and only the fresh "ac" branch takes 9.
    machine.conflict(Conflict::Skip).match_pattern(&wide).commit(9);
    audit(&machine);
    let machine = machine.compile();

    assert_eq!(machine.matches("ab"), Some(&7), "existing payload survives");
    assert_eq!(machine.matches("ac"), Some(&9), "new branch gets the commit");
}

#[test]
fn test_goback_unions_independent_patterns() {
    let mut rg = MutableRegex::new();
    rg.match_literal("one").terminal().goback();
    rg.match_literal("two").terminal().goback();
    rg.match_digit().terminal();
    audit(&rg);
    let rg = rg.compile();

    assert!(rg.is_match("one"));
    assert!(rg.is_match("two"));
    assert!(rg.is_match("7"));
    assert!(!rg.is_match("on"));
}

#[test]
fn test_every_state_is_live_after_optimize() {
    let mut inner = MutableRegex::new();
    inner.match_literal("mid").terminal();

    let mut rg = MutableRegex::new();
    rg.match_literal("head")
        .match_optionally(&inner)
        .match_literal("tail")
        .terminal();
    rg.optimize();
    audit(&rg);

    // Post-optimize invariant: every state is the root, accepting, or has
    // at least one outgoing transition.
    for (id, node) in rg.store.iter() {
        let mut has_transition = false;
        node.each_transition(|_, _| has_transition = true);
        assert!(
            id == StateId::ROOT || node.payload.is_some() || has_transition,
            "{:?} is a null state after optimize",
            id
        );
    }
}
