// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Public-API integration tests for the eight concrete scenarios and the
//! listed boundary cases. The equivalent unit tests in `simulator.rs` drive
//! `RegexpInfo`/`FastForwardPlan` directly; these drive the same inputs
//! through `compile()` and `Matcher`, so a regression in the driver itself
//! (state budget wiring, mode plumbing, codegen/code-memory seam) shows up
//! here even if the simulator internals are untouched.

use rejit_core::{compile, Match, MatchMode};

fn m(pattern: &str) -> rejit_core::Matcher {
    compile(pattern, MatchMode::All).unwrap()
}

#[test]
fn scenario_1_full_exact_literal() {
    let re = m("0123456789");
    assert!(re.match_full(b"0123456789"));
    assert!(!re.match_full(b"0123456789abcd"));
}

#[test]
fn scenario_2_all_counts_literal_occurrences() {
    let re = m("x");
    let matches = re.match_all(b"_x____xx___xxx______");
    let starts: Vec<usize> = matches.iter().map(|mm| mm.begin).collect();
    assert_eq!(starts, vec![1, 6, 7, 11, 12, 13]);
}

#[test]
fn scenario_3_all_on_repeated_group() {
    let re = m("(a.)+");
    let matches = re.match_all(b"_a.__a.a.a.____a.____a.a.a.a.a.a._");
    let spans: Vec<(usize, usize)> = matches.iter().map(|mm| (mm.begin, mm.end)).collect();
    assert_eq!(spans, vec![(1, 3), (5, 11), (15, 17), (21, 33)]);
}

#[test]
fn scenario_4_first_prefers_leftmost_then_longest() {
    let re = m("0.*9");
    let found = re.match_first(b"____0123456789abcd");
    assert_eq!(found, Some(Match { begin: 4, end: 14 }));
}

#[test]
fn scenario_5_all_anchors_start_and_end_of_line() {
    let re = m("^____$");
    let matches = re.match_all(b"xx\n____\nxx");
    assert_eq!(matches, vec![Match { begin: 3, end: 7 }]);
}

#[test]
fn scenario_6_first_on_alternation_of_groups() {
    let re = m("(1|22)+");
    let found = re.match_first(b"ABCD_111122221221221222222_XYZ");
    assert_eq!(found, Some(Match { begin: 5, end: 26 }));
}

#[test]
fn scenario_7_all_finds_single_bracket_hit() {
    let re = m("[0-9]");
    let matches = re.match_all(b"__________0__________");
    assert_eq!(matches, vec![Match { begin: 10, end: 11 }]);
}

#[test]
fn scenario_8_nested_bounded_repetition() {
    let re = m("(a.){2,3}{2,3}");
    for k in 0..=10 {
        let text = "a.".repeat(k);
        let expected = (4..=9).contains(&k);
        assert_eq!(re.match_full(text.as_bytes()), expected, "k = {}", k);
    }
}

#[test]
fn boundary_empty_pattern_on_empty_text() {
    let re = m("");
    assert!(re.match_full(b""));
    assert_eq!(re.match_all(b""), vec![Match { begin: 0, end: 0 }]);
}

#[test]
fn boundary_start_end_anchor_combinations() {
    let re = m("^$");
    assert!(re.match_full(b""));
    assert!(!re.match_full(b"\n"));
    assert!(re.match_anywhere(b"\n"));
    assert!(!re.match_anywhere(b"x"));
    assert!(!re.match_anywhere(b"x\ny"));
}

#[test]
fn boundary_repetition_bounds() {
    assert!(m("a{0,0}").match_full(b""));
    assert!(!m("a{0,0}").match_full(b"a"));
    assert!(m("a{3}").match_full(b"aaa"));
    assert!(!m("a{3}").match_full(b"aa"));
    assert!(m("a{2,2}").match_full(b"aa"));
    assert!(m("a{0,}").match_full(b""));
    assert!(m("a{0,}").match_full(b"aaaaaa"));
    assert!(m("a{2,}").match_full(b"aaaaaa"));
    assert!(!m("a{2,}").match_full(b"a"));
}

#[test]
fn boundary_alternation_with_one_literal_contained_in_another() {
    let re = compile("cat|catalog", MatchMode::First).unwrap();
    let found = re.match_first(b"catalog").unwrap();
    assert_eq!(found, Match { begin: 0, end: 7 });
}

#[test]
fn boundary_empty_match_repetition_terminates() {
    let re = m("(a*)*");
    assert!(re.match_full(b""));
    assert!(re.match_full(b"aaa"));
    let matches = re.match_all(b"aa_aa");
    assert!(!matches.is_empty());
}

#[test]
fn boundary_pattern_longer_than_max_node_len_still_compiles() {
    let long_literal = "a".repeat(rejit_core::config::MAX_NODE_LEN * 3);
    let re = compile(&long_literal, MatchMode::Full).unwrap();
    assert!(re.match_full(long_literal.as_bytes()));
}
