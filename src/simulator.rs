// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The NFA simulator contract (spec.md §4.5): the per-character loop that
//! drives the state ring, plus the four match modes built on top of it.
//!
//! Every mode is one instantiation of a single primitive, [`run_pass`]: seed
//! one or more states at a starting position, step one input position at a
//! time propagating match sources along the matching/control lists, and
//! report the best time a chosen goal state became occupied. Running it
//! *backward* (goal and seed roles swapped: a consuming op's "entry" becomes
//! its read-slot-when-walking-forward's opposite) is what lets `all`'s
//! three-phase handshake reuse the exact same stepping code for its
//! backward-then-forward sub-passes as `full`/`anywhere`/`first` use for
//! their single forward pass.

use crate::lister::{ControlKind, MatchKind, RegexpInfo};
use crate::ring::{ring_depth, StateRing, TimeSummary};

/// A located match: half-open `[begin, end)`, with `begin == end` for an
/// empty match (spec.md §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    pub begin: usize,
    pub end: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

fn control_condition_holds(kind: ControlKind, text: &[u8], pos: usize) -> bool {
    match kind {
        ControlKind::Epsilon => true,
        // Direction-independent: always the ordinary forward definition,
        // evaluated against the fixed absolute position, regardless of
        // which way the current pass is walking (spec.md §9: take an
        // explicit length rather than relying on a NUL sentinel, which is
        // why `pos == text.len()` — not a byte read — marks end-of-string).
        ControlKind::StartOfLine => pos == 0 || matches!(text.get(pos - 1), Some(b'\n') | Some(b'\r')),
        ControlKind::EndOfLine => pos == text.len() || matches!(text.get(pos), Some(b'\n') | Some(b'\r')),
    }
}

fn consuming_len(kind: &MatchKind) -> usize {
    match kind {
        MatchKind::Literal(bytes) => bytes.len(),
        MatchKind::Period | MatchKind::Bracket(_) => 1,
    }
}

/// The byte window a consuming op of length `len` tests, given the pass is
/// currently "at" `pos`: ahead of `pos` when walking forward, behind it when
/// walking backward. `None` if the window would run off either end of `text`.
fn window_for(direction: Direction, pos: usize, len: usize, text_len: usize) -> Option<(usize, usize)> {
    match direction {
        Direction::Forward => {
            let end = pos.checked_add(len)?;
            if end <= text_len { Some((pos, end)) } else { None }
        }
        Direction::Backward => {
            let start = pos.checked_sub(len)?;
            Some((start, pos))
        }
    }
}

fn consuming_matches(kind: &MatchKind, text: &[u8], window: (usize, usize)) -> bool {
    let slice = &text[window.0..window.1];
    match kind {
        MatchKind::Literal(bytes) => slice == bytes.as_slice(),
        MatchKind::Period => true,
        MatchKind::Bracket(b) => b.matches(slice[0]),
    }
}

/// Entry/exit roles swap for a backward pass: walking against an edge's
/// natural direction means its *exit* is now the read-slot and its *entry*
/// the write-slot.
fn roles(direction: Direction, entry: i64, exit: i64) -> (i64, i64) {
    match direction {
        Direction::Forward => (entry, exit),
        Direction::Backward => (exit, entry),
    }
}

fn control_fixed_point(info: &RegexpInfo, ring: &mut StateRing, summary: &mut TimeSummary, text: &[u8], pos: usize, direction: Direction) {
    let mut changed = true;
    let mut guard = 0;
    while changed && guard <= info.control_list.len() {
        changed = false;
        guard += 1;
        for op in &info.control_list {
            if !control_condition_holds(op.kind, text, pos) {
                continue;
            }
            let (read, write) = roles(direction, op.entry, op.exit);
            if let Some(src) = ring.get(0, read) {
                if ring.propagate(0, write, src) {
                    summary.set(0);
                    changed = true;
                }
            }
        }
    }
}

fn matching_pass(info: &RegexpInfo, ring: &mut StateRing, summary: &mut TimeSummary, text: &[u8], pos: usize, direction: Direction) {
    for op in &info.matching_list {
        let (read, write) = roles(direction, op.entry, op.exit);
        let src = match ring.get(0, read) {
            Some(s) => s,
            None => continue,
        };
        let len = consuming_len(&op.kind);
        let window = match window_for(direction, pos, len, text.len()) {
            Some(w) => w,
            None => continue,
        };
        if consuming_matches(&op.kind, text, window) {
            if ring.propagate(len, write, src) {
                summary.set(len);
            }
        }
    }
}

/// Runs a single directed pass of the simulator (spec.md §4.5's
/// per-character loop, generalized to either scan direction and an
/// arbitrary seed/goal pair).
///
/// - `initial_seed_state`: if set, forced into the ring at `start_pos` with
///   source `start_pos`, before the first tick (used by `full` and the `all`
///   sub-passes, which seed exactly once).
/// - `reseed_entry`: if set, injected (via the ordinary propagate rule, so
///   an older candidate already present is never displaced) at the start of
///   *every* tick with source equal to the tick's own position — "try
///   starting a new match here too" (used by `anywhere`/`first`, which must
///   consider every possible start position).
/// - `stop_at_first_goal`: returns as soon as `goal_state` is first occupied
///   (used by `anywhere`, which only needs existence).
///
/// Returns the best `(source, position)` pair ever observed at
/// `goal_state`, where "best" prefers a smaller source (leftmost) and, for
/// equal sources, the later position (longest) — the same rule whether or
/// not `reseed_entry` is set, since a single, non-reseeded lineage keeps a
/// constant source and the rule degenerates to "keep the latest".
fn run_pass(
    info: &RegexpInfo,
    text: &[u8],
    direction: Direction,
    start_pos: usize,
    initial_seed_state: Option<i64>,
    reseed_entry: Option<i64>,
    goal_state: i64,
    stop_at_first_goal: bool,
) -> Option<(usize, usize)> {
    let num_states = (info.last_state + 1) as usize;
    let depth = ring_depth(info.max_match_length);
    let mut ring = StateRing::new(num_states, depth);
    let mut summary = TimeSummary::new(depth);

    if let Some(state) = initial_seed_state {
        ring.seed(0, state, start_pos);
        summary.set(0);
    }

    let mut pos = start_pos;
    let mut best: Option<(usize, usize)> = None;

    loop {
        if let Some(entry) = reseed_entry {
            if ring.propagate(0, entry, pos) {
                summary.set(0);
            }
        }

        control_fixed_point(info, &mut ring, &mut summary, text, pos, direction);

        if let Some(src) = ring.get(0, goal_state) {
            if best.map_or(true, |(best_src, _)| src <= best_src) {
                best = Some((src, pos));
            }
            if stop_at_first_goal {
                return best;
            }
        }

        matching_pass(info, &mut ring, &mut summary, text, pos, direction);

        ring.clear_row(0);
        summary.clear(0);

        let at_boundary = match direction {
            Direction::Forward => pos == text.len(),
            Direction::Backward => pos == 0,
        };
        if at_boundary {
            break;
        }
        if reseed_entry.is_none() && summary.is_extinguished() {
            break;
        }

        ring.advance();
        summary.advance();
        pos = match direction {
            Direction::Forward => pos + 1,
            Direction::Backward => pos - 1,
        };
    }

    best
}

/// `Matcher.match_full` (spec.md §6): the whole text, start to end.
pub fn match_full(info: &RegexpInfo, text: &[u8]) -> bool {
    let best = run_pass(info, text, Direction::Forward, 0, Some(info.entry_state), None, info.exit_state, false);
    matches!(best, Some((0, end)) if end == text.len())
}

/// `Matcher.match_anywhere`.
pub fn match_anywhere(info: &RegexpInfo, text: &[u8]) -> bool {
    run_pass(info, text, Direction::Forward, 0, None, Some(info.entry_state), info.exit_state, true).is_some()
}

/// `Matcher.match_first`: leftmost-longest, scanning every possible start.
pub fn match_first(info: &RegexpInfo, text: &[u8]) -> Option<Match> {
    run_pass(info, text, Direction::Forward, 0, None, Some(info.entry_state), info.exit_state, false)
        .map(|(begin, end)| Match { begin, end })
}

/// Leftmost-longest match at or after `from`, without any fast-forward
/// acceleration — the correctness fallback `match_all` uses when the
/// fast-forward finder produced no usable anchor (spec.md §4.4: an empty
/// anchor set is never a correctness problem, only a missed optimization).
fn next_match_unaccelerated(info: &RegexpInfo, text: &[u8], from: usize) -> Option<Match> {
    if from > text.len() {
        return None;
    }
    run_pass(info, text, Direction::Forward, from, None, Some(info.entry_state), info.exit_state, false)
        .map(|(begin, end)| Match { begin, end })
}

/// Resolves one anchor occurrence into a full match via the backward/forward
/// handshake (spec.md §4.5's `All` mode, phases (b) and (c)): a backward
/// pass from the occurrence's start fixes `begin` by walking until the
/// global entry state is reached, and a forward pass from the occurrence's
/// end fixes `end` the same way in reverse. Either pass can fail to reach
/// its goal (the anchor occurrence isn't reachable from a full match, e.g. a
/// literal anchor appearing outside the context the rest of the pattern
/// requires) — the caller must then keep scanning past this occurrence.
fn resolve_anchor(info: &RegexpInfo, text: &[u8], occ: &crate::fast_forward::Occurrence) -> Option<Match> {
    let (_, begin) = run_pass(info, text, Direction::Backward, occ.start, Some(occ.entry), None, info.entry_state, false)?;
    let (_, end) = run_pass(info, text, Direction::Forward, occ.end, Some(occ.exit), None, info.exit_state, false)?;
    Some(Match { begin, end })
}

fn find_via_anchors(info: &RegexpInfo, plan: &crate::fast_forward::FastForwardPlan, text: &[u8], from: usize) -> Option<Match> {
    let mut search_from = from;
    loop {
        let occ = plan.next_candidate(text, search_from)?;
        if let Some(m) = resolve_anchor(info, text, &occ) {
            return Some(m);
        }
        search_from = if occ.end > occ.start { occ.end } else { occ.start + 1 };
    }
}

/// `Matcher.match_all`: non-overlapping, leftmost-longest matches in order.
pub fn match_all(info: &RegexpInfo, plan: &crate::fast_forward::FastForwardPlan, text: &[u8]) -> Vec<Match> {
    let mut out = Vec::new();
    let mut from = 0usize;
    let mut last_match_end: Option<usize> = None;

    loop {
        if from > text.len() {
            break;
        }
        let candidate = if plan.is_empty() {
            next_match_unaccelerated(info, text, from)
        } else {
            find_via_anchors(info, plan, text, from)
        };
        let Some(m) = candidate else { break };

        // At most one empty match per position, suppressed when it starts
        // exactly where the previous registered match ended (spec.md §9's
        // resolved open question).
        if m.begin == m.end && Some(m.begin) == last_match_end {
            if from >= text.len() {
                break;
            }
            from += 1;
            continue;
        }

        from = if m.end == m.begin { m.end + 1 } else { m.end };
        last_match_end = Some(m.end);
        out.push(m);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompileOptions;
    use crate::fast_forward::FastForwardPlan;
    use crate::indexer::index;
    use crate::lister::list;
    use crate::parser::parse;

    fn compile(pattern: &str) -> (RegexpInfo, FastForwardPlan) {
        let opts = CompileOptions::default();
        let mut root = parse(pattern, &opts).unwrap();
        let last = index(&mut root, 0);
        let plan = FastForwardPlan::select(&root, &opts);
        let info = list(&root, last, &opts).unwrap();
        (info, plan)
    }

    #[test]
    fn full_matches_exact_literal_only() {
        let (info, _) = compile("0123456789");
        assert!(match_full(&info, b"0123456789"));
        assert!(!match_full(&info, b"0123456789abcd"));
        assert!(!match_full(&info, b"012345678"));
    }

    #[test]
    fn anywhere_finds_embedded_literal() {
        let (info, _) = compile("needle");
        assert!(match_anywhere(&info, b"hay needle stack"));
        assert!(!match_anywhere(&info, b"hay stack"));
    }

    #[test]
    fn first_prefers_leftmost_then_longest() {
        let (info, _) = compile("0.*9");
        let m = match_first(&info, b"____0123456789abcd").unwrap();
        assert_eq!(m, Match { begin: 4, end: 14 });
    }

    #[test]
    fn first_on_alternation_returns_longest_branch() {
        let (info, _) = compile("(1|22)+");
        let m = match_first(&info, b"ABCD_111122221221221222222_XYZ").unwrap();
        assert_eq!(m, Match { begin: 5, end: 26 });
    }

    #[test]
    fn all_counts_non_overlapping_literal_occurrences() {
        let (info, plan) = compile("x");
        let ms = match_all(&info, &plan, b"_x____xx___xxx______");
        let begins: Vec<usize> = ms.iter().map(|m| m.begin).collect();
        assert_eq!(begins, vec![1, 6, 7, 11, 12, 13]);
    }

    #[test]
    fn all_handles_repeated_group_spans() {
        let (info, plan) = compile("(a.)+");
        let ms = match_all(&info, &plan, b"_a.__a.a.a.____a.____a.a.a.a.a.a._");
        let spans: Vec<(usize, usize)> = ms.iter().map(|m| (m.begin, m.end)).collect();
        assert_eq!(spans, vec![(1, 3), (5, 11), (15, 17), (21, 33)]);
    }

    #[test]
    fn all_anchors_to_start_and_end_of_line() {
        let (info, plan) = compile("^____$");
        let ms = match_all(&info, &plan, b"xx\n____\nxx");
        assert_eq!(ms, vec![Match { begin: 3, end: 7 }]);
    }

    #[test]
    fn all_finds_single_bracket_class_hit() {
        let (info, plan) = compile("[0-9]");
        let ms = match_all(&info, &plan, b"__________0__________");
        assert_eq!(ms, vec![Match { begin: 10, end: 11 }]);
    }

    #[test]
    fn nested_bounded_repetition_matches_only_in_range() {
        for k in 1..=10 {
            let (info, _) = compile("(a.){2,3}{2,3}");
            let s = "a.".repeat(k);
            let expect = (4..=9).contains(&k);
            assert_eq!(match_full(&info, s.as_bytes()), expect, "k={}", k);
        }
    }

    #[test]
    fn empty_match_repetition_does_not_loop_forever() {
        let (info, plan) = compile("(a*)*");
        let ms = match_all(&info, &plan, b"aaa");
        assert!(!ms.is_empty());
    }

    #[test]
    fn start_and_end_anchors_on_empty_text() {
        let (info, _) = compile("^$");
        assert!(match_full(&info, b""));
        assert!(!match_full(&info, b"x"));
    }

    #[test]
    fn full_implies_anywhere_and_first_agrees_with_anywhere() {
        let (info, _) = compile("a+b");
        for text in [&b"ab"[..], b"xxab", b"aaab", b"xx", b""] {
            if match_full(&info, text) {
                assert!(match_anywhere(&info, text));
            }
            assert_eq!(match_first(&info, text).is_some(), match_anywhere(&info, text));
        }
    }
}
