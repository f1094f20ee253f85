// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Fast-forward anchor selection (spec.md §4.4): picks a set of sub-patterns
//! that any match must contain, so the scanner can skip positions that could
//! never start one.
//!
//! Selection runs on the *original*, pre-lowering tree (the one the indexer
//! assigned states to before the lister flattened it), because that is the
//! only tree whose `Repetition` nodes still carry their `min`/`max` bounds.
//! A `Repetition` node's own `entry_state`/`exit_state` is real (assigned by
//! the indexer), but its child's is not — indexing a `Repetition` only
//! allocates the repetition's own pair and leaves the child untouched; real
//! indexing of repeated content happens only inside the lister's lowering.
//! So a `Repetition` only contributes an anchor when it's `min >= 1` *and*
//! lowers to exactly one copy of a leaf child (`a+`, `[0-9]+`, `X{1}`,
//! `X{1,1}`) — the one case where the lister's lowering reuses the
//! repetition's own entry/exit directly as that copy's, rather than
//! allocating fresh internal states the matching list will actually use.
//! Bounded or multi-copy repetitions (`X{2,4}`, `(ab)+`) are conservatively
//! skipped rather than mis-anchored; see DESIGN.md.

pub mod scan;
pub mod suffix_tree;

use crate::char_class::CharClass;
use crate::config::CompileOptions;
use crate::node::RegexpNode;

#[derive(Clone, Debug)]
pub enum AnchorKind {
    Literal(Vec<u8>),
    Bracket(CharClass, bool),
    StartOfLine,
    EndOfLine,
}

/// A candidate required sub-pattern, tagged with the states it occupies in
/// the (post-lowering) matching/control lists so the simulator can seed a
/// directed pass from it.
#[derive(Clone, Debug)]
pub struct Anchor {
    pub entry: i64,
    pub exit: i64,
    pub kind: AnchorKind,
}

impl Anchor {
    /// Concrete scoring table (SPEC_FULL.md §4.4): higher is more selective.
    pub fn ff_score(&self) -> i32 {
        match &self.kind {
            AnchorKind::Literal(bytes) => bytes.len() as i32 * 4,
            AnchorKind::Bracket(class, negated) => {
                if *negated {
                    -8
                } else {
                    -(class.ranges().len() as i32).max(1)
                }
            }
            AnchorKind::StartOfLine | AnchorKind::EndOfLine => 1,
        }
    }
}

fn period_score() -> i32 {
    -16
}

struct Candidate {
    anchors: Vec<Anchor>,
    score: i32,
}

impl Candidate {
    fn single(a: Anchor) -> Candidate {
        let score = a.ff_score();
        Candidate { anchors: vec![a], score }
    }
}

fn select(node: &RegexpNode) -> Option<Candidate> {
    match node {
        RegexpNode::MultipleChar(n) => {
            Some(Candidate::single(Anchor { entry: n.entry_state, exit: n.exit_state, kind: AnchorKind::Literal(n.bytes.clone()) }))
        }
        RegexpNode::Period(n) => {
            // Consuming, so it "succeeds" per the table, but its score is
            // deliberately the worst possible: it matches almost anything.
            Some(Candidate {
                anchors: vec![Anchor { entry: n.entry_state, exit: n.exit_state, kind: AnchorKind::Bracket(CharClass::new(), true) }],
                score: period_score(),
            })
        }
        RegexpNode::Bracket(b) => Some(Candidate::single(Anchor {
            entry: b.entry_state,
            exit: b.exit_state,
            kind: AnchorKind::Bracket(b.class.clone(), b.negated),
        })),
        RegexpNode::StartOfLine(n) => Some(Candidate::single(Anchor { entry: n.entry_state, exit: n.exit_state, kind: AnchorKind::StartOfLine })),
        RegexpNode::EndOfLine(n) => Some(Candidate::single(Anchor { entry: n.entry_state, exit: n.exit_state, kind: AnchorKind::EndOfLine })),
        RegexpNode::Epsilon(_) => None,
        RegexpNode::Concatenation(c) => {
            let mut best: Option<Candidate> = None;
            for child in &c.children {
                if let Some(candidate) = select(child) {
                    let replace = match &best {
                        None => true,
                        Some(b) => candidate.score > b.score,
                    };
                    if replace {
                        best = Some(candidate);
                    }
                }
            }
            best
        }
        RegexpNode::Alternation(a) => {
            let mut anchors = Vec::new();
            let mut score = 0i32;
            for child in &a.children {
                let c = select(child)?;
                score += c.score;
                anchors.extend(c.anchors);
            }
            Some(Candidate { anchors, score })
        }
        RegexpNode::Repetition(r) => {
            if r.min == 0 {
                return None;
            }
            let k = if r.max == crate::node::INFINITE { r.min.max(1) } else if r.min == r.max { r.min } else { r.max };
            if k != 1 {
                return None;
            }
            if !(r.child.is_consuming() || r.child.is_control()) {
                return None;
            }
            // The lowered single copy reuses the repetition's own entry/exit
            // directly (see lister.rs), so the child's payload paired with
            // the repetition's states is a valid anchor.
            let inner = select(&r.child)?;
            let anchors = inner
                .anchors
                .into_iter()
                .map(|a| Anchor { entry: r.entry_state, exit: r.exit_state, kind: a.kind })
                .collect();
            Some(Candidate { anchors, score: inner.score })
        }
    }
}

/// The finished selection: anchors to scan for, ready to drive
/// [`FastForwardPlan::next_candidate`].
#[derive(Debug)]
pub struct FastForwardPlan {
    anchors: Vec<Anchor>,
    /// Built once, at compile time, when every anchor is a literal and there
    /// are at least two of them — the "multi-anchor alternation of literals"
    /// shape (spec.md §4.5): one Aho–Corasick automaton finds the earliest
    /// occurrence of any of them in a single left-to-right scan, rather than
    /// scanning once per literal.
    literal_ac: Option<aho_corasick::AhoCorasick>,
}

/// A located anchor occurrence: the simulator seeds a backward pass from
/// `(entry, start)` and a forward pass from `(exit, end)` to discover the
/// full match's boundaries, if any.
#[derive(Clone, Copy, Debug)]
pub struct Occurrence {
    pub start: usize,
    pub end: usize,
    pub entry: i64,
    pub exit: i64,
}

impl FastForwardPlan {
    /// Selects anchors for `root` (the indexed, pre-lowering tree). An empty
    /// plan means "no usable anchor" — every position is a candidate, which
    /// is always a correct (if unaccelerated) fallback.
    pub fn select(root: &RegexpNode, opts: &CompileOptions) -> FastForwardPlan {
        let candidate = select(root);
        let anchors = candidate.map(|c| c.anchors).unwrap_or_default();

        // Alternation-substring reduction (spec.md §4.4): when every anchor
        // is a literal, check whether their longest common substring would
        // score higher than scanning for all of them. Reusing that reduced
        // substring as the scan target would require "linking" regexps
        // reconnecting each original's prefix/suffix around it (spec.md
        // §4.4) so the simulator can still seed a correct directed pass —
        // deliberately not built here, since every occurrence this plan
        // reports is re-verified against the full NFA anyway (see
        // DESIGN.md), so reducing the literal SET buys little over
        // scanning all of them with one Aho–Corasick pass. The comparison
        // is still computed and logged, matching the spec's intent.
        let all_literal = anchors.len() >= 2
            && anchors.len() <= opts.max_alternation_anchors
            && anchors.iter().all(|a| matches!(a.kind, AnchorKind::Literal(_)));
        if all_literal && !opts.disable_suffix_reduction {
            if let Some(lcs) = suffix_tree::longest_common_substring(&anchors) {
                let original_score: i32 = anchors.iter().map(Anchor::ff_score).sum();
                let reduced_score = lcs.len() as i32 * 4;
                log::debug!(
                    "fast-forward: common substring {:?} scores {} vs {} for the original {} anchors",
                    String::from_utf8_lossy(&lcs),
                    reduced_score,
                    original_score,
                    anchors.len()
                );
            }
        }
        log::debug!("fast-forward plan: {} anchor(s)", anchors.len());

        let literal_ac = if anchors.len() >= 2 && anchors.iter().all(|a| matches!(a.kind, AnchorKind::Literal(_))) {
            let patterns: Vec<&[u8]> = anchors
                .iter()
                .map(|a| match &a.kind {
                    AnchorKind::Literal(b) => b.as_slice(),
                    _ => unreachable!(),
                })
                .collect();
            aho_corasick::AhoCorasick::new(patterns).ok()
        } else {
            None
        };

        FastForwardPlan { anchors, literal_ac }
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Finds the next anchor occurrence at or after `from`. Returns `None`
    /// once no anchor can occur again before the end of `text`.
    pub fn next_candidate(&self, text: &[u8], from: usize) -> Option<Occurrence> {
        if self.anchors.is_empty() || from > text.len() {
            // No usable anchor: every remaining position is a candidate,
            // represented as a zero-width occurrence anchored at the global
            // entry/exit is meaningless here, so the caller (simulator) must
            // special-case an empty plan. Kept `None` would stop `all`
            // prematurely, so this path is handled by the caller instead.
            return None;
        }
        if let Some(ac) = &self.literal_ac {
            let m = ac.find(&text[from..])?;
            let anchor = &self.anchors[m.pattern().as_usize()];
            return Some(Occurrence { start: from + m.start(), end: from + m.end(), entry: anchor.entry, exit: anchor.exit });
        }
        let mut best: Option<Occurrence> = None;
        for anchor in &self.anchors {
            if let Some((start, end)) = scan::find(text, from, &anchor.kind) {
                if best.map_or(true, |b| start < b.start) {
                    best = Some(Occurrence { start, end, entry: anchor.entry, exit: anchor.exit });
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompileOptions;
    use crate::indexer::index;
    use crate::parser::parse;

    fn plan_for(pattern: &str) -> FastForwardPlan {
        let opts = CompileOptions::default();
        let mut root = parse(pattern, &opts).unwrap();
        index(&mut root, 0);
        FastForwardPlan::select(&root, &opts)
    }

    #[test]
    fn literal_concatenation_prefers_longest_literal() {
        let plan = plan_for("ab.cdefg");
        assert_eq!(plan.anchors.len(), 1);
        match &plan.anchors[0].kind {
            AnchorKind::Literal(b) => assert_eq!(b, b"cdefg"),
            other => panic!("expected literal anchor, got {:?}", other),
        }
    }

    #[test]
    fn plus_on_leaf_child_is_anchored() {
        let plan = plan_for("a+");
        assert_eq!(plan.anchors.len(), 1);
        assert!(matches!(plan.anchors[0].kind, AnchorKind::Literal(_)));
    }

    #[test]
    fn star_on_leaf_child_yields_no_anchor() {
        let plan = plan_for("a*");
        assert!(plan.is_empty());
    }

    #[test]
    fn bounded_multi_copy_repetition_yields_no_anchor() {
        let plan = plan_for("a{2,4}");
        assert!(plan.is_empty());
    }

    #[test]
    fn alternation_of_literals_finds_earliest_branch_occurrence() {
        let plan = plan_for("cat|dog");
        let occ = plan.next_candidate(b"zzz dog and cat zzz", 0).unwrap();
        assert_eq!((occ.start, occ.end), (4, 7));
    }

    #[test]
    fn alternation_of_literals_keeps_every_branch_as_its_own_anchor() {
        // Each branch keeps its own (entry, exit) pair so the simulator can
        // still seed a correct directed pass from any occurrence; see the
        // module docs on why the substring reduction isn't wired in here.
        let plan = plan_for("abcXdef|abcYdef");
        assert_eq!(plan.anchors.len(), 2);
    }
}
