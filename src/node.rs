// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The regexp tree. One tagged enum per spec.md §3, with `entry_state`/
//! `exit_state` assigned exactly once by the indexer (`-1` beforehand).
//!
//! This mirrors `examples/original_source/src/regexp.h`'s
//! `LIST_REGEXP_TYPES` class hierarchy, expressed as a Rust sum type instead
//! of a CRTP/virtual class tree (design notes §9: "no virtual tables are
//! required").

use crate::char_class::CharClass;
use crate::config::MAX_NODE_LEN;

/// Sentinel for an entry/exit state that has not yet been assigned by the
/// indexer.
pub const UNASSIGNED: i64 = -1;

/// Encodes an unbounded repetition upper bound (`{m,}`).
pub const INFINITE: usize = usize::MAX;

#[derive(Clone, Debug)]
pub enum RegexpNode {
    /// A contiguous run of literal bytes, length in `[1, MAX_NODE_LEN]`.
    MultipleChar(MultipleCharNode),
    /// `.` — matches any single byte.
    Period(PhysicalNode),
    /// `[...]` / `[^...]` / a predefined class such as `\d`.
    Bracket(BracketNode),
    /// `^`
    StartOfLine(PhysicalNode),
    /// `$`
    EndOfLine(PhysicalNode),
    /// A synthetic epsilon transition, only ever produced by the lister.
    Epsilon(PhysicalNode),
    /// An ordered sequence of child nodes.
    Concatenation(ChildrenNode),
    /// An unordered (but positionally significant for tie-breaking) set of
    /// alternatives.
    Alternation(ChildrenNode),
    /// A repeated sub-pattern with inclusive bounds `[min, max]` (`max ==
    /// INFINITE` for unbounded repetition).
    Repetition(RepetitionNode),
}

/// Shared entry/exit-state bookkeeping for nodes with no other payload.
#[derive(Clone, Debug, Default)]
pub struct PhysicalNode {
    pub entry_state: i64,
    pub exit_state: i64,
}

impl PhysicalNode {
    pub fn new() -> PhysicalNode {
        PhysicalNode { entry_state: UNASSIGNED, exit_state: UNASSIGNED }
    }
}

#[derive(Clone, Debug)]
pub struct MultipleCharNode {
    pub entry_state: i64,
    pub exit_state: i64,
    pub bytes: Vec<u8>,
}

impl MultipleCharNode {
    pub fn new(bytes: Vec<u8>) -> MultipleCharNode {
        assert!(!bytes.is_empty() && bytes.len() <= MAX_NODE_LEN);
        MultipleCharNode { entry_state: UNASSIGNED, exit_state: UNASSIGNED, bytes: bytes }
    }

    pub fn is_full(&self) -> bool {
        self.bytes.len() == MAX_NODE_LEN
    }
}

#[derive(Clone, Debug)]
pub struct BracketNode {
    pub entry_state: i64,
    pub exit_state: i64,
    pub class: CharClass,
    pub negated: bool,
}

impl BracketNode {
    pub fn new(class: CharClass, negated: bool) -> BracketNode {
        BracketNode {
            entry_state: UNASSIGNED,
            exit_state: UNASSIGNED,
            class: class,
            negated: negated,
        }
    }

    /// Tests whether a byte matches this bracket, accounting for negation.
    pub fn matches(&self, b: u8) -> bool {
        self.class.contains(b) != self.negated
    }

    /// The effective class matched (post-negation), used by the fast-forward
    /// finder and the class scanner — avoids re-testing `negated` per byte.
    pub fn effective_class(&self) -> CharClass {
        if self.negated {
            self.class.negate()
        } else {
            self.class.clone()
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChildrenNode {
    pub entry_state: i64,
    pub exit_state: i64,
    pub children: Vec<RegexpNode>,
}

impl ChildrenNode {
    pub fn new(children: Vec<RegexpNode>) -> ChildrenNode {
        ChildrenNode { entry_state: UNASSIGNED, exit_state: UNASSIGNED, children: children }
    }
}

#[derive(Clone, Debug)]
pub struct RepetitionNode {
    pub entry_state: i64,
    pub exit_state: i64,
    pub child: Box<RegexpNode>,
    pub min: usize,
    pub max: usize,
}

impl RepetitionNode {
    pub fn new(child: RegexpNode, min: usize, max: usize) -> RepetitionNode {
        RepetitionNode {
            entry_state: UNASSIGNED,
            exit_state: UNASSIGNED,
            child: Box::new(child),
            min: min,
            max: max,
        }
    }
}

impl RegexpNode {
    pub fn entry_state(&self) -> i64 {
        match self {
            RegexpNode::MultipleChar(n) => n.entry_state,
            RegexpNode::Period(n)
            | RegexpNode::StartOfLine(n)
            | RegexpNode::EndOfLine(n)
            | RegexpNode::Epsilon(n) => n.entry_state,
            RegexpNode::Bracket(n) => n.entry_state,
            RegexpNode::Concatenation(n) | RegexpNode::Alternation(n) => n.entry_state,
            RegexpNode::Repetition(n) => n.entry_state,
        }
    }

    pub fn exit_state(&self) -> i64 {
        match self {
            RegexpNode::MultipleChar(n) => n.exit_state,
            RegexpNode::Period(n)
            | RegexpNode::StartOfLine(n)
            | RegexpNode::EndOfLine(n)
            | RegexpNode::Epsilon(n) => n.exit_state,
            RegexpNode::Bracket(n) => n.exit_state,
            RegexpNode::Concatenation(n) | RegexpNode::Alternation(n) => n.exit_state,
            RegexpNode::Repetition(n) => n.exit_state,
        }
    }

    pub fn set_entry_state(&mut self, s: i64) {
        match self {
            RegexpNode::MultipleChar(n) => n.entry_state = s,
            RegexpNode::Period(n)
            | RegexpNode::StartOfLine(n)
            | RegexpNode::EndOfLine(n)
            | RegexpNode::Epsilon(n) => n.entry_state = s,
            RegexpNode::Bracket(n) => n.entry_state = s,
            RegexpNode::Concatenation(n) | RegexpNode::Alternation(n) => n.entry_state = s,
            RegexpNode::Repetition(n) => n.entry_state = s,
        }
    }

    pub fn set_exit_state(&mut self, s: i64) {
        match self {
            RegexpNode::MultipleChar(n) => n.exit_state = s,
            RegexpNode::Period(n)
            | RegexpNode::StartOfLine(n)
            | RegexpNode::EndOfLine(n)
            | RegexpNode::Epsilon(n) => n.exit_state = s,
            RegexpNode::Bracket(n) => n.exit_state = s,
            RegexpNode::Concatenation(n) | RegexpNode::Alternation(n) => n.exit_state = s,
            RegexpNode::Repetition(n) => n.exit_state = s,
        }
    }

    /// True for nodes that consume input (appear in the matching list).
    pub fn is_consuming(&self) -> bool {
        matches!(
            self,
            RegexpNode::MultipleChar(_) | RegexpNode::Period(_) | RegexpNode::Bracket(_)
        )
    }

    /// True for the ε-like control nodes (spec.md §4.3).
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            RegexpNode::StartOfLine(_) | RegexpNode::EndOfLine(_) | RegexpNode::Epsilon(_)
        )
    }

    /// Longest literal match reachable through this node, used to size the
    /// state ring (spec.md §3 `max_match_length`).
    pub fn max_match_length(&self) -> usize {
        match self {
            RegexpNode::MultipleChar(n) => n.bytes.len(),
            RegexpNode::Period(_) | RegexpNode::Bracket(_) => 1,
            RegexpNode::StartOfLine(_) | RegexpNode::EndOfLine(_) | RegexpNode::Epsilon(_) => 0,
            RegexpNode::Concatenation(n) | RegexpNode::Alternation(n) => {
                n.children.iter().map(|c| c.max_match_length()).max().unwrap_or(0)
            }
            RegexpNode::Repetition(n) => n.child.max_match_length(),
        }
    }
}
