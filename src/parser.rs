// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The pattern parser (spec.md §4.1).
//!
//! An explicit stack with two virtual marker tokens, `(` and `|`, following
//! spec.md's description exactly (no recursive-descent/parser-combinator
//! dependency — the teacher owns its own parser rather than delegating to
//! `regex-syntax`, see DESIGN.md).

use crate::char_class::CharClass;
use crate::config::CompileOptions;
use crate::error::{ParserError, ParserErrorKind};
use crate::node::{BracketNode, ChildrenNode, MultipleCharNode, PhysicalNode, RegexpNode, INFINITE};

type PResult<T> = Result<T, ParserError>;

enum StackItem {
    Node(RegexpNode),
    LParen,
    Bar,
}

pub struct Parser<'a> {
    pattern: &'a [u8],
    pos: usize,
    stack: Vec<StackItem>,
    #[allow(dead_code)]
    opts: &'a CompileOptions,
}

/// Parses `pattern` into a single `RegexpNode` tree root.
pub fn parse(pattern: &str, opts: &CompileOptions) -> PResult<RegexpNode> {
    Parser::new(pattern.as_bytes(), opts).parse_root()
}

impl<'a> Parser<'a> {
    fn new(pattern: &'a [u8], opts: &'a CompileOptions) -> Parser<'a> {
        Parser { pattern: pattern, pos: 0, stack: Vec::new(), opts: opts }
    }

    fn peek(&self) -> Option<u8> {
        self.pattern.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.pattern.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn err(&self, kind: ParserErrorKind) -> ParserError {
        ParserError::new(self.pos, kind)
    }

    fn parse_root(mut self) -> PResult<RegexpNode> {
        while let Some(c) = self.peek() {
            match c {
                b'(' => {
                    self.pos += 1;
                    self.stack.push(StackItem::LParen);
                }
                b')' => {
                    self.pos += 1;
                    self.close_group()?;
                }
                b'|' => {
                    self.pos += 1;
                    let concat = self.fold_concatenation();
                    self.stack.push(StackItem::Node(concat));
                    self.stack.push(StackItem::Bar);
                }
                b'*' => {
                    self.pos += 1;
                    self.apply_repetition(0, INFINITE)?;
                }
                b'+' => {
                    self.pos += 1;
                    self.apply_repetition(1, INFINITE)?;
                }
                b'?' => {
                    self.pos += 1;
                    self.apply_repetition(0, 1)?;
                }
                b'{' => {
                    if let Some((min, max)) = self.try_parse_bounds()? {
                        self.apply_repetition(min, max)?;
                    } else {
                        self.pos += 1;
                        self.push_literal_byte(b'{');
                    }
                }
                b'.' => {
                    self.pos += 1;
                    self.stack.push(StackItem::Node(RegexpNode::Period(PhysicalNode::new())));
                }
                b'^' => {
                    self.pos += 1;
                    self.stack
                        .push(StackItem::Node(RegexpNode::StartOfLine(PhysicalNode::new())));
                }
                b'$' => {
                    self.pos += 1;
                    self.stack
                        .push(StackItem::Node(RegexpNode::EndOfLine(PhysicalNode::new())));
                }
                b'[' => {
                    let node = self.parse_bracket()?;
                    self.stack.push(StackItem::Node(node));
                }
                b'\\' => {
                    self.pos += 1;
                    let node = self.parse_escape()?;
                    match node {
                        EscapeResult::Literal(b) => self.push_literal_byte(b),
                        EscapeResult::Class(node) => self.stack.push(StackItem::Node(node)),
                    }
                }
                _ => {
                    self.pos += 1;
                    self.push_literal_byte(c);
                }
            }
        }
        let root = self.fold_concatenation();
        // Any remaining `(` marker means an unmatched opening paren.
        if self.stack.iter().any(|i| matches!(i, StackItem::LParen)) {
            return Err(self.err(ParserErrorKind::UnmatchedParen));
        }
        let root = self.collapse_alternation_from(0, root);
        if !self.stack.is_empty() {
            return Err(self.err(ParserErrorKind::UnmatchedParen));
        }
        Ok(root)
    }

    /// Appends a byte to the top-of-stack `MultipleChar` node if it is not
    /// full and the byte will not immediately be consumed by a retroactive
    /// repetition operator (spec.md §4.1); otherwise starts a new node.
    fn push_literal_byte(&mut self, b: u8) {
        let followed_by_operator = matches!(self.peek(), Some(b'*') | Some(b'+') | Some(b'?'))
            || self.peek_is_repetition_bound();
        if !followed_by_operator {
            if let Some(StackItem::Node(RegexpNode::MultipleChar(mc))) = self.stack.last_mut() {
                if !mc.is_full() {
                    mc.bytes.push(b);
                    return;
                }
            }
        }
        self.stack
            .push(StackItem::Node(RegexpNode::MultipleChar(MultipleCharNode::new(vec![b]))));
    }

    fn peek_is_repetition_bound(&self) -> bool {
        if self.peek() != Some(b'{') {
            return false;
        }
        let mut i = self.pos + 1;
        let mut saw_digit = false;
        while let Some(c) = self.pattern.get(i) {
            match c {
                b'0'..=b'9' => {
                    saw_digit = true;
                    i += 1;
                }
                b',' => i += 1,
                b'}' => return saw_digit || i > self.pos + 1,
                _ => return false,
            }
        }
        false
    }

    /// Pops nodes off the stack (stopping at a marker or the stack bottom)
    /// and folds them into a single `Concatenation`, pushed back... actually
    /// returned, not pushed, so callers decide placement.
    fn fold_concatenation(&mut self) -> RegexpNode {
        let mut nodes = Vec::new();
        while let Some(StackItem::Node(_)) = self.stack.last() {
            if let Some(StackItem::Node(n)) = self.stack.pop() {
                nodes.push(n);
            }
        }
        nodes.reverse();
        match nodes.len() {
            0 => RegexpNode::Concatenation(ChildrenNode::new(Vec::new())),
            1 => nodes.into_iter().next().unwrap(),
            _ => RegexpNode::Concatenation(ChildrenNode::new(nodes)),
        }
    }

    /// On `)`: fold the topmost concatenation, then collapse any alternation
    /// branches up to and including the matching `(`.
    fn close_group(&mut self) -> PResult<()> {
        let last = self.fold_concatenation();
        let paren_index = self
            .stack
            .iter()
            .rposition(|i| matches!(i, StackItem::LParen))
            .ok_or_else(|| self.err(ParserErrorKind::UnmatchedParen))?;
        let node = self.collapse_alternation_from(paren_index + 1, last);
        self.stack.truncate(paren_index);
        self.stack.push(StackItem::Node(node));
        Ok(())
    }

    /// Collapses `Bar`-separated branches found at or above `from` (plus the
    /// already-folded trailing branch `last`) into a single node: the branch
    /// itself if there was only one, or an `Alternation` otherwise.
    fn collapse_alternation_from(&mut self, from: usize, last: RegexpNode) -> RegexpNode {
        let mut branches = vec![last];
        while self.stack.len() > from {
            match self.stack.pop() {
                Some(StackItem::Bar) => {
                    if let Some(StackItem::Node(n)) = self.stack.pop() {
                        branches.push(n);
                    }
                }
                Some(StackItem::Node(n)) => branches.push(n),
                _ => break,
            }
        }
        branches.reverse();
        if branches.len() == 1 {
            branches.into_iter().next().unwrap()
        } else {
            RegexpNode::Alternation(ChildrenNode::new(branches))
        }
    }

    fn apply_repetition(&mut self, min: usize, max: usize) -> PResult<()> {
        if min > max {
            return Err(self.err(ParserErrorKind::InvalidRepetition { min: min, max: max }));
        }
        let child = match self.stack.pop() {
            Some(StackItem::Node(n)) => n,
            other => {
                if let Some(item) = other {
                    self.stack.push(item);
                }
                return Err(self.err(ParserErrorKind::Expected("an atom to repeat")));
            }
        };
        let node = build_repetition(child, min, max);
        self.stack.push(StackItem::Node(node));
        Ok(())
    }

    /// Tries to parse `{m}`, `{m,}`, `{,n}` or `{m,n}` starting at the
    /// current `{`. Returns `Ok(None)` (without advancing) if what follows
    /// `{` is not a well-formed bound, so the `{` is treated as a literal.
    fn try_parse_bounds(&mut self) -> PResult<Option<(usize, usize)>> {
        let start = self.pos;
        if !self.peek_is_repetition_bound() {
            return Ok(None);
        }
        self.pos += 1; // consume '{'
        let min_digits = self.take_digits();
        let has_comma = self.peek() == Some(b',');
        if has_comma {
            self.pos += 1;
        }
        let max_digits = if has_comma { self.take_digits() } else { None };
        if self.peek() != Some(b'}') {
            self.pos = start;
            return Ok(None);
        }
        self.pos += 1; // consume '}'

        let (min, max) = match (min_digits, has_comma, max_digits) {
            (Some(m), false, _) => (m, m),
            (Some(m), true, Some(n)) => (m, n),
            (Some(m), true, None) => (m, INFINITE),
            (None, true, Some(n)) => (0, n),
            _ => {
                self.pos = start;
                return Ok(None);
            }
        };
        if min > max {
            return Err(ParserError::new(
                start,
                ParserErrorKind::InvalidRepetition { min: min, max: max },
            ));
        }
        Ok(Some((min, max)))
    }

    fn take_digits(&mut self) -> Option<usize> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        std::str::from_utf8(&self.pattern[start..self.pos]).ok()?.parse().ok()
    }

    fn parse_bracket(&mut self) -> PResult<RegexpNode> {
        self.pos += 1; // consume '['
        let negated = if self.peek() == Some(b'^') {
            self.pos += 1;
            true
        } else {
            false
        };
        let mut class = CharClass::new();
        let mut first = true;
        loop {
            match self.peek() {
                None => return Err(self.err(ParserErrorKind::Expected("']'"))),
                Some(b']') if !first => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {
                    let lo = self.bracket_literal_byte()?;
                    if self.peek() == Some(b'-') && self.peek_at(1) != Some(b']') && self.peek_at(1).is_some() {
                        self.pos += 1; // consume '-'
                        let hi = self.bracket_literal_byte()?;
                        if lo > hi {
                            return Err(self.err(ParserErrorKind::Expected("a valid range (lo <= hi)")));
                        }
                        class.push(lo, hi);
                    } else {
                        class.push_byte(lo);
                    }
                }
            }
            first = false;
        }
        class.normalize();
        Ok(RegexpNode::Bracket(BracketNode::new(class, negated)))
    }

    /// A single literal byte inside `[...]`, honoring the handful of
    /// backslash escapes spec.md §4.1 lists even inside brackets.
    fn bracket_literal_byte(&mut self) -> PResult<u8> {
        match self.bump() {
            None => Err(self.err(ParserErrorKind::Expected("a character"))),
            Some(b'\\') => match self.bump() {
                Some(b'n') => Ok(b'\n'),
                Some(b'r') => Ok(b'\r'),
                Some(b't') => Ok(b'\t'),
                Some(b'\\') => Ok(b'\\'),
                Some(b']') => Ok(b']'),
                Some(b'^') => Ok(b'^'),
                Some(b'-') => Ok(b'-'),
                Some(b'x') => self.parse_hex_byte(),
                Some(c) => Ok(c),
                None => Err(self.err(ParserErrorKind::Expected("an escaped character"))),
            },
            Some(c) => Ok(c),
        }
    }

    fn parse_hex_byte(&mut self) -> PResult<u8> {
        let hi = self.bump().ok_or_else(|| self.err(ParserErrorKind::Expected("two hex digits")))?;
        let lo = self.bump().ok_or_else(|| self.err(ParserErrorKind::Expected("two hex digits")))?;
        let hex = [hi, lo];
        let s = std::str::from_utf8(&hex).map_err(|_| self.err(ParserErrorKind::Expected("hex digits")))?;
        u8::from_str_radix(s, 16).map_err(|_| self.err(ParserErrorKind::Expected("hex digits")))
    }

    fn parse_escape(&mut self) -> PResult<EscapeResult> {
        match self.bump() {
            None => Err(self.err(ParserErrorKind::Expected("an escaped character"))),
            Some(c @ (b'(' | b')' | b'{' | b'}' | b'[' | b']' | b'|' | b'*' | b'+' | b'?'
            | b'^' | b'$' | b'\\' | b'.')) => Ok(EscapeResult::Literal(c)),
            Some(b'n') => Ok(EscapeResult::Literal(b'\n')),
            Some(b'r') => Ok(EscapeResult::Literal(b'\r')),
            Some(b't') => Ok(EscapeResult::Literal(b'\t')),
            Some(b'x') => Ok(EscapeResult::Literal(self.parse_hex_byte()?)),
            Some(b'd') => Ok(EscapeResult::Class(class_node(crate::char_class::digit(), false))),
            Some(b'D') => Ok(EscapeResult::Class(class_node(crate::char_class::digit(), true))),
            Some(b's') => Ok(EscapeResult::Class(class_node(crate::char_class::space(), false))),
            Some(b'S') => Ok(EscapeResult::Class(class_node(crate::char_class::space(), true))),
            Some(b'w') => Ok(EscapeResult::Class(class_node(crate::char_class::word(), false))),
            Some(b'W') => Ok(EscapeResult::Class(class_node(crate::char_class::word(), true))),
            Some(c) => Err(ParserError::new(
                self.pos - 1,
                ParserErrorKind::UnexpectedChar(c as char),
            )),
        }
    }
}

enum EscapeResult {
    Literal(u8),
    Class(RegexpNode),
}

fn class_node(class: CharClass, negated: bool) -> RegexpNode {
    RegexpNode::Bracket(BracketNode::new(class, negated))
}

/// Builds the repetition node for `child{min,max}`, applying the parse-time
/// optimization of spec.md §4.1: for a `MultipleChar` child with `min > 1`,
/// expand into a concatenation of copies (bounded by `MAX_NODE_LEN` worth of
/// literal bytes) plus, if `min < max`, a trailing bounded-or-unbounded
/// repetition covering the remaining `max - min` occurrences.
fn build_repetition(child: RegexpNode, min: usize, max: usize) -> RegexpNode {
    if min == 0 && max == 0 {
        // {0,0}: the child is unreachable; lowering produces a pure bypass
        // (spec.md §9 open question, resolved as "unreachable by design").
        return RegexpNode::Repetition(crate::node::RepetitionNode::new(child, 0, 0));
    }
    if let RegexpNode::MultipleChar(mc) = &child {
        if min > 1 {
            let mut children = Vec::new();
            for _ in 0..min {
                children.push(RegexpNode::MultipleChar(MultipleCharNode::new(mc.bytes.clone())));
            }
            let mandatory = if children.len() == 1 {
                children.into_iter().next().unwrap()
            } else {
                RegexpNode::Concatenation(ChildrenNode::new(children))
            };
            if min == max {
                return mandatory;
            }
            let remaining_max = if max == INFINITE { INFINITE } else { max - min };
            let optional = RegexpNode::Repetition(crate::node::RepetitionNode::new(
                RegexpNode::MultipleChar(mc.clone()),
                0,
                remaining_max,
            ));
            return RegexpNode::Concatenation(ChildrenNode::new(vec![mandatory, optional]));
        }
    }
    RegexpNode::Repetition(crate::node::RepetitionNode::new(child, min, max))
}
