// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Ties the pipeline together: parse, index, pick fast-forward anchors,
//! flatten into matching/control lists, emit, and reserve the region that
//! holds the emission — mirroring `Program::new`'s sequencing (parse,
//! compile, build prefixes, construct with pooled scratch).
//!
//! The result is a [`Matcher`]: an immutable, reusable compiled pattern
//! whose four match methods (spec.md §6) all run against the same
//! `RegexpInfo`/`FastForwardPlan` pair via `simulator.rs`.

use crate::code_memory::{CodeMemory, CodeRegion, Emitter, InterpreterCodeMemory, InterpreterEmitter};
use crate::config::CompileOptions;
use crate::error::CompileError;
use crate::fast_forward::FastForwardPlan;
use crate::indexer::index;
use crate::lister::{list, RegexpInfo};
use crate::parser::parse;
use crate::simulator::{self, Match};

/// Which of the four match methods (spec.md §6) a pattern was compiled for.
/// The interpreter backend builds the same `RegexpInfo`/`FastForwardPlan`
/// pair regardless, so every mode's methods are always callable on any
/// `Matcher` — `mode` is accepted for API parity with a hypothetical
/// specializing backend (one that, say, only emits a `full`-match automaton)
/// and is otherwise unused. See DESIGN.md.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMode {
    Full,
    Anywhere,
    First,
    All,
}

/// A compiled pattern, ready to match repeatedly against any number of byte
/// strings.
#[derive(Debug)]
pub struct Matcher {
    info: RegexpInfo,
    plan: FastForwardPlan,
    mode: MatchMode,
    _code: CodeRegion,
}

/// Compiles `pattern` with default [`CompileOptions`] and the interpreter
/// backend.
pub fn compile(pattern: &str, mode: MatchMode) -> Result<Matcher, CompileError> {
    compile_with(pattern, mode, &CompileOptions::default())
}

/// Compiles `pattern` with caller-supplied `opts`, still on the interpreter
/// backend.
pub fn compile_with(pattern: &str, mode: MatchMode, opts: &CompileOptions) -> Result<Matcher, CompileError> {
    let mut memory = InterpreterCodeMemory::default();
    compile_on(pattern, mode, opts, &InterpreterEmitter::default(), &mut memory)
}

/// Compiles `pattern` against an explicit `Emitter`/`CodeMemory` pair — the
/// seam a real machine-code backend would plug into (spec.md §4.6).
pub fn compile_on(
    pattern: &str,
    mode: MatchMode,
    opts: &CompileOptions,
    emitter: &dyn Emitter,
    memory: &mut dyn CodeMemory,
) -> Result<Matcher, CompileError> {
    let mut root = parse(pattern, opts)?;
    let last_state = index(&mut root, 0);
    let plan = FastForwardPlan::select(&root, opts);
    let info = list(&root, last_state, opts)?;

    let code = emitter.emit(&info)?;
    let mut region = memory.reserve(code.len())?;
    memory.commit(&mut region, true)?;
    memory.flush_icache(&region);

    log::debug!(
        "compiled pattern {:?}: {} states, {} matching op(s), {} control op(s), {} fast-forward anchor(s)",
        pattern,
        info.last_state + 1,
        info.matching_list.len(),
        info.control_list.len(),
        if plan.is_empty() { 0 } else { 1 },
    );

    Ok(Matcher { info, plan, mode, _code: region })
}

impl Matcher {
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn match_full(&self, text: &[u8]) -> bool {
        simulator::match_full(&self.info, text)
    }

    pub fn match_anywhere(&self, text: &[u8]) -> bool {
        simulator::match_anywhere(&self.info, text)
    }

    pub fn match_first(&self, text: &[u8]) -> Option<Match> {
        simulator::match_first(&self.info, text)
    }

    pub fn match_all(&self, text: &[u8]) -> Vec<Match> {
        simulator::match_all(&self.info, &self.plan, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_and_matches_a_simple_literal() {
        let m = compile("abc", MatchMode::Anywhere).unwrap();
        assert!(m.match_anywhere(b"xxabcxx"));
        assert!(!m.match_anywhere(b"xxxxxx"));
    }

    #[test]
    fn every_method_is_callable_regardless_of_declared_mode() {
        let m = compile("a|b", MatchMode::Full).unwrap();
        assert_eq!(m.mode(), MatchMode::Full);
        assert!(m.match_full(b"a"));
        assert!(m.match_anywhere(b"xa"));
        assert!(m.match_first(b"xa").is_some());
        assert_eq!(m.match_all(b"ab").len(), 2);
    }

    #[test]
    fn invalid_pattern_surfaces_a_compile_error() {
        let err = compile("(unterminated", MatchMode::Full).unwrap_err();
        assert!(matches!(err, CompileError::Parser(_)));
    }

    #[test]
    fn state_budget_is_enforced_through_the_driver() {
        let mut opts = CompileOptions::default();
        opts.state_budget = 2;
        let err = compile_with("abcdef", MatchMode::Full, &opts).unwrap_err();
        assert!(matches!(err, CompileError::StateBudgetExceeded { .. }));
    }
}
