//! SLR(1) construction over the declarative rule set.
//!
//! Item sets are interned in insertion order, so compiling the same
//! grammar always yields the same automaton, state ids included.

use std::fmt;

use indexmap::IndexMap;
use la_arena::{Arena, Idx, RawIdx};
use monkey_syntax::{SyntaxKind, SyntaxSet};
use rustc_hash::{FxBuildHasher, FxHashSet};

use crate::rules::{Assoc, Emit, GrammarDef, NT_COUNT, Sym};

pub type StateId = Idx<State>;
pub type RuleId = u16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Shift(StateId),
    Reduce(RuleId),
    Accept,
    Error,
}

#[derive(Debug)]
pub struct State {
    actions: [Action; SyntaxKind::TERMINAL_COUNT],
    gotos: [Option<StateId>; NT_COUNT],
    valid: SyntaxSet,
}

#[derive(Debug)]
struct RuleInfo {
    lhs: usize,
    len: usize,
    emit: Emit,
}

/// A compiled grammar: the parse tables plus the per-rule data the
/// runtime needs. Immutable once built, safe to share across threads.
#[derive(Debug)]
pub struct Language {
    states: Arena<State>,
    rules: Vec<RuleInfo>,
    start: StateId,
    resync: usize,
    statement_first: SyntaxSet,
}

impl Language {
    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn action(&self, state: StateId, token: SyntaxKind) -> Action {
        debug_assert!(token.is_terminal());
        self.states[state].actions[token as usize]
    }

    /// Terminals with any non-error action in `state`. Drives the
    /// keyword/identifier split in the lexer.
    pub fn valid(&self, state: StateId) -> SyntaxSet {
        self.states[state].valid
    }

    /// The goto transition taken after reducing `rule` on top of `state`.
    pub fn goto_after(&self, state: StateId, rule: RuleId) -> Option<StateId> {
        self.states[state].gotos[self.rules[rule as usize].lhs]
    }

    /// The goto on the resynchronisation nonterminal, if `state` has one.
    /// Recovery pops to the nearest state where this is `Some`.
    pub fn resync_goto(&self, state: StateId) -> Option<StateId> {
        self.states[state].gotos[self.resync]
    }

    pub fn rule_len(&self, rule: RuleId) -> usize {
        self.rules[rule as usize].len
    }

    pub fn rule_emit(&self, rule: RuleId) -> Emit {
        self.rules[rule as usize].emit
    }

    /// Tokens that can begin a statement. Recovery skips ahead to one
    /// of these.
    pub fn statement_first(&self) -> SyntaxSet {
        self.statement_first
    }
}

#[derive(Debug)]
pub enum GrammarError {
    ShiftReduce { token: SyntaxKind, rule: &'static str },
    ReduceReduce { token: SyntaxKind, first: &'static str, second: &'static str },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShiftReduce { token, rule } => write!(
                f,
                "shift/reduce conflict on {} against a {} rule; both sides need declared precedence",
                token.describe(),
                rule
            ),
            Self::ReduceReduce { token, first, second } => write!(
                f,
                "reduce/reduce conflict on {} between {} and {} rules",
                token.describe(),
                first,
                second
            ),
        }
    }
}

impl std::error::Error for GrammarError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Item {
    rule: RuleId,
    dot: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum SymKey {
    T(SyntaxKind),
    N(usize),
}

enum Resolution {
    Shift,
    Reduce,
}

pub(crate) fn compile(def: &GrammarDef) -> Result<Language, GrammarError> {
    Compiler::new(def).run()
}

struct Compiler<'g> {
    def: &'g GrammarDef,
    augmented: RuleId,
    augmented_rhs: [Sym; 1],
    rules_by_lhs: Vec<Vec<RuleId>>,
    nullable: Vec<bool>,
    first: Vec<SyntaxSet>,
    follow: Vec<SyntaxSet>,
    rule_prec: Vec<Option<u8>>,
    token_prec: [Option<(u8, Assoc)>; SyntaxKind::TERMINAL_COUNT],
}

impl<'g> Compiler<'g> {
    fn new(def: &'g GrammarDef) -> Self {
        let mut rules_by_lhs = vec![Vec::new(); NT_COUNT];
        for (index, rule) in def.rules.iter().enumerate() {
            rules_by_lhs[rule.lhs.index()].push(index as RuleId);
        }

        let mut token_prec = [None; SyntaxKind::TERMINAL_COUNT];
        for &(token, level, assoc) in &def.token_prec {
            token_prec[token as usize] = Some((level, assoc));
        }

        let rule_prec = def
            .rules
            .iter()
            .map(|rule| {
                rule.prec.or_else(|| {
                    rule.rhs.iter().rev().find_map(|sym| match sym {
                        Sym::T(token) => token_prec[*token as usize].map(|(level, _)| level),
                        Sym::N(_) => None,
                    })
                })
            })
            .collect();

        Self {
            def,
            augmented: def.rules.len() as RuleId,
            augmented_rhs: [Sym::N(def.start)],
            rules_by_lhs,
            nullable: vec![false; NT_COUNT],
            first: vec![SyntaxSet::EMPTY; NT_COUNT],
            follow: vec![SyntaxSet::EMPTY; NT_COUNT],
            rule_prec,
            token_prec,
        }
    }

    fn rhs(&self, rule: RuleId) -> &[Sym] {
        if rule == self.augmented { &self.augmented_rhs } else { &self.def.rules[rule as usize].rhs }
    }

    fn lhs_name(&self, rule: RuleId) -> &'static str {
        self.def.rules[rule as usize].lhs.name()
    }

    fn run(mut self) -> Result<Language, GrammarError> {
        self.compute_nullable();
        self.compute_first();
        self.compute_follow();

        // Canonical LR(0) collection. Full closures are the interning
        // key; successor sets are explored breadth first.
        let mut sets: IndexMap<Vec<Item>, (), FxBuildHasher> = IndexMap::default();
        let mut transitions: Vec<Vec<(SymKey, usize)>> = Vec::new();

        sets.insert_full(self.closure(vec![Item { rule: self.augmented, dot: 0 }]), ());

        let mut index = 0;
        while index < sets.len() {
            let items = sets.get_index(index).map(|(items, _)| items.clone()).unwrap_or_default();

            let mut successors: IndexMap<SymKey, Vec<Item>, FxBuildHasher> = IndexMap::default();
            for &item in &items {
                let rhs = self.rhs(item.rule);
                if let Some(sym) = rhs.get(item.dot as usize) {
                    let key = match sym {
                        Sym::T(token) => SymKey::T(*token),
                        Sym::N(nt) => SymKey::N(nt.index()),
                    };
                    successors
                        .entry(key)
                        .or_default()
                        .push(Item { rule: item.rule, dot: item.dot + 1 });
                }
            }

            let mut outgoing = Vec::with_capacity(successors.len());
            for (key, kernel) in successors {
                let (target, _) = sets.insert_full(self.closure(kernel), ());
                outgoing.push((key, target));
            }
            transitions.push(outgoing);
            index += 1;
        }

        let state_id = |index: usize| StateId::from_raw(RawIdx::from(index as u32));

        let mut states = Arena::new();
        for (index, (items, _)) in sets.iter().enumerate() {
            let mut actions = [Action::Error; SyntaxKind::TERMINAL_COUNT];
            let mut gotos = [None; NT_COUNT];

            for &(key, target) in &transitions[index] {
                match key {
                    SymKey::T(token) => actions[token as usize] = Action::Shift(state_id(target)),
                    SymKey::N(nt) => gotos[nt] = Some(state_id(target)),
                }
            }

            for &item in items {
                if (item.dot as usize) < self.rhs(item.rule).len() {
                    continue;
                }
                if item.rule == self.augmented {
                    actions[SyntaxKind::EOF as usize] = Action::Accept;
                    continue;
                }

                let lhs = self.def.rules[item.rule as usize].lhs.index();
                for token in self.follow[lhs].iter() {
                    let slot = &mut actions[token as usize];
                    match *slot {
                        Action::Error => *slot = Action::Reduce(item.rule),
                        Action::Shift(_) => match self.resolve(token, item.rule)? {
                            Resolution::Shift => {}
                            Resolution::Reduce => *slot = Action::Reduce(item.rule),
                        },
                        Action::Reduce(other) => {
                            return Err(GrammarError::ReduceReduce {
                                token,
                                first: self.lhs_name(other),
                                second: self.lhs_name(item.rule),
                            });
                        }
                        Action::Accept => {
                            return Err(GrammarError::ShiftReduce {
                                token,
                                rule: self.lhs_name(item.rule),
                            });
                        }
                    }
                }
            }

            let mut valid = SyntaxSet::EMPTY;
            for token in SyntaxKind::TERMINALS {
                if actions[token as usize] != Action::Error {
                    valid = valid.with(token);
                }
            }

            states.alloc(State { actions, gotos, valid });
        }

        let rules = self
            .def
            .rules
            .iter()
            .map(|rule| RuleInfo { lhs: rule.lhs.index(), len: rule.rhs.len(), emit: rule.emit })
            .collect();

        Ok(Language {
            states,
            rules,
            start: state_id(0),
            resync: self.def.resync.index(),
            statement_first: self.first[self.def.resync.index()],
        })
    }

    fn resolve(&self, token: SyntaxKind, rule: RuleId) -> Result<Resolution, GrammarError> {
        let Some((token_level, assoc)) = self.token_prec[token as usize] else {
            return Err(GrammarError::ShiftReduce { token, rule: self.lhs_name(rule) });
        };
        let Some(rule_level) = self.rule_prec[rule as usize] else {
            return Err(GrammarError::ShiftReduce { token, rule: self.lhs_name(rule) });
        };

        Ok(if token_level > rule_level {
            Resolution::Shift
        } else if token_level < rule_level {
            Resolution::Reduce
        } else {
            match assoc {
                Assoc::Left => Resolution::Reduce,
                Assoc::Right => Resolution::Shift,
            }
        })
    }

    fn closure(&self, kernel: Vec<Item>) -> Vec<Item> {
        let mut seen: FxHashSet<Item> = kernel.iter().copied().collect();
        let mut pending = kernel;
        let mut index = 0;
        while index < pending.len() {
            let item = pending[index];
            index += 1;
            if let Some(Sym::N(nt)) = self.rhs(item.rule).get(item.dot as usize) {
                for &rule in &self.rules_by_lhs[nt.index()] {
                    let item = Item { rule, dot: 0 };
                    if seen.insert(item) {
                        pending.push(item);
                    }
                }
            }
        }
        pending.sort_unstable();
        pending
    }

    fn compute_nullable(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for rule in &self.def.rules {
                if self.nullable[rule.lhs.index()] {
                    continue;
                }
                let all_nullable = rule.rhs.iter().all(|sym| match sym {
                    Sym::T(_) => false,
                    Sym::N(nt) => self.nullable[nt.index()],
                });
                if all_nullable {
                    self.nullable[rule.lhs.index()] = true;
                    changed = true;
                }
            }
        }
    }

    fn compute_first(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for rule in &self.def.rules {
                let lhs = rule.lhs.index();
                let before = self.first[lhs];
                let mut updated = before;
                for sym in &rule.rhs {
                    match sym {
                        Sym::T(token) => {
                            updated = updated.with(*token);
                            break;
                        }
                        Sym::N(nt) => {
                            updated = updated.union(self.first[nt.index()]);
                            if !self.nullable[nt.index()] {
                                break;
                            }
                        }
                    }
                }
                if updated != before {
                    self.first[lhs] = updated;
                    changed = true;
                }
            }
        }
    }

    fn compute_follow(&mut self) {
        self.follow[self.def.start.index()] =
            self.follow[self.def.start.index()].with(SyntaxKind::EOF);

        let mut changed = true;
        while changed {
            changed = false;
            for rule in &self.def.rules {
                let lhs = rule.lhs.index();
                for (position, sym) in rule.rhs.iter().enumerate() {
                    let Sym::N(nt) = sym else { continue };
                    let nt = nt.index();
                    let rest = &rule.rhs[position + 1..];

                    let before = self.follow[nt];
                    let mut updated = before.union(self.first_of(rest));
                    if self.seq_nullable(rest) {
                        updated = updated.union(self.follow[lhs]);
                    }
                    if updated != before {
                        self.follow[nt] = updated;
                        changed = true;
                    }
                }
            }
        }
    }

    fn first_of(&self, seq: &[Sym]) -> SyntaxSet {
        let mut set = SyntaxSet::EMPTY;
        for sym in seq {
            match sym {
                Sym::T(token) => return set.with(*token),
                Sym::N(nt) => {
                    set = set.union(self.first[nt.index()]);
                    if !self.nullable[nt.index()] {
                        return set;
                    }
                }
            }
        }
        set
    }

    fn seq_nullable(&self, seq: &[Sym]) -> bool {
        seq.iter().all(|sym| match sym {
            Sym::T(_) => false,
            Sym::N(nt) => self.nullable[nt.index()],
        })
    }
}
