//! The shift-reduce engine.
//!
//! The stack holds one entry per grammar symbol: its automaton state
//! plus the green elements accumulated for that symbol. Inline reduces
//! concatenate children without wrapping, so helper rules shaping the
//! automaton leave no trace in the tree. Recovery works on the same
//! stack: repaired tokens are pushed as zero-width missing tokens,
//! skipped source is folded into `ERROR` nodes attached to whatever
//! entry survives.

use monkey_errors::Diagnostic;
use monkey_grammar::{Action, Emit, Language, RuleId, StateId};
use monkey_lexer::{Lexer, Token};
use monkey_syntax::{Green, GreenNode, GreenToken, SyntaxKind, SyntaxTree};
use text_size::{TextRange, TextSize};

use crate::edit::ReuseCandidate;

/// Missing-token insertions without an intervening shift of real input.
const MAX_INSERTIONS: u32 = 32;
/// Automaton steps a repair simulation may take before giving up.
const MAX_SIM_STEPS: u32 = 64;

struct StackEntry {
    state: StateId,
    children: Vec<Green>,
}

pub(crate) struct Parser<'text> {
    language: &'static Language,
    text: &'text str,
    lexer: Lexer<'text>,
    pos: TextSize,
    stack: Vec<StackEntry>,
    lookahead: Option<Token>,
    /// Pending reuse candidates, reversed so `last()` is the next one.
    reuse: Vec<ReuseCandidate>,
    errors: Vec<Diagnostic>,
    insertions: u32,
    eof_reported: bool,
}

impl<'text> Parser<'text> {
    pub(crate) fn new(
        language: &'static Language,
        text: &'text str,
        mut reuse: Vec<ReuseCandidate>,
    ) -> Self {
        reuse.reverse();
        Self {
            language,
            text,
            lexer: Lexer::new(text),
            pos: TextSize::new(0),
            stack: vec![StackEntry { state: language.start(), children: Vec::new() }],
            lookahead: None,
            reuse,
            errors: Vec::new(),
            insertions: 0,
            eof_reported: false,
        }
    }

    pub(crate) fn run(mut self) -> (SyntaxTree, Vec<Diagnostic>) {
        loop {
            self.try_reuse();
            let token = self.peek();
            match self.language.action(self.state(), token.kind) {
                Action::Shift(next) => self.shift(next),
                Action::Reduce(rule) => self.reduce(rule),
                Action::Accept => break,
                Action::Error => self.recover(),
            }
        }

        let mut children = Vec::new();
        for entry in self.stack.drain(..) {
            children.extend(entry.children);
        }
        if let Some(eof) = self.lookahead.take() {
            children.push(Green::Token(eof.green()));
        }
        let root = GreenNode::new(SyntaxKind::PROGRAM, children);
        (SyntaxTree::new(self.text.into(), root), self.errors)
    }

    fn state(&self) -> StateId {
        match self.stack.last() {
            Some(entry) => entry.state,
            None => self.language.start(),
        }
    }

    fn peek(&mut self) -> Token {
        match self.lookahead {
            Some(token) => token,
            None => {
                let token = self.lexer.token_at(self.pos, self.language.valid(self.state()));
                self.lookahead = Some(token);
                token
            }
        }
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.lookahead.take()?;
        self.pos += token.text_len;
        Some(token)
    }

    fn shift(&mut self, next: StateId) {
        if let Some(token) = self.bump() {
            self.insertions = 0;
            self.stack.push(StackEntry { state: next, children: vec![Green::Token(token.green())] });
        }
    }

    fn reduce(&mut self, rule: RuleId) {
        let len = self.language.rule_len(rule);
        let mut children = Vec::new();
        if len > 0 {
            let split = self.stack.len() - len;
            for entry in self.stack.drain(split..) {
                children.extend(entry.children);
            }
        }
        let children = match self.language.rule_emit(rule) {
            Emit::Node(kind) => vec![Green::Node(GreenNode::new(kind, children))],
            Emit::Inline => children,
        };

        let state = self.state();
        let Some(next) = self.language.goto_after(state, rule) else {
            unreachable!("no goto after reduce");
        };
        self.stack.push(StackEntry { state: next, children });
    }

    /// Splices a statement from the previous tree when the parser sits
    /// at its exact position in a state that can accept a statement.
    /// The candidate's bytes and one token beyond are untouched, so a
    /// from-scratch parse would produce this subtree verbatim.
    fn try_reuse(&mut self) {
        while let Some(candidate) = self.reuse.last() {
            if candidate.new_start < self.pos {
                self.reuse.pop();
                continue;
            }
            if candidate.new_start > self.pos || self.stack.len() > 2 {
                return;
            }
            let Some(next) = self.language.resync_goto(self.state()) else { return };
            let Some(candidate) = self.reuse.pop() else { return };

            self.pos += candidate.green.text_len();
            self.lookahead = None;
            self.stack
                .push(StackEntry { state: next, children: vec![Green::Node(candidate.green)] });
        }
    }

    fn recover(&mut self) {
        let token = self.peek();
        match token.kind {
            SyntaxKind::EOF => self.recover_at_eof(),
            SyntaxKind::ERROR_TOKEN => self.lexical_error(token),
            _ => {
                if !self.try_insert() {
                    self.skip_to_statement();
                }
            }
        }
    }

    /// Garbage from the lexer never reaches the automaton: wrap it in
    /// an error node attached to the current entry and move on.
    fn lexical_error(&mut self, token: Token) {
        self.report_lexical(token);

        if let Some(token) = self.bump() {
            let error = GreenNode::new(SyntaxKind::ERROR, vec![Green::Token(token.green())]);
            if let Some(top) = self.stack.last_mut() {
                top.children.push(Green::Node(error));
            }
        }
    }

    /// Single-token repair: find a terminal whose insertion lets the
    /// automaton consume the real lookahead, verified by simulating on
    /// a copy of the state stack. The identifier is tried first so a
    /// hole where an expression belongs becomes a missing name rather
    /// than a skipped statement.
    fn try_insert(&mut self) -> bool {
        if self.insertions >= MAX_INSERTIONS {
            return false;
        }
        let lookahead = self.peek();

        let candidates = std::iter::once(SyntaxKind::IDENT).chain(
            SyntaxKind::TERMINALS.into_iter().filter(|kind| {
                !matches!(kind, SyntaxKind::IDENT | SyntaxKind::ERROR_TOKEN | SyntaxKind::EOF)
            }),
        );

        for candidate in candidates {
            let mut states: Vec<StateId> = self.stack.iter().map(|entry| entry.state).collect();
            if !simulate_feed(self.language, &mut states, candidate) {
                continue;
            }
            if !simulate_feed(self.language, &mut states, lookahead.kind) {
                continue;
            }

            let at = self.pos + lookahead.leading_len;
            self.errors.push(Diagnostic::error(
                format!("missing {}", candidate.describe()),
                TextRange::empty(at),
            ));
            self.feed_missing(candidate);
            self.insertions += 1;
            return true;
        }
        false
    }

    fn feed_missing(&mut self, kind: SyntaxKind) {
        loop {
            match self.language.action(self.state(), kind) {
                Action::Shift(next) => {
                    let token = GreenToken::missing(kind, TextSize::new(0));
                    self.stack.push(StackEntry { state: next, children: vec![Green::Token(token)] });
                    break;
                }
                Action::Reduce(rule) => self.reduce(rule),
                Action::Accept | Action::Error => unreachable!("unvalidated insertion"),
            }
        }
        // state changed, keyword classification may differ
        self.lookahead = None;
    }

    /// Pops to the nearest state that can accept a statement and skips
    /// input up to a plausible statement boundary. Everything popped
    /// and skipped lands in one `ERROR` node, so coverage of the text
    /// is preserved.
    fn skip_to_statement(&mut self) {
        let token = self.peek();
        self.errors.push(Diagnostic::error("syntax error", self.token_range(token)));

        let mut folded: Vec<Vec<Green>> = Vec::new();
        let mut popped = false;
        while self.stack.len() > 1 && self.language.resync_goto(self.state()).is_none() {
            if let Some(entry) = self.stack.pop() {
                folded.push(entry.children);
                popped = true;
            }
        }
        self.lookahead = None;

        let mut children: Vec<Green> = Vec::new();
        for group in folded.into_iter().rev() {
            children.extend(group);
        }

        let first = self.language.statement_first();
        loop {
            let token = self.peek();
            match token.kind {
                SyntaxKind::EOF => break,
                SyntaxKind::SEMICOLON => {
                    if let Some(token) = self.bump() {
                        children.push(Green::Token(token.green()));
                    }
                    break;
                }
                SyntaxKind::R_BRACE if self.stack_accepts(SyntaxKind::R_BRACE) => break,
                kind if first.contains(kind) && (popped || !children.is_empty()) => break,
                _ => {
                    if token.kind == SyntaxKind::ERROR_TOKEN {
                        self.report_lexical(token);
                    }
                    if let Some(token) = self.bump() {
                        children.push(Green::Token(token.green()));
                    }
                }
            }
        }

        if !children.is_empty() {
            let error = GreenNode::new(SyntaxKind::ERROR, children);
            if let Some(top) = self.stack.last_mut() {
                top.children.push(Green::Node(error));
            }
        }
    }

    fn stack_accepts(&self, kind: SyntaxKind) -> bool {
        self.stack
            .iter()
            .any(|entry| self.language.action(entry.state, kind) != Action::Error)
    }

    /// At the end of input a repair is tried first; failing that the
    /// unfinished entries are folded into error nodes one by one, which
    /// strictly shrinks the stack until a state that can finish.
    fn recover_at_eof(&mut self) {
        if self.try_insert() {
            return;
        }
        if !self.eof_reported {
            self.eof_reported = true;
            self.errors
                .push(Diagnostic::error("unexpected end of file", TextRange::empty(self.pos)));
        }
        if self.stack.len() > 1 {
            if let Some(entry) = self.stack.pop() {
                if !entry.children.is_empty() {
                    let error = GreenNode::new(SyntaxKind::ERROR, entry.children);
                    if let Some(top) = self.stack.last_mut() {
                        top.children.push(Green::Node(error));
                    }
                }
            }
            self.lookahead = None;
        }
    }

    fn report_lexical(&mut self, token: Token) {
        let range = self.token_range(token);
        let message = if self.text[range].starts_with('"') {
            "unterminated string literal"
        } else {
            "unrecognized character"
        };
        self.errors.push(Diagnostic::error(message, range));
    }

    fn token_range(&self, token: Token) -> TextRange {
        TextRange::new(self.pos + token.leading_len, self.pos + token.text_len)
    }
}

fn simulate_feed(language: &Language, states: &mut Vec<StateId>, kind: SyntaxKind) -> bool {
    for _ in 0..MAX_SIM_STEPS {
        let Some(&state) = states.last() else { return false };
        match language.action(state, kind) {
            Action::Shift(next) => {
                states.push(next);
                return true;
            }
            Action::Accept => return true,
            Action::Reduce(rule) => {
                let len = language.rule_len(rule);
                if states.len() <= len {
                    return false;
                }
                states.truncate(states.len() - len);
                let Some(&state) = states.last() else { return false };
                match language.goto_after(state, rule) {
                    Some(next) => states.push(next),
                    None => return false,
                }
            }
            Action::Error => return false,
        }
    }
    false
}
