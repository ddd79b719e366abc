//! The Monkey grammar as data.
//!
//! Rules are plain right-hand-side sequences; ambiguity between
//! operators is not encoded in the rules but resolved by the declared
//! precedence table when the automaton is compiled, yacc style.

use monkey_syntax::SyntaxKind::{self, *};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum NonTerminal {
    Program,
    StatementList,
    Statement,
    LetStatement,
    ReturnStatement,
    ExpressionStatement,
    Block,
    Expression,
    PrefixExpression,
    InfixExpression,
    GroupedExpression,
    CallExpression,
    IndexExpression,
    IfExpression,
    FunctionLiteral,
    ArrayLiteral,
    HashLiteral,
    HashPair,
    ExpressionList,
    NonEmptyExpressionList,
    ParameterList,
    NonEmptyParameterList,
    HashPairList,
    NonEmptyHashPairList,
}

pub(crate) const NT_COUNT: usize = NonTerminal::NonEmptyHashPairList as usize + 1;

impl NonTerminal {
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Program => "Program",
            Self::StatementList => "StatementList",
            Self::Statement => "Statement",
            Self::LetStatement => "LetStatement",
            Self::ReturnStatement => "ReturnStatement",
            Self::ExpressionStatement => "ExpressionStatement",
            Self::Block => "Block",
            Self::Expression => "Expression",
            Self::PrefixExpression => "PrefixExpression",
            Self::InfixExpression => "InfixExpression",
            Self::GroupedExpression => "GroupedExpression",
            Self::CallExpression => "CallExpression",
            Self::IndexExpression => "IndexExpression",
            Self::IfExpression => "IfExpression",
            Self::FunctionLiteral => "FunctionLiteral",
            Self::ArrayLiteral => "ArrayLiteral",
            Self::HashLiteral => "HashLiteral",
            Self::HashPair => "HashPair",
            Self::ExpressionList => "ExpressionList",
            Self::NonEmptyExpressionList => "NonEmptyExpressionList",
            Self::ParameterList => "ParameterList",
            Self::NonEmptyParameterList => "NonEmptyParameterList",
            Self::HashPairList => "HashPairList",
            Self::NonEmptyHashPairList => "NonEmptyHashPairList",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Sym {
    T(SyntaxKind),
    N(NonTerminal),
}

/// What a reduce produces: a fresh node wrapping the popped children,
/// or the children spliced directly into the parent (for helper rules
/// that exist only to shape the automaton).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emit {
    Node(SyntaxKind),
    Inline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

pub(crate) struct Rule {
    pub(crate) lhs: NonTerminal,
    pub(crate) rhs: Vec<Sym>,
    pub(crate) emit: Emit,
    /// Precedence override. Without it a rule inherits the precedence
    /// of its rightmost terminal, if that terminal declares one.
    pub(crate) prec: Option<u8>,
}

pub(crate) struct GrammarDef {
    pub(crate) rules: Vec<Rule>,
    pub(crate) start: NonTerminal,
    /// Recovery synchronises on this nonterminal.
    pub(crate) resync: NonTerminal,
    pub(crate) token_prec: Vec<(SyntaxKind, u8, Assoc)>,
}

pub(crate) const PREC_STATEMENT: u8 = 1;
pub(crate) const PREC_EQUALITY: u8 = 2;
pub(crate) const PREC_COMPARISON: u8 = 3;
pub(crate) const PREC_SUM: u8 = 4;
pub(crate) const PREC_PRODUCT: u8 = 5;
pub(crate) const PREC_PREFIX: u8 = 6;
pub(crate) const PREC_CALL: u8 = 7;
pub(crate) const PREC_INDEX: u8 = 8;

fn inline(lhs: NonTerminal, rhs: &[Sym]) -> Rule {
    Rule { lhs, rhs: rhs.to_vec(), emit: Emit::Inline, prec: None }
}

fn node(lhs: NonTerminal, rhs: &[Sym], kind: SyntaxKind) -> Rule {
    Rule { lhs, rhs: rhs.to_vec(), emit: Emit::Node(kind), prec: None }
}

fn with_prec(mut rule: Rule, level: u8) -> Rule {
    rule.prec = Some(level);
    rule
}

/// The Monkey language. Statement separators follow the book's parser:
/// `let` requires a trailing `;`, expression and `return` statements
/// take an optional one.
pub(crate) fn monkey() -> GrammarDef {
    use NonTerminal::*;
    use Sym::{N, T};

    let rules = vec![
        inline(Program, &[]),
        inline(Program, &[N(StatementList)]),
        inline(StatementList, &[N(Statement)]),
        inline(StatementList, &[N(StatementList), N(Statement)]),
        inline(Statement, &[N(LetStatement)]),
        inline(Statement, &[N(ReturnStatement)]),
        inline(Statement, &[N(ExpressionStatement)]),
        node(
            LetStatement,
            &[T(LET_KW), T(IDENT), T(EQ), N(Expression), T(SEMICOLON)],
            LET_STMT,
        ),
        node(ReturnStatement, &[T(RETURN_KW), N(Expression), T(SEMICOLON)], RETURN_STMT),
        with_prec(node(ReturnStatement, &[T(RETURN_KW), N(Expression)], RETURN_STMT), PREC_STATEMENT),
        node(ReturnStatement, &[T(RETURN_KW), T(SEMICOLON)], RETURN_STMT),
        node(ExpressionStatement, &[N(Expression), T(SEMICOLON)], EXPR_STMT),
        with_prec(node(ExpressionStatement, &[N(Expression)], EXPR_STMT), PREC_STATEMENT),
        node(Block, &[T(L_BRACE), T(R_BRACE)], BLOCK),
        node(Block, &[T(L_BRACE), N(StatementList), T(R_BRACE)], BLOCK),
        inline(Expression, &[T(IDENT)]),
        inline(Expression, &[T(INT)]),
        inline(Expression, &[T(STRING)]),
        inline(Expression, &[T(TRUE_KW)]),
        inline(Expression, &[T(FALSE_KW)]),
        inline(Expression, &[N(PrefixExpression)]),
        inline(Expression, &[N(InfixExpression)]),
        inline(Expression, &[N(GroupedExpression)]),
        inline(Expression, &[N(CallExpression)]),
        inline(Expression, &[N(IndexExpression)]),
        inline(Expression, &[N(IfExpression)]),
        inline(Expression, &[N(FunctionLiteral)]),
        inline(Expression, &[N(ArrayLiteral)]),
        inline(Expression, &[N(HashLiteral)]),
        with_prec(node(PrefixExpression, &[T(BANG), N(Expression)], PREFIX_EXPR), PREC_PREFIX),
        with_prec(node(PrefixExpression, &[T(MINUS), N(Expression)], PREFIX_EXPR), PREC_PREFIX),
        node(InfixExpression, &[N(Expression), T(PLUS), N(Expression)], INFIX_EXPR),
        node(InfixExpression, &[N(Expression), T(MINUS), N(Expression)], INFIX_EXPR),
        node(InfixExpression, &[N(Expression), T(STAR), N(Expression)], INFIX_EXPR),
        node(InfixExpression, &[N(Expression), T(SLASH), N(Expression)], INFIX_EXPR),
        node(InfixExpression, &[N(Expression), T(LT), N(Expression)], INFIX_EXPR),
        node(InfixExpression, &[N(Expression), T(GT), N(Expression)], INFIX_EXPR),
        node(InfixExpression, &[N(Expression), T(EQ_EQ), N(Expression)], INFIX_EXPR),
        node(InfixExpression, &[N(Expression), T(NOT_EQ), N(Expression)], INFIX_EXPR),
        node(GroupedExpression, &[T(L_PAREN), N(Expression), T(R_PAREN)], PAREN_EXPR),
        with_prec(
            node(
                CallExpression,
                &[N(Expression), T(L_PAREN), N(ExpressionList), T(R_PAREN)],
                CALL_EXPR,
            ),
            PREC_CALL,
        ),
        with_prec(
            node(
                IndexExpression,
                &[N(Expression), T(L_BRACKET), N(Expression), T(R_BRACKET)],
                INDEX_EXPR,
            ),
            PREC_INDEX,
        ),
        node(
            IfExpression,
            &[T(IF_KW), T(L_PAREN), N(Expression), T(R_PAREN), N(Block)],
            IF_EXPR,
        ),
        node(
            IfExpression,
            &[T(IF_KW), T(L_PAREN), N(Expression), T(R_PAREN), N(Block), T(ELSE_KW), N(Block)],
            IF_EXPR,
        ),
        node(
            FunctionLiteral,
            &[T(FN_KW), T(L_PAREN), N(ParameterList), T(R_PAREN), N(Block)],
            FN_LITERAL,
        ),
        node(ArrayLiteral, &[T(L_BRACKET), N(ExpressionList), T(R_BRACKET)], ARRAY_LITERAL),
        node(HashLiteral, &[T(L_BRACE), N(HashPairList), T(R_BRACE)], HASH_LITERAL),
        node(HashPair, &[N(Expression), T(COLON), N(Expression)], HASH_PAIR),
        inline(ExpressionList, &[]),
        inline(ExpressionList, &[N(NonEmptyExpressionList)]),
        inline(NonEmptyExpressionList, &[N(Expression)]),
        inline(NonEmptyExpressionList, &[N(NonEmptyExpressionList), T(COMMA), N(Expression)]),
        inline(ParameterList, &[]),
        inline(ParameterList, &[N(NonEmptyParameterList)]),
        inline(NonEmptyParameterList, &[T(IDENT)]),
        inline(NonEmptyParameterList, &[N(NonEmptyParameterList), T(COMMA), T(IDENT)]),
        inline(HashPairList, &[]),
        inline(HashPairList, &[N(NonEmptyHashPairList)]),
        inline(NonEmptyHashPairList, &[N(HashPair)]),
        inline(NonEmptyHashPairList, &[N(NonEmptyHashPairList), T(COMMA), N(HashPair)]),
    ];

    let token_prec = vec![
        (EQ_EQ, PREC_EQUALITY, Assoc::Left),
        (NOT_EQ, PREC_EQUALITY, Assoc::Left),
        (LT, PREC_COMPARISON, Assoc::Left),
        (GT, PREC_COMPARISON, Assoc::Left),
        (PLUS, PREC_SUM, Assoc::Left),
        (MINUS, PREC_SUM, Assoc::Left),
        (STAR, PREC_PRODUCT, Assoc::Left),
        (SLASH, PREC_PRODUCT, Assoc::Left),
        (L_PAREN, PREC_CALL, Assoc::Left),
        (L_BRACKET, PREC_INDEX, Assoc::Left),
    ];

    GrammarDef { rules, start: Program, resync: Statement, token_prec }
}
