//! Grammar definition and parse-table construction for Monkey.
//!
//! The grammar is declared as data in `rules` and compiled once into an
//! SLR(1) automaton by `table`. Ambiguities between expression operators
//! are left in the rules and resolved during compilation from the
//! declared precedence levels; a conflict the precedence table does not
//! cover fails compilation with a `GrammarError` instead of silently
//! picking a direction.

mod rules;
mod table;

pub use rules::{Assoc, Emit};
pub use table::{Action, GrammarError, Language, RuleId, State, StateId};

/// Compiles the Monkey grammar.
pub fn monkey_language() -> Result<Language, GrammarError> {
    table::compile(&rules::monkey())
}
