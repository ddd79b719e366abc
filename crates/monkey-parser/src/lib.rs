//! Table-driven parser for Monkey with incremental re-parsing.
//!
//! `parse` runs the compiled automaton over the whole text. For an
//! edited document, `parse_incremental` splices unchanged top-level
//! statements of the previous tree into the new parse; the result is
//! structurally identical to parsing the new text from scratch, only
//! cheaper. Parsing never fails: broken input yields a tree that still
//! covers every byte, with error and missing nodes marking the damage.

mod edit;
mod parser;
#[cfg(test)]
mod tests;

use std::sync::LazyLock;

pub use edit::{Edit, EditError};
use line_index::LineIndex;
use monkey_errors::Diagnostic;
use monkey_grammar::Language;
use monkey_syntax::{SyntaxNode, SyntaxTree};
use text_size::TextSize;

/// The compiled Monkey grammar. Built on first use, shared for the
/// lifetime of the process.
pub fn language() -> &'static Language {
    static LANGUAGE: LazyLock<Language> = LazyLock::new(|| {
        match monkey_grammar::monkey_language() {
            Ok(language) => language,
            Err(error) => panic!("builtin grammar failed to compile: {error}"),
        }
    });
    &LANGUAGE
}

#[derive(Debug)]
pub struct Parse {
    tree: SyntaxTree,
    errors: Vec<Diagnostic>,
}

impl Parse {
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        self.tree.root()
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn line_index(&self) -> LineIndex {
        LineIndex::new(self.tree.text())
    }
}

pub fn parse(text: &str) -> Parse {
    let (tree, errors) = parser::Parser::new(language(), text, Vec::new()).run();
    Parse { tree, errors }
}

/// Re-parses `new_text`, which must be the result of applying `edits`
/// (old-text coordinates, sorted, non-overlapping) to the text behind
/// `prev`. A malformed edit list is rejected, never guessed around.
pub fn parse_incremental(
    prev: &SyntaxTree,
    edits: &[Edit],
    new_text: &str,
) -> Result<Parse, EditError> {
    edit::validate(edits, TextSize::of(prev.text()), TextSize::of(new_text))?;
    let candidates = edit::reuse_candidates(prev, edits);
    let (tree, errors) = parser::Parser::new(language(), new_text, candidates).run();
    Ok(Parse { tree, errors })
}
