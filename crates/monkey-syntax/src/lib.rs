//! Lossless, immutable syntax tree for the Monkey language.
//!
//! Green nodes store lengths rather than absolute offsets and are shared
//! via `ThinArc`, so a subtree spliced into a new tree after an edit needs
//! no copying or range fixups. Red handles are cheap, lifetime-bound views
//! that materialize offsets and parent links on demand.

mod green;
mod syntax;
mod syntax_kind;
mod syntax_set;

pub use green::{Green, GreenNode, GreenToken};
pub use syntax::{NodeOrToken, SyntaxElement, SyntaxNode, SyntaxToken, SyntaxTree};
pub use syntax_kind::SyntaxKind;
pub use syntax_set::SyntaxSet;
