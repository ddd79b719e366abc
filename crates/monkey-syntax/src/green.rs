use std::fmt;

use text_size::TextSize;
use triomphe::ThinArc;

use crate::{NodeOrToken, SyntaxKind};

/// Element of the immutable green tree.
pub type Green = NodeOrToken<GreenNode, GreenToken>;

impl Green {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            Self::Node(node) => node.kind(),
            Self::Token(token) => token.kind,
        }
    }

    pub fn text_len(&self) -> TextSize {
        match self {
            Self::Node(node) => node.text_len(),
            Self::Token(token) => token.text_len,
        }
    }

    pub(crate) fn flags(&self) -> u8 {
        match self {
            Self::Node(node) => node.data().header.header.flags,
            Self::Token(token) => token.flags(),
        }
    }
}

/// A terminal leaf. `text_len` covers the full extent of the token
/// including its leading trivia; `leading_len` is the trivia prefix.
/// Missing tokens are zero-width placeholders inserted by recovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GreenToken {
    pub kind: SyntaxKind,
    pub leading_len: TextSize,
    pub text_len: TextSize,
    pub missing: bool,
}

impl GreenToken {
    pub fn new(kind: SyntaxKind, leading_len: TextSize, text_len: TextSize) -> Self {
        Self { kind, leading_len, text_len, missing: false }
    }

    pub fn missing(kind: SyntaxKind, leading_len: TextSize) -> Self {
        Self { kind, leading_len, text_len: leading_len, missing: true }
    }

    fn flags(self) -> u8 {
        let mut flags = 0;
        if self.kind == SyntaxKind::ERROR_TOKEN {
            flags |= HAS_ERROR;
        }
        if self.missing {
            flags |= HAS_MISSING;
        }
        flags
    }
}

pub(crate) const HAS_ERROR: u8 = 1 << 0;
pub(crate) const HAS_MISSING: u8 = 1 << 1;

#[derive(PartialEq, Eq, Hash)]
pub(crate) struct NodeHead {
    pub(crate) kind: SyntaxKind,
    pub(crate) flags: u8,
    pub(crate) text_len: TextSize,
}

/// An interior node. Children are stored inline behind a single
/// allocation; cloning is a reference-count bump.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GreenNode(ThinArc<NodeHead, Green>);

impl GreenNode {
    pub fn new(kind: SyntaxKind, children: Vec<Green>) -> Self {
        let mut text_len = TextSize::new(0);
        let mut flags = if kind == SyntaxKind::ERROR { HAS_ERROR } else { 0 };
        for child in &children {
            text_len += child.text_len();
            flags |= child.flags();
        }
        let head = NodeHead { kind, flags, text_len };
        Self(ThinArc::from_header_and_iter(head, children.into_iter()))
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.header.header.kind
    }

    pub fn text_len(&self) -> TextSize {
        self.0.header.header.text_len
    }

    pub fn children(&self) -> &[Green] {
        &self.0.slice
    }

    /// True if any error node or error token occurs in this subtree.
    pub fn has_error(&self) -> bool {
        self.0.header.header.flags & HAS_ERROR != 0
    }

    /// True if any missing token occurs in this subtree.
    pub fn has_missing(&self) -> bool {
        self.0.header.header.flags & HAS_MISSING != 0
    }

    /// Identity comparison. Two clones of the same allocation compare
    /// equal here even when structurally equal copies do not.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.0.ptr() == other.0.ptr()
    }

    pub(crate) fn data(
        &self,
    ) -> &triomphe::HeaderSlice<triomphe::HeaderWithLength<NodeHead>, [Green]> {
        &self.0
    }
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenNode")
            .field("kind", &self.kind())
            .field("text_len", &self.text_len())
            .field("children", &self.children())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: SyntaxKind, leading: u32, len: u32) -> Green {
        Green::Token(GreenToken::new(kind, TextSize::new(leading), TextSize::new(len)))
    }

    #[test]
    fn lengths_sum_over_children() {
        let node = GreenNode::new(
            SyntaxKind::EXPR_STMT,
            vec![token(SyntaxKind::INT, 0, 1), token(SyntaxKind::SEMICOLON, 0, 1)],
        );
        assert_eq!(node.text_len(), TextSize::new(2));
        assert!(!node.has_error());
        assert!(!node.has_missing());
    }

    #[test]
    fn flags_propagate_upward() {
        let inner = GreenNode::new(
            SyntaxKind::EXPR_STMT,
            vec![
                token(SyntaxKind::INT, 0, 1),
                Green::Token(GreenToken::missing(SyntaxKind::SEMICOLON, TextSize::new(0))),
            ],
        );
        let root = GreenNode::new(SyntaxKind::PROGRAM, vec![Green::Node(inner)]);
        assert!(root.has_missing());
        assert!(!root.has_error());

        let error = GreenNode::new(SyntaxKind::ERROR, vec![token(SyntaxKind::PLUS, 0, 1)]);
        let root = GreenNode::new(SyntaxKind::PROGRAM, vec![Green::Node(error)]);
        assert!(root.has_error());
    }

    #[test]
    fn clones_share_the_allocation() {
        let node = GreenNode::new(SyntaxKind::BLOCK, vec![token(SyntaxKind::L_BRACE, 0, 1)]);
        let clone = node.clone();
        assert!(node.ptr_eq(&clone));
        assert_eq!(node, clone);

        let rebuilt = GreenNode::new(SyntaxKind::BLOCK, vec![token(SyntaxKind::L_BRACE, 0, 1)]);
        assert!(!node.ptr_eq(&rebuilt));
        assert_eq!(node, rebuilt);
    }
}
