use std::fmt::Write as _;
use std::rc::Rc;

use text_size::{TextRange, TextSize};

use crate::{Green, GreenNode, GreenToken, SyntaxKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

/// A parsed file: the source text together with its green root.
///
/// The tree is lossless, the root always spans `0..text.len()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxTree {
    text: Box<str>,
    root: GreenNode,
}

impl SyntaxTree {
    pub fn new(text: Box<str>, root: GreenNode) -> Self {
        debug_assert_eq!(root.text_len(), TextSize::of(&*text));
        Self { text, root }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root_green(&self) -> &GreenNode {
        &self.root
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode { tree: self, green: &self.root, offset: TextSize::new(0), parent: None }
    }

    /// Debug rendering of the tree, one element per line. Nodes show
    /// their full range, tokens their range without leading trivia.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        dump_into(&mut out, &SyntaxElement::Node(self.root()), 0);
        out
    }
}

/// Red handle to a green node: a green reference plus an absolute
/// offset and a lazily built parent chain.
#[derive(Clone)]
pub struct SyntaxNode<'a> {
    tree: &'a SyntaxTree,
    green: &'a GreenNode,
    offset: TextSize,
    parent: Option<Rc<SyntaxNode<'a>>>,
}

pub type SyntaxElement<'a> = NodeOrToken<SyntaxNode<'a>, SyntaxToken<'a>>;

impl<'a> SyntaxNode<'a> {
    pub fn kind(&self) -> SyntaxKind {
        self.green.kind()
    }

    pub fn green(&self) -> &'a GreenNode {
        self.green
    }

    /// Full range of this node, leading trivia of its tokens included.
    pub fn range(&self) -> TextRange {
        TextRange::at(self.offset, self.green.text_len())
    }

    pub fn text(&self) -> &'a str {
        &self.tree.text[self.range()]
    }

    pub fn parent(&self) -> Option<&SyntaxNode<'a>> {
        self.parent.as_deref()
    }

    pub fn children(&self) -> impl Iterator<Item = SyntaxElement<'a>> + use<'a> {
        let parent = Rc::new(self.clone());
        let tree = self.tree;
        let mut offset = self.offset;
        self.green.children().iter().map(move |child| {
            let child_offset = offset;
            offset += child.text_len();
            match child {
                Green::Node(node) => SyntaxElement::Node(SyntaxNode {
                    tree,
                    green: node,
                    offset: child_offset,
                    parent: Some(parent.clone()),
                }),
                Green::Token(token) => SyntaxElement::Token(SyntaxToken {
                    tree,
                    green: *token,
                    offset: child_offset,
                    parent: parent.clone(),
                }),
            }
        })
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = SyntaxNode<'a>> + use<'a> {
        self.children().filter_map(|element| match element {
            SyntaxElement::Node(node) => Some(node),
            SyntaxElement::Token(_) => None,
        })
    }
}

/// Red handle to a token.
#[derive(Clone)]
pub struct SyntaxToken<'a> {
    tree: &'a SyntaxTree,
    green: GreenToken,
    offset: TextSize,
    #[allow(dead_code)]
    parent: Rc<SyntaxNode<'a>>,
}

impl<'a> SyntaxToken<'a> {
    pub fn kind(&self) -> SyntaxKind {
        self.green.kind
    }

    pub fn is_missing(&self) -> bool {
        self.green.missing
    }

    /// Full range including leading trivia.
    pub fn range(&self) -> TextRange {
        TextRange::at(self.offset, self.green.text_len)
    }

    /// Range of the token text proper, leading trivia excluded.
    pub fn trimmed_range(&self) -> TextRange {
        TextRange::new(self.offset + self.green.leading_len, self.range().end())
    }

    pub fn text(&self) -> &'a str {
        &self.tree.text[self.trimmed_range()]
    }
}

impl<'a> SyntaxElement<'a> {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            Self::Node(node) => node.kind(),
            Self::Token(token) => token.kind(),
        }
    }

    pub fn range(&self) -> TextRange {
        match self {
            Self::Node(node) => node.range(),
            Self::Token(token) => token.range(),
        }
    }
}

fn dump_into(out: &mut String, element: &SyntaxElement<'_>, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    match element {
        NodeOrToken::Node(node) => {
            writeln!(out, "{:?}@{:?}", node.kind(), node.range()).unwrap();
            for child in node.children() {
                dump_into(out, &child, depth + 1);
            }
        }
        NodeOrToken::Token(token) => {
            write!(out, "{:?}@{:?}", token.kind(), token.trimmed_range()).unwrap();
            if token.is_missing() {
                out.push_str(" (missing)");
            } else {
                write!(out, " {:?}", token.text()).unwrap();
            }
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: SyntaxKind, leading: u32, len: u32) -> Green {
        Green::Token(GreenToken::new(kind, TextSize::new(leading), TextSize::new(len)))
    }

    fn sample_tree() -> SyntaxTree {
        // "let x = 1;"
        let stmt = GreenNode::new(
            SyntaxKind::LET_STMT,
            vec![
                token(SyntaxKind::LET_KW, 0, 3),
                token(SyntaxKind::IDENT, 1, 2),
                token(SyntaxKind::EQ, 1, 2),
                token(SyntaxKind::INT, 1, 2),
                token(SyntaxKind::SEMICOLON, 0, 1),
            ],
        );
        let root = GreenNode::new(
            SyntaxKind::PROGRAM,
            vec![Green::Node(stmt), token(SyntaxKind::EOF, 0, 0)],
        );
        SyntaxTree::new("let x = 1;".into(), root)
    }

    #[test]
    fn ranges_and_text() {
        let tree = sample_tree();
        let root = tree.root();
        assert_eq!(root.range(), TextRange::new(0.into(), 10.into()));

        let stmt = root.child_nodes().next().unwrap();
        assert_eq!(stmt.kind(), SyntaxKind::LET_STMT);
        assert_eq!(stmt.text(), "let x = 1;");

        let tokens: Vec<_> = stmt
            .children()
            .filter_map(|element| match element {
                SyntaxElement::Token(token) => Some(token),
                SyntaxElement::Node(_) => None,
            })
            .collect();
        assert_eq!(tokens[1].text(), "x");
        assert_eq!(tokens[1].range(), TextRange::new(3.into(), 5.into()));
        assert_eq!(tokens[1].trimmed_range(), TextRange::new(4.into(), 5.into()));
    }

    #[test]
    fn parent_links() {
        let tree = sample_tree();
        let root = tree.root();
        let stmt = root.child_nodes().next().unwrap();
        assert_eq!(stmt.parent().unwrap().kind(), SyntaxKind::PROGRAM);
        assert!(root.parent().is_none());
    }

    #[test]
    fn dump_format() {
        let tree = sample_tree();
        expect_test::expect![[r#"
            PROGRAM@0..10
              LET_STMT@0..10
                LET_KW@0..3 "let"
                IDENT@4..5 "x"
                EQ@6..7 "="
                INT@8..9 "1"
                SEMICOLON@9..10 ";"
              EOF@10..10 ""
        "#]]
        .assert_eq(&tree.dump());
    }
}
