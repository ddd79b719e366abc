//! Edit descriptions and reuse-candidate selection.
//!
//! Edits are expressed in old-text coordinates. Validation is strict:
//! a malformed edit list is an API misuse and is rejected with an
//! `EditError` rather than patched over, since a silently wrong edit
//! list would desynchronise the reused subtrees from the new text.

use std::fmt;

use monkey_syntax::{Green, GreenNode, SyntaxElement, SyntaxKind, SyntaxTree};
use text_size::TextSize;

/// A single contiguous text replacement: `old_len` bytes at `start`
/// (old coordinates) were replaced by `new_len` bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edit {
    pub start: TextSize,
    pub old_len: TextSize,
    pub new_len: TextSize,
}

impl Edit {
    pub fn replace(start: TextSize, old_len: TextSize, new_len: TextSize) -> Self {
        Self { start, old_len, new_len }
    }

    pub fn insert(start: TextSize, new_len: TextSize) -> Self {
        Self { start, old_len: TextSize::new(0), new_len }
    }

    pub fn delete(start: TextSize, old_len: TextSize) -> Self {
        Self { start, old_len, new_len: TextSize::new(0) }
    }

    fn old_end(&self) -> TextSize {
        self.start + self.old_len
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditError {
    /// Edits must be ordered by ascending `start`.
    Unsorted,
    /// Old ranges of two edits overlap.
    Overlapping,
    /// An old range extends past the end of the old text.
    OutOfBounds,
    /// Applying the edits to the old length does not give the length
    /// of `new_text`.
    LengthMismatch { expected: TextSize, actual: TextSize },
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsorted => f.write_str("edits are not sorted by start offset"),
            Self::Overlapping => f.write_str("edits have overlapping old ranges"),
            Self::OutOfBounds => f.write_str("edit range lies outside the old text"),
            Self::LengthMismatch { expected, actual } => write!(
                f,
                "edits produce a text of length {} but new text has length {}",
                u32::from(*expected),
                u32::from(*actual)
            ),
        }
    }
}

impl std::error::Error for EditError {}

pub(crate) fn validate(
    edits: &[Edit],
    old_len: TextSize,
    new_len: TextSize,
) -> Result<(), EditError> {
    let mut previous_start = TextSize::new(0);
    let mut previous_end = TextSize::new(0);
    let mut expected = u64::from(u32::from(old_len));

    for (index, edit) in edits.iter().enumerate() {
        if index > 0 {
            if edit.start < previous_start {
                return Err(EditError::Unsorted);
            }
            if edit.start < previous_end {
                return Err(EditError::Overlapping);
            }
        }
        if edit.old_end() > old_len {
            return Err(EditError::OutOfBounds);
        }
        expected = expected - u64::from(u32::from(edit.old_len)) + u64::from(u32::from(edit.new_len));
        previous_start = edit.start;
        previous_end = edit.old_end();
    }

    if expected != u64::from(u32::from(new_len)) {
        let expected = TextSize::new(expected.min(u64::from(u32::MAX)) as u32);
        return Err(EditError::LengthMismatch { expected, actual: new_len });
    }
    Ok(())
}

/// A top-level statement of the previous tree that may be spliced into
/// the new parse when the parser reaches `new_start` in a state with a
/// statement goto.
pub(crate) struct ReuseCandidate {
    pub(crate) green: GreenNode,
    pub(crate) new_start: TextSize,
}

/// Selects reusable top-level statements. A statement qualifies when it
/// parsed cleanly and no edit touches its extent extended by one token
/// of lookahead: the statement's closing reduces were decided against
/// the kind of the following token, so that token's bytes must be
/// intact too. The test is closed on both ends, which drops statements
/// adjacent to pure insertions; re-parsing those is a performance loss,
/// never a correctness one.
pub(crate) fn reuse_candidates(tree: &SyntaxTree, edits: &[Edit]) -> Vec<ReuseCandidate> {
    let root = tree.root();
    let elements: Vec<SyntaxElement<'_>> = root.children().collect();

    let mut candidates = Vec::new();
    for (index, element) in elements.iter().enumerate() {
        let SyntaxElement::Node(node) = element else { continue };
        let green = node.green();
        if green.kind() == SyntaxKind::ERROR || green.has_error() || green.has_missing() {
            continue;
        }

        let start = node.range().start();
        let extended_end = match elements.get(index + 1) {
            Some(next) => next.range().start() + first_token_len(next),
            None => node.range().end(),
        };

        let touched = edits
            .iter()
            .any(|edit| edit.start <= extended_end && edit.old_end() >= start);
        if touched {
            continue;
        }

        let mut shift = 0i64;
        for edit in edits {
            if edit.old_end() <= start {
                shift += i64::from(u32::from(edit.new_len)) - i64::from(u32::from(edit.old_len));
            }
        }
        let new_start = i64::from(u32::from(start)) + shift;
        debug_assert!(new_start >= 0);

        candidates.push(ReuseCandidate {
            green: green.clone(),
            new_start: TextSize::new(new_start as u32),
        });
    }
    candidates
}

/// Full extent of the first token in the element, leading trivia
/// included.
fn first_token_len(element: &SyntaxElement<'_>) -> TextSize {
    match element {
        SyntaxElement::Token(token) => token.range().len(),
        SyntaxElement::Node(node) => {
            let mut green = node.green();
            loop {
                match green.children().first() {
                    Some(Green::Node(child)) => green = child,
                    Some(Green::Token(token)) => return token.text_len,
                    None => return TextSize::new(0),
                }
            }
        }
    }
}
