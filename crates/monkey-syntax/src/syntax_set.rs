use crate::SyntaxKind;

/// A compact set of terminal `SyntaxKind`s.
///
/// Terminal discriminants all fit in a `u64`, so membership is a single
/// bit test. Used for the per-state valid-token sets that drive
/// context-sensitive lexing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyntaxSet(u64);

const _: () = assert!(SyntaxKind::TERMINAL_COUNT <= u64::BITS as usize);

impl SyntaxSet {
    pub const EMPTY: Self = Self(0);

    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut index = 0;
        while index < kinds.len() {
            bits |= mask(kinds[index]);
            index += 1;
        }
        Self(bits)
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn with(self, kind: SyntaxKind) -> Self {
        Self(self.0 | mask(kind))
    }

    pub const fn contains(self, kind: SyntaxKind) -> bool {
        self.0 & mask(kind) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = SyntaxKind> {
        let bits = self.0;
        SyntaxKind::TERMINALS
            .into_iter()
            .filter(move |kind| bits & (1 << *kind as u64) != 0)
    }
}

const fn mask(kind: SyntaxKind) -> u64 {
    assert!(kind.is_terminal());
    1 << kind as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_and_union() {
        let stmt_starts = SyntaxSet::new(&[SyntaxKind::LET_KW, SyntaxKind::RETURN_KW]);
        assert!(stmt_starts.contains(SyntaxKind::LET_KW));
        assert!(!stmt_starts.contains(SyntaxKind::IDENT));

        let with_ident = stmt_starts.union(SyntaxSet::new(&[SyntaxKind::IDENT]));
        assert!(with_ident.contains(SyntaxKind::IDENT));
        assert!(with_ident.contains(SyntaxKind::RETURN_KW));
    }

    #[test]
    fn iter_yields_discriminant_order() {
        let set = SyntaxSet::new(&[SyntaxKind::IDENT, SyntaxKind::L_PAREN, SyntaxKind::EOF]);
        let kinds: Vec<_> = set.iter().collect();
        assert_eq!(kinds, [SyntaxKind::L_PAREN, SyntaxKind::IDENT, SyntaxKind::EOF]);
    }

    #[test]
    fn terminal_table_matches_discriminants() {
        for (index, kind) in SyntaxKind::TERMINALS.iter().enumerate() {
            assert_eq!(*kind as usize, index);
        }
    }
}
