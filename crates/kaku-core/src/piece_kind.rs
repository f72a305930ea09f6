//! Minishogi piece kinds, including promoted forms.

use std::fmt;

/// The kind of a piece, without color information.
///
/// The first five kinds are the ones that can be held in hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 0,
    Silver = 1,
    Gold = 2,
    Bishop = 3,
    Rook = 4,
    King = 5,
    Tokin = 6,
    ProSilver = 7,
    Horse = 8,
    Dragon = 9,
}

impl PieceKind {
    /// Total number of piece kinds.
    pub const COUNT: usize = 10;

    /// All piece kinds in index order.
    pub const ALL: [PieceKind; 10] = [
        PieceKind::Pawn,
        PieceKind::Silver,
        PieceKind::Gold,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::King,
        PieceKind::Tokin,
        PieceKind::ProSilver,
        PieceKind::Horse,
        PieceKind::Dragon,
    ];

    /// Kinds that may be held in hand and dropped.
    pub const HAND: [PieceKind; 5] = [
        PieceKind::Pawn,
        PieceKind::Silver,
        PieceKind::Gold,
        PieceKind::Bishop,
        PieceKind::Rook,
    ];

    /// Return the index (0..10).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Build a kind from its index.
    #[inline]
    pub const fn from_index(index: usize) -> Option<PieceKind> {
        if index < Self::COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Return `true` for kinds that can sit in a hand.
    #[inline]
    pub const fn is_hand_kind(self) -> bool {
        (self as u8) < 5
    }

    /// Return the promoted form, or `None` if the kind cannot promote.
    #[inline]
    pub const fn promote(self) -> Option<PieceKind> {
        match self {
            PieceKind::Pawn => Some(PieceKind::Tokin),
            PieceKind::Silver => Some(PieceKind::ProSilver),
            PieceKind::Bishop => Some(PieceKind::Horse),
            PieceKind::Rook => Some(PieceKind::Dragon),
            _ => None,
        }
    }

    /// Return the unpromoted form. A captured piece goes to hand in this form.
    #[inline]
    pub const fn unpromote(self) -> PieceKind {
        match self {
            PieceKind::Tokin => PieceKind::Pawn,
            PieceKind::ProSilver => PieceKind::Silver,
            PieceKind::Horse => PieceKind::Bishop,
            PieceKind::Dragon => PieceKind::Rook,
            other => other,
        }
    }

    /// Return `true` if this is a promoted kind.
    #[inline]
    pub const fn is_promoted(self) -> bool {
        (self as u8) >= 6
    }

    /// Return `true` for kinds that move along rays.
    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(
            self,
            PieceKind::Bishop | PieceKind::Rook | PieceKind::Horse | PieceKind::Dragon
        )
    }

    /// Return the SFEN letter of the unpromoted form (lowercase).
    #[inline]
    pub const fn sfen_char(self) -> char {
        match self.unpromote() {
            PieceKind::Pawn => 'p',
            PieceKind::Silver => 's',
            PieceKind::Gold => 'g',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            _ => 'k',
        }
    }

    /// Parse an SFEN letter (case-insensitive) into an unpromoted kind.
    pub fn from_sfen_char(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            's' => Some(PieceKind::Silver),
            'g' => Some(PieceKind::Gold),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_promoted() {
            write!(f, "+")?;
        }
        write!(f, "{}", self.sfen_char())
    }
}

#[cfg(test)]
mod tests {
    use super::PieceKind;

    #[test]
    fn promote_and_unpromote_are_inverse() {
        for kind in PieceKind::ALL {
            if let Some(promoted) = kind.promote() {
                assert!(promoted.is_promoted());
                assert_eq!(promoted.unpromote(), kind);
            }
        }
        assert_eq!(PieceKind::Gold.promote(), None);
        assert_eq!(PieceKind::King.promote(), None);
        assert_eq!(PieceKind::Dragon.promote(), None);
    }

    #[test]
    fn hand_kinds_are_first_five() {
        for kind in PieceKind::HAND {
            assert!(kind.is_hand_kind());
        }
        assert!(!PieceKind::King.is_hand_kind());
        assert!(!PieceKind::Tokin.is_hand_kind());
    }

    #[test]
    fn sfen_letters() {
        for kind in PieceKind::ALL.into_iter().filter(|k| !k.is_promoted()) {
            assert_eq!(PieceKind::from_sfen_char(kind.sfen_char()), Some(kind));
        }
        assert_eq!(PieceKind::Horse.to_string(), "+b");
        assert_eq!(PieceKind::from_sfen_char('n'), None);
    }

    #[test]
    fn from_index_matches_all() {
        for (i, kind) in PieceKind::ALL.into_iter().enumerate() {
            assert_eq!(PieceKind::from_index(i), Some(kind));
        }
        assert_eq!(PieceKind::from_index(10), None);
    }
}
