//! Move execution via make/unmake, with legality confirmation.

use crate::attacks::{between, bishop_attacks, piece_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::error::IllegalMove;
use crate::movegen::{MoveList, generate_evasions};
use crate::moves::Move;
use crate::piece::Piece;
use crate::piece_kind::PieceKind;
use crate::position::{CheckState, Position, StateInfo};
use crate::zobrist;

impl Position {
    /// Return `true` if `mv` matches the pieces on the board and in hand and
    /// obeys the movement, promotion and drop rules. Self-check and
    /// pawn-drop mate are not examined.
    pub fn is_pseudo_legal(&self, mv: Move) -> bool {
        if mv.is_empty() {
            return false;
        }
        let us = self.turn;
        let to = mv.to();
        if self.side(us).contains(to) || to == self.king_square(!us) {
            return false;
        }

        match (mv.from(), mv.drop_kind()) {
            (Some(from), _) => {
                let Some(piece) = self.piece_on(from) else {
                    return false;
                };
                if piece.color() != us || !piece_attacks(piece, from, self.occupied()).contains(to) {
                    return false;
                }
                let kind = piece.kind();
                if mv.is_promotion() {
                    kind.promote().is_some()
                        && (from.is_promotion_zone(us) || to.is_promotion_zone(us))
                } else {
                    !(kind == PieceKind::Pawn && to.is_promotion_zone(us))
                }
            }
            (None, Some(kind)) => {
                if !kind.is_hand_kind() || !self.hand(us).has(kind) || self.piece_on(to).is_some() {
                    return false;
                }
                if mv.is_promotion() {
                    return false;
                }
                kind != PieceKind::Pawn
                    || (!to.is_promotion_zone(us)
                        && (self.pieces(us, PieceKind::Pawn) & Bitboard::column_mask(to.column()))
                            .is_empty())
            }
            (None, None) => false,
        }
    }

    /// Cheap legality pre-filter for moves that did not come from the move
    /// generator (hash moves, killers).
    ///
    /// A `true` answer still needs confirmation by [`do_move`](Self::do_move).
    pub fn is_legal_move_maybe(&self, mv: Move, check: CheckState) -> bool {
        if !self.is_pseudo_legal(mv) {
            return false;
        }
        if !check.is_check() {
            return true;
        }
        let king = self.king_square(self.turn);
        if mv.from() == Some(king) {
            return true;
        }
        if check.is_double_check() {
            return false;
        }
        match check.checkers().lsb() {
            Some(checker) => (between(king, checker) | check.checkers()).contains(mv.to()),
            None => true,
        }
    }

    /// Play `mv`, returning the captured piece.
    ///
    /// Moves that are not playable, leave the mover's king attacked or mate
    /// with a dropped pawn are rejected and the position is left untouched.
    pub fn do_move(&mut self, mv: Move) -> Result<Option<Piece>, IllegalMove> {
        if !self.is_pseudo_legal(mv) {
            return Err(IllegalMove::NotPseudoLegal(mv));
        }
        let mover = self.turn;
        let captured = self.apply(mv);

        if self.is_attacked(self.king_square(mover), self.turn) {
            self.undo_move(mv, captured);
            return Err(IllegalMove::SelfCheck(mv));
        }

        self.checkers = self.attackers_to(self.king_square(self.turn), mover, self.occupied());
        let gives_check = self.checkers.is_nonempty();
        if let Some(state) = self.history.last_mut() {
            state.gives_check = gives_check;
        }

        if gives_check && mv.drop_kind() == Some(PieceKind::Pawn) && !self.has_legal_move() {
            self.undo_move(mv, captured);
            return Err(IllegalMove::PawnDropMate(mv));
        }
        Ok(captured)
    }

    fn apply(&mut self, mv: Move) -> Option<Piece> {
        self.history.push(StateInfo {
            board_hash: self.board_hash,
            hand_hash: self.hand_hash,
            hands: self.hands,
            checkers: self.checkers,
            gives_check: false,
            null: false,
        });

        let us = self.turn;
        let to = mv.to();
        let mut captured = None;
        match (mv.from(), mv.drop_kind()) {
            (Some(from), _) => {
                if let Some(piece) = self.piece_on(from) {
                    captured = self.piece_on(to);
                    if let Some(cap) = captured {
                        self.remove_piece(to, cap);
                        self.hand_add(us, cap.kind());
                    }
                    self.remove_piece(from, piece);
                    let placed = match mv.is_promotion() {
                        true => piece.promote().unwrap_or(piece),
                        false => piece,
                    };
                    self.put_piece(to, placed);
                    if placed.kind() == PieceKind::King {
                        self.kings[us.index()] = to;
                    }
                }
            }
            (None, Some(kind)) => {
                self.hand_remove(us, kind);
                self.put_piece(to, Piece::new(kind, us));
            }
            (None, None) => {}
        }

        self.turn = !us;
        self.board_hash ^= zobrist::white_to_move();
        self.checkers = Bitboard::EMPTY;
        captured
    }

    /// Take back `mv`, which must be the last move played.
    pub fn undo_move(&mut self, mv: Move, captured: Option<Piece>) {
        let Some(state) = self.history.pop() else {
            debug_assert!(false, "undo_move without history");
            return;
        };
        debug_assert!(!state.null);

        self.turn = !self.turn;
        let us = self.turn;
        let to = mv.to();
        match (mv.from(), mv.drop_kind()) {
            (Some(from), _) => {
                if let Some(placed) = self.piece_on(to) {
                    self.remove_piece(to, placed);
                    let original = match mv.is_promotion() {
                        true => Piece::new(placed.kind().unpromote(), us),
                        false => placed,
                    };
                    self.put_piece(from, original);
                    if original.kind() == PieceKind::King {
                        self.kings[us.index()] = from;
                    }
                }
                if let Some(cap) = captured {
                    self.put_piece(to, cap);
                }
            }
            (None, Some(kind)) => {
                self.remove_piece(to, Piece::new(kind, us));
            }
            (None, None) => {}
        }

        self.board_hash = state.board_hash;
        self.hand_hash = state.hand_hash;
        self.hands = state.hands;
        self.checkers = state.checkers;
    }

    /// Pass the turn. Only meaningful when the side to move is not in check.
    pub fn do_null_move(&mut self) {
        debug_assert!(!self.in_check());
        self.history.push(StateInfo {
            board_hash: self.board_hash,
            hand_hash: self.hand_hash,
            hands: self.hands,
            checkers: self.checkers,
            gives_check: false,
            null: true,
        });
        self.turn = !self.turn;
        self.board_hash ^= zobrist::white_to_move();
        self.checkers = Bitboard::EMPTY;
    }

    /// Take back a null move.
    pub fn undo_null_move(&mut self) {
        let Some(state) = self.history.pop() else {
            debug_assert!(false, "undo_null_move without history");
            return;
        };
        debug_assert!(state.null);
        self.turn = !self.turn;
        self.board_hash = state.board_hash;
        self.checkers = state.checkers;
    }

    /// Return `true` if `mv` would give check, directly or by discovery.
    ///
    /// `mv` must be pseudo-legal in this position.
    pub fn is_check(&self, mv: Move) -> bool {
        let us = self.turn;
        let king = self.king_square(!us);
        let to = mv.to();

        match (mv.from(), mv.drop_kind()) {
            (Some(from), _) => {
                let Some(piece) = self.piece_on(from) else {
                    return false;
                };
                let placed = match mv.is_promotion() {
                    true => piece.promote().unwrap_or(piece),
                    false => piece,
                };
                let occupied = self.occupied().without(from).with(to);
                if piece_attacks(placed, to, occupied).contains(king) {
                    return true;
                }
                let ours = self.side(us).without(from);
                let diagonal = (self.pieces(us, PieceKind::Bishop) | self.pieces(us, PieceKind::Horse)) & ours;
                let orthogonal = (self.pieces(us, PieceKind::Rook) | self.pieces(us, PieceKind::Dragon)) & ours;
                (bishop_attacks(king, occupied) & diagonal).is_nonempty()
                    || (rook_attacks(king, occupied) & orthogonal).is_nonempty()
            }
            (None, Some(kind)) => {
                piece_attacks(Piece::new(kind, us), to, self.occupied().with(to)).contains(king)
            }
            (None, None) => false,
        }
    }

    /// Return `true` if the side to move, which must be in check, has at
    /// least one legal reply.
    ///
    /// Only evasions are generated, so the answer is meaningless when the
    /// side to move is not in check.
    pub fn has_legal_move(&mut self) -> bool {
        let mut list = MoveList::new();
        generate_evasions(self, self.check_state(), &mut list);
        for &mv in list.as_slice() {
            if let Ok(captured) = self.do_move(mv) {
                self.undo_move(mv, captured);
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use crate::color::Color;
    use crate::error::IllegalMove;
    use crate::moves::Move;
    use crate::piece::Piece;
    use crate::piece_kind::PieceKind;
    use crate::position::Position;
    use crate::square::Square;

    fn pos(sfen: &str) -> Position {
        sfen.parse().unwrap()
    }

    #[test]
    fn do_undo_restores_everything() {
        let mut p = Position::starting_position();
        let hash = p.hash();
        let mv = Move::new(Square::SQ_1E, Square::SQ_1B, false);
        let captured = p.do_move(mv).unwrap();
        assert_eq!(captured, Some(Piece::new(PieceKind::Pawn, Color::White)));
        assert_eq!(p.hand(Color::Black).count(PieceKind::Pawn), 1);
        assert_eq!(p.turn(), Color::White);
        p.undo_move(mv, captured);
        assert_eq!(p.hash(), hash);
        assert_eq!(p.hand(Color::Black).count(PieceKind::Pawn), 0);
        assert_eq!(p.to_string(), crate::position::STARTING_SFEN);
    }

    #[test]
    fn promotion_and_demotion() {
        let mut p = pos("4k/R4/5/5/K4 b - 1");
        let mv = Move::new(Square::SQ_5B, Square::SQ_5A, true);
        let captured = p.do_move(mv).unwrap();
        assert_eq!(
            p.piece_on(Square::SQ_5A),
            Some(Piece::new(PieceKind::Dragon, Color::Black))
        );
        p.undo_move(mv, captured);
        assert_eq!(
            p.piece_on(Square::SQ_5B),
            Some(Piece::new(PieceKind::Rook, Color::Black))
        );
    }

    #[test]
    fn self_check_is_rejected_and_position_untouched() {
        // Black gold on 5d is pinned by the white rook on 5a.
        let mut p = pos("r3k/5/5/G4/K4 b - 1");
        let before = p.hash();
        let mv = Move::new(Square::SQ_5D, Square::SQ_4D, false);
        assert_eq!(p.do_move(mv), Err(IllegalMove::SelfCheck(mv)));
        assert_eq!(p.hash(), before);
        assert_eq!(p.turn(), Color::Black);
    }

    #[test]
    fn pawn_drop_mate_is_rejected() {
        // White king on 1a boxed in by its own rook, 1b covered by the gold on 2c.
        let mut p = pos("3rk/5/3G1/5/K4 b P 1");
        let mv = Move::new_drop(PieceKind::Pawn, Square::SQ_1B);
        assert_eq!(p.do_move(mv), Err(IllegalMove::PawnDropMate(mv)));
        assert_eq!(p.hand(Color::Black).count(PieceKind::Pawn), 1);
    }

    #[test]
    fn pawn_drop_check_with_escape_is_fine() {
        let mut p = pos("4k/5/5/5/K4 b P 1");
        let mv = Move::new_drop(PieceKind::Pawn, Square::SQ_1B);
        assert!(p.do_move(mv).is_ok());
        assert!(p.in_check());
    }

    #[test]
    fn two_pawns_on_a_file_is_not_pseudo_legal() {
        let p = pos("4k/5/5/4P/K4 b P 1");
        assert!(!p.is_pseudo_legal(Move::new_drop(PieceKind::Pawn, Square::SQ_1C)));
        assert!(p.is_pseudo_legal(Move::new_drop(PieceKind::Pawn, Square::SQ_2C)));
        assert!(!p.is_pseudo_legal(Move::new_drop(PieceKind::Pawn, Square::SQ_2A)));
    }

    #[test]
    fn is_check_detects_direct_and_discovered() {
        // Rook on 5e behind a silver on 5c, white king on 5a.
        let p = pos("k4/5/S4/5/R3K b - 1");
        let discovered = Move::new(Square::SQ_5C, Square::SQ_4D, false);
        assert!(p.is_check(discovered));
        let direct = Move::new(Square::SQ_5C, Square::SQ_4B, false);
        assert!(p.is_check(direct));
        let king_step = Move::new(Square::SQ_1E, Square::SQ_2D, false);
        assert!(!p.is_check(king_step));
        let quiet = Move::new(Square::SQ_1E, Square::SQ_1D, false);
        assert!(!p.is_check(quiet));
    }

    #[test]
    fn null_move_roundtrip() {
        let mut p = Position::starting_position();
        let hash = p.hash();
        p.do_null_move();
        assert_eq!(p.turn(), Color::White);
        assert_ne!(p.hash(), hash);
        p.undo_null_move();
        assert_eq!(p.hash(), hash);
        assert_eq!(p.turn(), Color::Black);
    }

    #[test]
    fn legal_move_maybe_filters_non_evasions() {
        // Black king on 5e checked by a white rook on 5a.
        let p = pos("r3k/5/5/5/K3G b - 1");
        let check = p.check_state();
        assert!(check.is_check());
        let block = Move::new(Square::SQ_1E, Square::SQ_2E, false);
        assert!(!p.is_legal_move_maybe(block, check));
        let step = Move::new(Square::SQ_5E, Square::SQ_4E, false);
        assert!(p.is_legal_move_maybe(step, check));
    }
}
