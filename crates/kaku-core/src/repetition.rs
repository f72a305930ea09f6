//! Repetition classification over the game history.

use crate::position::Position;

/// How the current position relates to an earlier one with the same board,
/// seen from the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Repetition {
    /// No earlier position matches.
    #[default]
    None,
    /// Same board and hands: a plain repetition.
    Draw,
    /// The side to move wins: its hand grew since the earlier occurrence, or
    /// the opponent gave check with every move of the cycle.
    Win,
    /// The side to move loses: its hand shrank, or it gave check with every
    /// move of the cycle.
    Lose,
}

impl Position {
    /// Classify the current position against the game history.
    ///
    /// Only positions with the same side to move are compared, and the walk
    /// stops at the first null move since lines through a pass are not real
    /// game continuations. A single earlier occurrence is enough.
    pub fn repetition(&self) -> Repetition {
        let us = self.turn.index();
        let them = (!self.turn).index();
        let n = self.history.len();

        let mut opponent_always_checked = true;
        let mut we_always_checked = true;

        for back in 1..=n {
            let state = &self.history[n - back];
            if state.null {
                break;
            }
            // Odd distances are moves by the side that just moved.
            if back % 2 == 1 {
                opponent_always_checked &= state.gives_check;
            } else {
                we_always_checked &= state.gives_check;
            }
            if back % 2 == 1 || state.board_hash != self.board_hash {
                continue;
            }

            let ours_now = self.hands[us];
            let ours_then = state.hands[us];
            if ours_now == ours_then && self.hands[them] == state.hands[them] {
                if opponent_always_checked {
                    return Repetition::Win;
                }
                if we_always_checked {
                    return Repetition::Lose;
                }
                return Repetition::Draw;
            }
            if ours_now.dominates(ours_then) {
                return Repetition::Win;
            }
            if ours_then.dominates(ours_now) {
                return Repetition::Lose;
            }
        }
        Repetition::None
    }
}

#[cfg(test)]
mod tests {
    use super::Repetition;
    use crate::position::Position;

    fn play(pos: &mut Position, moves: &[&str]) {
        for mv in moves {
            pos.play_usi(mv).unwrap();
        }
    }

    #[test]
    fn fresh_position_has_no_repetition() {
        assert_eq!(Position::starting_position().repetition(), Repetition::None);
    }

    #[test]
    fn shuffling_kings_is_a_draw() {
        let mut pos: Position = "4k/5/5/5/K4 b - 1".parse().unwrap();
        play(&mut pos, &["5e4e", "1a2a", "4e5e"]);
        assert_eq!(pos.repetition(), Repetition::None);
        play(&mut pos, &["2a1a"]);
        assert_eq!(pos.repetition(), Repetition::Draw);
    }

    #[test]
    fn perpetual_check_loses_for_the_checker() {
        // The black rook checks from files 1 and 2 while the white king
        // steps between 1a and 2a.
        let mut pos: Position = "4k/5/5/3R1/K4 b - 1".parse().unwrap();
        play(&mut pos, &["2d1d", "1a2a", "1d2d", "2a1a"]);
        assert_eq!(pos.repetition(), Repetition::Lose);
    }

    #[test]
    fn losing_material_on_same_board_is_inferior() {
        // White drops a pawn that the black king eats, then both kings walk
        // back home. White is to move with a smaller hand than before.
        let mut pos: Position = "4k/5/5/5/K4 w p 1".parse().unwrap();
        play(
            &mut pos,
            &["P*4d", "5e4d", "1a2a", "4d5e", "2a2b", "5e4e", "2b1a", "4e5e"],
        );
        assert_eq!(pos.repetition(), Repetition::Lose);
    }

    #[test]
    fn null_move_stops_the_walk() {
        let mut pos: Position = "4k/5/5/5/K4 b - 1".parse().unwrap();
        play(&mut pos, &["5e4e", "1a2a", "4e5e", "2a1a"]);
        assert_eq!(pos.repetition(), Repetition::Draw);
        pos.do_null_move();
        pos.do_null_move();
        assert_eq!(pos.repetition(), Repetition::None);
    }
}
