//! Zobrist hashing keys.
//!
//! The position hash is split in two halves that are XORed together: a board
//! half (pieces and side to move) and a hand half. Repetition detection
//! compares board halves and then inspects hands directly.
//!
//! The low 32 bits of every White key equal those of the matching Black key
//! on the rotated square, and the side-to-move key has none of them set.

use crate::color::Color;
use crate::piece::Piece;
use crate::piece_kind::PieceKind;
use crate::square::Square;

/// Highest hand count per kind the key table supports.
pub(crate) const MAX_HAND_COUNT: usize = 2;

const PIECE_SQUARE_KEYS: usize = Piece::COUNT * Square::COUNT;
const HAND_KEYS: usize = Color::COUNT * 5 * (MAX_HAND_COUNT + 1);

const SEED: u64 = 0x4b41_4b55_5348_4f47; // "KAKUSHOG"

/// Xorshift64 PRNG. Returns (value, next_state).
const fn xorshift64(mut state: u64) -> (u64, u64) {
    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;
    (state, state)
}

const fn generate_keys<const N: usize>(skip: usize) -> [u64; N] {
    let mut state = SEED;
    let mut i = 0;
    while i < skip {
        let (_, next) = xorshift64(state);
        state = next;
        i += 1;
    }
    let mut table = [0u64; N];
    let mut idx = 0;
    while idx < N {
        let (val, next) = xorshift64(state);
        table[idx] = val;
        state = next;
        idx += 1;
    }
    table
}

/// Bits shared between a key and its colour mirror. They hold the table
/// index, so a position and its colour-flipped twin land on the same slot.
const MIRRORED_BITS: u64 = 0xFFFF_FFFF;

/// Copy the mirrored bits of Black's keys (the first half of `table`) into
/// White's. With `flip_squares`, each half is laid out as kind-major rows of
/// [`Square::COUNT`] keys and the square is rotated.
const fn mirror_halves<const N: usize>(mut table: [u64; N], flip_squares: bool) -> [u64; N] {
    let half = N / 2;
    let mut i = 0;
    while i < half {
        let mirror = match flip_squares {
            true => {
                let sq = i % Square::COUNT;
                i - sq + (Square::COUNT - 1 - sq)
            }
            false => i,
        };
        let white = half + mirror;
        table[white] = (table[white] & !MIRRORED_BITS) | (table[i] & MIRRORED_BITS);
        i += 1;
    }
    table
}

static PIECE_SQUARE: [u64; PIECE_SQUARE_KEYS] = mirror_halves(generate_keys(0), true);
static HAND: [u64; HAND_KEYS] = mirror_halves(generate_keys(PIECE_SQUARE_KEYS), false);
static TURN: [u64; 1] = [generate_keys::<1>(PIECE_SQUARE_KEYS + HAND_KEYS)[0] & !MIRRORED_BITS];

/// Key for `piece` standing on `sq`.
#[inline]
pub(crate) fn piece_square(piece: Piece, sq: Square) -> u64 {
    PIECE_SQUARE[piece.index() * Square::COUNT + sq.index()]
}

/// Key for `color` holding exactly `count` pieces of the hand kind `kind`.
#[inline]
pub(crate) fn hand(color: Color, kind: PieceKind, count: u8) -> u64 {
    let count = (count as usize).min(MAX_HAND_COUNT);
    HAND[(color.index() * 5 + kind.index()) * (MAX_HAND_COUNT + 1) + count]
}

/// Key XORed into the board half when White is to move.
#[inline]
pub(crate) fn white_to_move() -> u64 {
    TURN[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_keys_are_unique() {
        let mut all_keys: Vec<u64> = PIECE_SQUARE.iter().chain(HAND.iter()).copied().collect();
        all_keys.push(white_to_move());
        let count = all_keys.len();
        all_keys.sort_unstable();
        all_keys.dedup();
        assert_eq!(all_keys.len(), count, "some Zobrist keys collide");
    }

    #[test]
    fn white_keys_mirror_black_in_the_low_half() {
        for kind in PieceKind::ALL {
            let piece = Piece::new(kind, Color::Black);
            for sq in Square::all() {
                let black = piece_square(piece, sq);
                let white = piece_square(piece.flip(), sq.flip());
                assert_eq!(black & MIRRORED_BITS, white & MIRRORED_BITS);
                assert_ne!(black, white);
            }
        }
        assert_eq!(white_to_move() & MIRRORED_BITS, 0);
        assert_ne!(white_to_move(), 0);
    }

    #[test]
    fn no_zero_keys() {
        assert!(PIECE_SQUARE.iter().all(|&k| k != 0));
        assert!(HAND.iter().all(|&k| k != 0));
    }
}
