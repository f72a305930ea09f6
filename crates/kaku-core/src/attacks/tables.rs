//! Precomputed step attack tables and geometric ray tables.

use crate::bitboard::Bitboard;

const SIZE: i8 = 5;
const SQUARES: usize = 25;

// (column delta, rank delta) as seen by Black; rank delta -1 is forward.
const PAWN_DELTAS: [(i8, i8); 1] = [(0, -1)];
const SILVER_DELTAS: [(i8, i8); 5] = [(-1, -1), (0, -1), (1, -1), (-1, 1), (1, 1)];
const GOLD_DELTAS: [(i8, i8); 6] = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (0, 1)];
const KING_DELTAS: [(i8, i8); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

const fn signum(x: i8) -> i8 {
    if x > 0 {
        1
    } else if x < 0 {
        -1
    } else {
        0
    }
}

/// Step targets for one color. White mirrors the rank deltas.
const fn compute_steps(deltas: &[(i8, i8)], white: bool) -> [Bitboard; SQUARES] {
    let mut table = [Bitboard::EMPTY; SQUARES];
    let mut sq = 0usize;
    while sq < SQUARES {
        let rank = (sq / 5) as i8;
        let col = (sq % 5) as i8;
        let mut bits = 0u32;
        let mut d = 0;
        while d < deltas.len() {
            let dr = if white { -deltas[d].1 } else { deltas[d].1 };
            let r = rank + dr;
            let c = col + deltas[d].0;
            if r >= 0 && r < SIZE && c >= 0 && c < SIZE {
                bits |= 1u32 << (r as usize * 5 + c as usize);
            }
            d += 1;
        }
        table[sq] = Bitboard::new(bits);
        sq += 1;
    }
    table
}

const fn compute_between() -> [[Bitboard; SQUARES]; SQUARES] {
    let mut table = [[Bitboard::EMPTY; SQUARES]; SQUARES];
    let mut s1 = 0usize;
    while s1 < SQUARES {
        let mut s2 = 0usize;
        while s2 < SQUARES {
            if s1 != s2 {
                let r1 = (s1 / 5) as i8;
                let c1 = (s1 % 5) as i8;
                let r2 = (s2 / 5) as i8;
                let c2 = (s2 % 5) as i8;
                let raw_dr = r2 - r1;
                let raw_dc = c2 - c1;
                let dr_abs = if raw_dr < 0 { -raw_dr } else { raw_dr };
                let dc_abs = if raw_dc < 0 { -raw_dc } else { raw_dc };
                if raw_dr == 0 || raw_dc == 0 || dr_abs == dc_abs {
                    let dr = signum(raw_dr);
                    let dc = signum(raw_dc);
                    let mut bits = 0u32;
                    let mut r = r1 + dr;
                    let mut c = c1 + dc;
                    while r != r2 || c != c2 {
                        bits |= 1u32 << (r as usize * 5 + c as usize);
                        r += dr;
                        c += dc;
                    }
                    table[s1][s2] = Bitboard::new(bits);
                }
            }
            s2 += 1;
        }
        s1 += 1;
    }
    table
}

pub(crate) static PAWN_ATTACKS: [[Bitboard; SQUARES]; 2] =
    [compute_steps(&PAWN_DELTAS, false), compute_steps(&PAWN_DELTAS, true)];
pub(crate) static SILVER_ATTACKS: [[Bitboard; SQUARES]; 2] =
    [compute_steps(&SILVER_DELTAS, false), compute_steps(&SILVER_DELTAS, true)];
pub(crate) static GOLD_ATTACKS: [[Bitboard; SQUARES]; 2] =
    [compute_steps(&GOLD_DELTAS, false), compute_steps(&GOLD_DELTAS, true)];
pub(crate) static KING_ATTACKS: [Bitboard; SQUARES] = compute_steps(&KING_DELTAS, false);
pub(crate) static BETWEEN: [[Bitboard; SQUARES]; SQUARES] = compute_between();
