//! Root move preparation, aspiration search and PV re-storage.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::warn;

use kaku_core::{generate_capturing_moves, generate_evasions, generate_not_capturing_moves};

use super::ONE_PLY;
use super::handler::{PvReport, SearchHandler};
use super::negamax::{SearchContext, quies, search};
use super::node_stat::NodeStat;
use super::ordering::sort_best_first;
use super::tree::Pv;
use super::tt::Bound;
use crate::eval::Score;

#[inline]
fn to_ext(score: Score) -> i16 {
    score.raw().clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[inline]
fn ext_score(ext: i16) -> Score {
    Score::new(ext as i32)
}

fn report<'a>(ctx: &'a SearchContext<'_>, depth: i32, score: Score) -> PvReport<'a> {
    PvReport {
        pv: ctx.tree.node().pv(),
        elapsed: ctx.control.elapsed(),
        depth: depth / ONE_PLY,
        score,
        info: ctx.tree.info(),
    }
}

/// Generate the root moves, drop the illegal ones and order them by a
/// quiescence score, refined by whatever the TT knows about each child.
///
/// With `rng`, moves are shuffled first so that equal scores vary.
/// Without it, ties are broken the same way for both colours.
pub(crate) fn generate_moves(ctx: &mut SearchContext<'_>, rng: Option<&mut StdRng>) {
    let shuffled = rng.is_some();
    let stand_pat = ctx.evaluator.evaluate(ctx.tree.position());
    {
        let (pos, node) = ctx.tree.position_and_node();
        let check = pos.check_state();
        node.moves.clear();
        node.check = check;
        node.stand_pat = stand_pat;
        if check.is_check() {
            generate_evasions(pos, check, &mut node.moves);
        } else {
            generate_capturing_moves(pos, &mut node.moves);
            generate_not_capturing_moves(pos, &mut node.moves);
        }
        if let Some(rng) = rng {
            node.moves.as_mut_slice().shuffle(rng);
        }
    }

    let mut i = 0;
    while i < ctx.tree.node().moves.len() {
        let mv = ctx.tree.node().moves[i];
        if !ctx.tree.do_move(mv) {
            ctx.tree.node_mut().moves.remove(i);
            continue;
        }
        let mut score = -quies(ctx, 0, -Score::INFINITY, Score::INFINITY);
        let child_hash = ctx.tree.position().hash();
        if let Some(entry) = ctx.tt.probe(child_hash, ctx.tree.ply()) {
            score = match entry.bound {
                Bound::Exact => -entry.score,
                Bound::Lower => score.min(-entry.score),
                Bound::Upper => score.max(-entry.score),
                Bound::None => score,
            };
        }
        ctx.tree.undo_move();
        ctx.tree.node_mut().moves[i].set_ext(to_ext(score));
        i += 1;
    }

    let turn = ctx.tree.position().turn();
    let moves = ctx.tree.node_mut().moves.as_mut_slice();
    match shuffled {
        true => moves.sort_by(|a, b| b.ext().cmp(&a.ext())),
        false => sort_best_first(moves, turn),
    }
}

/// Search every root move at `depth` inside an aspiration window around
/// the previous best score.
///
/// A move that falls outside the window widens that side and is searched
/// again. Searched moves are kept sorted by score. Returns `true` if the
/// best score is bounded and not a mate.
pub(crate) fn aspsearch(ctx: &mut SearchContext<'_>, depth: i32, handler: &mut dyn SearchHandler) -> bool {
    if ctx.tree.node().moves.is_empty() {
        return false;
    }

    let previous = ext_score(ctx.tree.node().moves[0].ext());
    let [tight, wide] = ctx.tuning.aspiration_offsets;
    let alphas = [previous - tight, previous - wide, -Score::INFINITY];
    let betas = [previous + tight, previous + wide, Score::INFINITY];
    let (mut alpha_index, mut beta_index) = match depth >= ctx.tuning.aspiration_min_depth {
        true => (0, 0),
        false => (2, 2),
    };

    let mut best = -Score::INFINITY;
    let mut first = true;
    let mut i = 0;

    while i < ctx.tree.node().moves.len() {
        let alpha = alphas[alpha_index].max(best);
        let beta = betas[beta_index];
        if best >= beta {
            warn!(depth, best = %best, beta = %beta, "best score already reaches beta");
        }

        let mv = ctx.tree.node().moves[i];
        if !ctx.tree.do_move(mv) {
            warn!(mv = %mv, "illegal root move");
            ctx.tree.node_mut().moves.remove(i);
            continue;
        }

        let new_depth = depth - ONE_PLY;
        let score = if first {
            -search(ctx, new_depth, -beta, -alpha, NodeStat::DEFAULT)
        } else {
            let mut score = -search(ctx, new_depth, -(alpha + 1), -alpha, NodeStat::DEFAULT);
            if !ctx.is_interrupted() && score > alpha && score < beta {
                score = -search(ctx, new_depth, -beta, -alpha, NodeStat::DEFAULT);
            }
            score
        };
        ctx.tree.undo_move();

        if ctx.is_interrupted() {
            break;
        }

        if score <= alphas[alpha_index] && score >= best {
            alpha_index += 1;
            ctx.tree.update_pv(mv, depth);
            ctx.tree.info.fail_low_researches += 1;
            handler.on_fail_low(&report(ctx, depth, score));
            continue;
        }

        if score >= beta && beta != Score::INFINITY {
            beta_index += 1;
            ctx.tree.update_pv(mv, depth);
            ctx.tree.info.fail_high_researches += 1;
            handler.on_fail_high(&report(ctx, depth, score));
            continue;
        }

        if score > best {
            best = score;
            ctx.tree.update_pv(mv, depth);
        }

        // Insertion sort by score.
        let moves = &mut ctx.tree.node_mut().moves;
        let mut j = i;
        while j > 0 && ext_score(moves[j - 1].ext()) < score {
            moves[j] = moves[j - 1];
            j -= 1;
        }
        moves[j] = mv.with_ext(to_ext(score));

        i += 1;
        first = false;
    }

    if ctx.is_interrupted() {
        return false;
    }

    if !ctx.tree.node().pv().is_empty() && best != -Score::INFINITY {
        let pv = ctx.tree.node().pv().clone();
        store_pv(ctx, &pv, 0, best);
        handler.on_update_pv(&report(ctx, depth, best));
    }

    best > -Score::MATE && best < Score::MATE
}

/// Replay `pv` from `index` and pin each move in the TT on the way back.
///
/// `score` is from the point of view of the side to move at `index`.
fn store_pv(ctx: &mut SearchContext<'_>, pv: &Pv, index: usize, score: Score) {
    let Some(entry) = pv.get(index) else {
        return;
    };
    if entry.depth <= 0 {
        return;
    }
    if entry.mv.is_empty() {
        warn!(index, pv = %pv, "principal variation holds an empty move");
        return;
    }
    if !ctx.tree.do_move(entry.mv) {
        warn!(index, mv = %entry.mv, pv = %pv, "principal variation holds an illegal move");
        return;
    }
    store_pv(ctx, pv, index + 1, -score);
    ctx.tree.undo_move();

    let hash = ctx.tree.position().hash();
    ctx.tt.store_pv(hash, score, entry.depth, ctx.tree.ply(), entry.mv);
}
