//! Nega-scout search with quiescence.

use kaku_core::{
    CheckState, Color, Move, MoveList, Piece, Position, Repetition, generate_capturing_moves, generate_evasions,
    generate_not_capturing_moves,
};

use super::ONE_PLY;
use super::config::Tuning;
use super::control::SearchControl;
use super::heuristics::{GainTable, HISTORY_SCALE, HistoryTable};
use super::node_stat::NodeStat;
use super::ordering;
use super::see;
use super::tree::{MAX_SEARCH_PLY, Tree};
use super::tt::{Bound, TranspositionTable};
use crate::eval::{Evaluator, Score};

/// Everything the recursive search reads and writes.
pub(crate) struct SearchContext<'a> {
    pub tree: &'a mut Tree,
    pub tt: &'a mut TranspositionTable,
    pub history: &'a mut HistoryTable,
    pub gain: &'a mut GainTable,
    pub control: &'a SearchControl,
    pub tuning: &'a Tuning,
    pub evaluator: Evaluator,
}

impl SearchContext<'_> {
    #[inline]
    pub fn is_interrupted(&self) -> bool {
        self.control.is_interrupted()
    }

    /// Node-entry checkpoint: also reads the clock now and then.
    #[inline]
    fn poll(&self) -> bool {
        self.control.poll(self.tree.info.total_nodes())
    }
}

/// Piece that `mv` moves or drops.
fn moving_piece(pos: &Position, turn: Color, mv: Move) -> Option<Piece> {
    match (mv.from(), mv.drop_kind()) {
        (Some(from), _) => pos.piece_on(from),
        (None, Some(kind)) => Some(Piece::new(kind, turn)),
        (None, None) => None,
    }
}

/// Find a checking move after which the opponent has no legal reply.
///
/// When several moves mate, the one first in colour-relative order wins.
fn find_mate_in_one(pos: &mut Position) -> Option<Move> {
    let mut moves = MoveList::new();
    generate_capturing_moves(pos, &mut moves);
    generate_not_capturing_moves(pos, &mut moves);
    let turn = pos.turn();
    moves.as_mut_slice().sort_by_key(|mv| mv.relative_identity(turn));
    for &mv in moves.as_slice() {
        if !pos.is_check(mv) {
            continue;
        }
        let Ok(captured) = pos.do_move(mv) else {
            continue;
        };
        let mated = !pos.has_legal_move();
        pos.undo_move(mv, captured);
        if mated {
            return Some(mv);
        }
    }
    None
}

/// Return `true` if exactly one evasion is legal.
fn has_single_reply(pos: &mut Position, check: CheckState) -> bool {
    let mut moves = MoveList::new();
    generate_evasions(pos, check, &mut moves);
    let mut legal = 0;
    for &mv in moves.as_slice() {
        if let Ok(captured) = pos.do_move(mv) {
            pos.undo_move(mv, captured);
            legal += 1;
            if legal > 1 {
                return false;
            }
        }
    }
    legal == 1
}

/// Nega-scout search of the current tree position.
///
/// `depth` is in 1/[`ONE_PLY`] units. The score is fail-hard within
/// `(alpha, beta)` and from the side to move's point of view. When the
/// search is interrupted the returned score is meaningless.
pub(crate) fn search(ctx: &mut SearchContext<'_>, depth: i32, mut alpha: Score, beta: Score, stat: NodeStat) -> Score {
    ctx.tree.node_mut().arrive();
    let ply = ctx.tree.ply();

    let repetition = match ctx.tree.position().repetition() {
        Repetition::None => None,
        Repetition::Draw => Some(Score::ZERO),
        Repetition::Win => Some(Score::mate_in(ply)),
        Repetition::Lose => Some(Score::mated_in(ply)),
    };
    if let Some(score) = repetition {
        ctx.tree.node_mut().historical = true;
        return score;
    }

    if depth <= 0 {
        return quies(ctx, 0, alpha, beta);
    }

    ctx.tree.info.nodes += 1;
    if ctx.poll() {
        return Score::ZERO;
    }

    if ply >= MAX_SEARCH_PLY {
        let score = ctx.evaluator.evaluate(ctx.tree.position());
        ctx.tree.node_mut().historical = true;
        return score;
    }

    // Distance pruning: nothing beyond mate at this ply is reachable.
    let old_alpha = alpha;
    let lower = Score::mated_in(ply);
    let upper = Score::mate_in(ply + 1);
    if lower >= beta {
        return lower;
    } else if lower > alpha {
        alpha = lower;
    } else if upper <= alpha {
        return upper;
    }
    let null_window = old_alpha + 1 == beta;

    let hash = ctx.tree.position().hash();
    let check = ctx.tree.position().check_state();
    let in_check = check.is_check();
    let turn = ctx.tree.position().turn();
    let mut stat = stat;
    let mut hash_move = Move::EMPTY;

    if let Some(entry) = ctx.tt.probe(hash, ply) {
        let is_mate = (entry.score <= -Score::MATE && matches!(entry.bound, Bound::Exact | Bound::Upper))
            || (entry.score >= Score::MATE && matches!(entry.bound, Bound::Exact | Bound::Lower));

        if stat.hash_cut() && null_window && (entry.depth >= depth || is_mate) {
            let cut = match entry.bound {
                Bound::Exact => true,
                Bound::Upper => entry.score <= old_alpha,
                Bound::Lower => entry.score >= beta,
                Bound::None => false,
            };
            if cut {
                ctx.tree.info.hash_cuts += 1;
                return entry.score;
            }
        }

        if stat.hash_cut()
            && entry.bound == Bound::Lower
            && depth < ctx.tuning.futility_depth
            && !in_check
            && !entry.mate_threat
            && !stat.mate_threat()
            && entry.score >= beta + ordering::futility_margin(depth, 0, ctx.tuning)
        {
            ctx.tree.info.hash_futility_cuts += 1;
            return beta;
        }

        let null_depth = depth - ONE_PLY - ctx.tuning.null_move_reduction;
        if entry.bound == Bound::Upper && entry.score < beta && entry.depth >= null_depth {
            stat = stat.without_null_move();
        }
        if matches!(entry.bound, Bound::Exact | Bound::Lower) && entry.depth >= depth - ctx.tuning.iid_reduction {
            stat = stat.without_recursion();
        }
        if entry.mate_threat {
            stat = stat.with_mate_threat();
        }
        if ctx.tree.position().is_legal_move_maybe(entry.best_move, check) {
            hash_move = entry.best_move;
        }
    }

    let stand_pat = ctx.evaluator.evaluate(ctx.tree.position());
    {
        let node = ctx.tree.node_mut();
        node.check = check;
        node.hash_move = hash_move;
        node.stand_pat = stand_pat;
    }

    if stat.mate_detection()
        && !in_check
        && let Some(mv) = find_mate_in_one(&mut ctx.tree.position)
    {
        ctx.tree.info.mate_in_one += 1;
        let score = Score::mate_in(ply + 1);
        ctx.tree.set_pv_leaf(mv, depth);
        ctx.tt.store(hash, old_alpha, beta, score, depth, ply, mv, false);
        return score;
    }

    // Null move: if passing still holds beta, a real move will too.
    if stat.null_move()
        && null_window
        && !stat.mate_threat()
        && !in_check
        && depth >= 2 * ONE_PLY
        && stand_pat >= beta
    {
        let null_depth = depth - ONE_PLY - ctx.tuning.null_move_reduction - depth / 4;
        ctx.tree.do_null_move();
        let score = -search(ctx, null_depth, -beta, -beta + 1, NodeStat::DEFAULT.without_null_move());
        let child_historical = ctx.tree.node().historical;
        ctx.tree.undo_move();

        if ctx.is_interrupted() {
            return Score::ZERO;
        }
        if score >= beta {
            ctx.tree.info.null_move_cuts += 1;
            if child_historical {
                ctx.tree.node_mut().historical = true;
            } else {
                ctx.tt.store(hash, old_alpha, beta, beta, depth, ply, Move::EMPTY, false);
            }
            return beta;
        }
        if score <= -Score::MATE {
            stat = stat.with_mate_threat();
        }
    }

    // Internal iterative deepening, only to find a move to try first.
    if hash_move.is_empty() && stat.recursion() && depth >= ctx.tuning.iid_min_depth {
        let iid_stat = stat
            .without_null_move()
            .without_recursion()
            .without_mate_detection()
            .without_hash_cut();
        search(ctx, depth - ctx.tuning.iid_reduction, alpha, beta, iid_stat);
        if ctx.is_interrupted() {
            return Score::ZERO;
        }
        if let Some(entry) = ctx.tt.probe(hash, ply)
            && ctx.tree.position().is_legal_move_maybe(entry.best_move, check)
        {
            hash_move = entry.best_move;
        }
        let node = ctx.tree.node_mut();
        node.arrive();
        node.check = check;
        node.hash_move = hash_move;
        node.stand_pat = stand_pat;
    }

    let single_reply = in_check && has_single_reply(&mut ctx.tree.position, check);
    let improving = ply < 2 || stand_pat >= ctx.tree.node_at(ply - 2).stand_pat;
    let recapture_square = match ctx.tree.last_move() {
        Some((last, Some(_))) => Some(last.to()),
        _ => None,
    };
    let killers = ctx.tree.node().killers;
    let pv_node = !null_window;

    ordering::begin(ctx.tree);

    let mut best_move = Move::EMPTY;
    let mut move_count = 0usize;

    while let Some(mv) = ordering::next_move(ctx.tree, ctx.history) {
        let pos = ctx.tree.position();
        let tactical = ordering::is_tactical(pos, mv);
        let capture = ordering::is_capture(pos, mv);
        let priority = mv == hash_move || killers.contains(mv);
        let gives_check = pos.is_check(mv);
        let piece = moving_piece(pos, turn, mv);

        // Extensions.
        let mut extension = 0;
        let mut child_stat = match stat.recapture() {
            true => NodeStat::DEFAULT,
            false => NodeStat::DEFAULT.without_recapture(),
        };
        if gives_check {
            extension = ctx.tuning.check_extension;
        } else if single_reply {
            extension = ctx.tuning.one_reply_extension;
        } else if stat.recapture() && capture && recapture_square == Some(mv.to()) {
            extension = ctx.tuning.recapture_extension;
            child_stat = child_stat.without_recapture();
        }
        let new_depth = depth - ONE_PLY + extension;

        // Late-move reduction.
        let mut reduction = 0;
        if move_count > 0
            && !tactical
            && !priority
            && !in_check
            && !gives_check
            && !stat.mate_threat()
            && depth >= 2 * ONE_PLY
        {
            reduction = ordering::reduction(depth, move_count, ctx.tuning.reduction_scale);
            if ctx.history.ratio(turn, mv) > HISTORY_SCALE / 2 {
                reduction -= ONE_PLY / 2;
            }
            if !improving {
                reduction += ONE_PLY / 2;
            }
            if pv_node {
                reduction -= ONE_PLY / 2;
            }
            reduction = reduction.clamp(0, (new_depth - ONE_PLY).max(0));
        }
        let reduced_depth = new_depth - reduction;

        let estimate = match in_check {
            true => None,
            false => Some(ctx.evaluator.estimate_score(stand_pat, pos, mv)),
        };

        // Futility pruning.
        let futile = match estimate {
            Some(estimate)
                if !gives_check
                    && !priority
                    && !stat.mate_threat()
                    && move_count >= ctx.tuning.futility_min_moves
                    && reduced_depth < ctx.tuning.futility_depth =>
            {
                let gain = piece.map_or(0, |piece| ctx.gain.get(piece, mv.to()));
                let margin = ordering::futility_margin(reduced_depth, move_count, ctx.tuning);
                estimate + gain + margin <= alpha
            }
            _ => false,
        };

        // Shallow quiet moves that hang the piece.
        let hangs = !in_check
            && !gives_check
            && !priority
            && !tactical
            && !stat.mate_threat()
            && move_count > 0
            && reduced_depth < ctx.tuning.see_prune_depth
            && see::calculate(pos, mv) < 0;

        if futile {
            ctx.tree.info.futility_prunings += 1;
            continue;
        }
        if hangs {
            ctx.tree.info.see_prunings += 1;
            continue;
        }
        if extension > 0 {
            ctx.tree.info.extensions += 1;
        }
        if reduction > 0 {
            ctx.tree.info.reductions += 1;
        }

        if !ctx.tree.do_move(mv) {
            continue;
        }

        if let (Some(estimate), Some(piece)) = (estimate, piece) {
            let actual = -ctx.evaluator.evaluate(ctx.tree.position());
            ctx.gain.update(piece, mv.to(), (actual - estimate).raw());
        }

        let score = if move_count == 0 {
            -search(ctx, new_depth, -beta, -alpha, child_stat)
        } else {
            let mut score = -search(ctx, reduced_depth, -(alpha + 1), -alpha, child_stat);
            if !ctx.is_interrupted() && score > alpha && reduction > 0 {
                score = -search(ctx, new_depth, -(alpha + 1), -alpha, child_stat);
            }
            if !ctx.is_interrupted() && score > alpha && score < beta && !null_window {
                score = -search(ctx, new_depth, -beta, -alpha, child_stat);
            }
            score
        };
        let child_historical = ctx.tree.node().historical;
        ctx.tree.undo_move();

        if ctx.is_interrupted() {
            return Score::ZERO;
        }

        move_count += 1;
        ctx.tree.node_mut().searched.push(mv);

        if score > alpha {
            alpha = score;
            best_move = mv;
            if child_historical {
                ctx.tree.node_mut().historical = true;
            }
            ctx.tree.update_pv(mv, depth);

            if score >= beta {
                ctx.tree.info.fail_high += 1;
                if move_count == 1 {
                    ctx.tree.info.fail_high_first += 1;
                }
                break;
            }
        }
    }

    if !best_move.is_empty() && !in_check {
        let pos = ctx.tree.position();
        if !ordering::is_tactical(pos, best_move) {
            let node = ctx.tree.node_mut();
            node.killers.store(best_move);
        }
        let inc = (depth / ONE_PLY).max(1) as u32;
        let node = ctx.tree.node();
        for &mv in node.searched.as_slice() {
            if ordering::is_tactical(&ctx.tree.position, mv) {
                continue;
            }
            if mv == best_move {
                ctx.history.add(turn, mv, 2 * inc, 2 * inc);
            } else {
                ctx.history.add(turn, mv, inc, 0);
            }
        }
    }

    if !ctx.tree.node().historical {
        ctx.tt.store(hash, old_alpha, beta, alpha, depth, ply, best_move, stat.mate_threat());
    }

    alpha
}

/// Quiescence search: captures only, or every evasion when in check.
///
/// Standing pat is always allowed, so the result never falls below
/// `min(beta, static evaluation)`.
pub(crate) fn quies(ctx: &mut SearchContext<'_>, qply: i32, mut alpha: Score, beta: Score) -> Score {
    ctx.tree.node_mut().arrive();
    ctx.tree.info.quies_nodes += 1;
    if ctx.poll() {
        return Score::ZERO;
    }

    let ply = ctx.tree.ply();
    let stand_pat = ctx.evaluator.evaluate(ctx.tree.position());
    ctx.tree.node_mut().stand_pat = stand_pat;

    if ply >= MAX_SEARCH_PLY {
        ctx.tree.node_mut().historical = true;
        return stand_pat;
    }
    if stand_pat >= beta {
        return stand_pat;
    }
    alpha = alpha.max(stand_pat);

    let check = ctx.tree.position().check_state();
    let in_check = check.is_check();
    let exclude_small = qply >= ctx.tuning.quies_small_capture_ply;
    let mut pruned = 0;
    {
        let (pos, node) = ctx.tree.position_and_node();
        node.check = check;
        if in_check {
            generate_evasions(pos, check, &mut node.moves);
            ordering::sort_by_history(pos, &mut node.moves, 0, ctx.history);
        } else {
            generate_capturing_moves(pos, &mut node.moves);
            let turn = pos.turn();
            let mut i = 0;
            while i < node.moves.len() {
                let mv = node.moves[i];
                let estimate = ctx.evaluator.estimate_score(stand_pat, pos, mv);
                let gain = moving_piece(pos, turn, mv).map_or(0, |piece| ctx.gain.get(piece, mv.to()));
                if estimate + gain <= alpha {
                    node.moves.remove(i);
                    pruned += 1;
                } else {
                    i += 1;
                }
            }
            see::sort_moves(pos, &mut node.moves, 0, exclude_small);
        }
    }
    ctx.tree.info.futility_prunings += pruned;

    let mut index = 0;
    while index < ctx.tree.node().moves.len() {
        let mv = ctx.tree.node().moves[index];
        index += 1;
        // Captures are sorted, so the rest lose material too.
        if !in_check && mv.ext() < 0 {
            break;
        }
        if !ctx.tree.do_move(mv) {
            continue;
        }
        let score = -quies(ctx, qply + 1, -beta, -alpha);
        ctx.tree.undo_move();

        if ctx.is_interrupted() {
            return Score::ZERO;
        }

        if score > alpha {
            alpha = score;
            ctx.tree.update_pv(mv, 0);
            if score >= beta {
                break;
            }
        }
    }

    alpha
}
