//! The search stack: one preallocated [`Node`] per ply plus the position
//! being searched.

use std::fmt;

use kaku_core::{CheckState, Move, MoveList, Piece, Position};

use super::heuristics::Killers;
use super::info::SearchInfo;
use crate::eval::Score;

/// Number of nodes in the stack.
pub const STACK_SIZE: usize = 64;

/// Deepest ply the search enters before falling back to static evaluation.
pub const MAX_SEARCH_PLY: usize = STACK_SIZE - 4;

/// A principal-variation entry: the move and the depth it was searched at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PvMove {
    pub mv: Move,
    pub depth: i32,
}

const NO_PV_MOVE: PvMove = PvMove {
    mv: Move::EMPTY,
    depth: 0,
};

/// Fixed-capacity principal variation.
#[derive(Clone)]
pub struct Pv {
    entries: [PvMove; STACK_SIZE],
    len: usize,
}

impl Pv {
    /// Create an empty PV.
    pub fn new() -> Self {
        Self {
            entries: [NO_PV_MOVE; STACK_SIZE],
            len: 0,
        }
    }

    /// Number of moves.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return `true` if the PV holds no move.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forget every move.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Entry at `index`, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<PvMove> {
        self.entries[..self.len].get(index).copied()
    }

    /// First move of the line.
    #[inline]
    pub fn first(&self) -> Option<Move> {
        self.get(0).map(|entry| entry.mv)
    }

    /// Iterate over the entries of the line.
    pub fn entries(&self) -> impl Iterator<Item = PvMove> + '_ {
        self.entries[..self.len].iter().copied()
    }

    /// Iterate over the moves of the line.
    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.entries[..self.len].iter().map(|entry| entry.mv)
    }

    /// Replace this line with `mv` followed by `child`.
    pub fn set(&mut self, mv: Move, depth: i32, child: &Pv) {
        self.entries[0] = PvMove {
            mv: mv.with_ext(0),
            depth,
        };
        let tail = child.len.min(STACK_SIZE - 1);
        self.entries[1..=tail].copy_from_slice(&child.entries[..tail]);
        self.len = tail + 1;
    }

    /// Copy the moves into a vector.
    pub fn to_vec(&self) -> Vec<Move> {
        self.moves().collect()
    }
}

impl Default for Pv {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Pv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, mv) in self.moves().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{mv}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Pv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.entries[..self.len]).finish()
    }
}

/// Move generation phase of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenPhase {
    /// Captures, best exchange first. Losing ones are deferred.
    CapturingMoves,
    /// Quiet moves by history, then the deferred captures.
    NotCapturingMoves,
    /// All check evasions by history.
    Evasions,
    /// Nothing left to generate.
    End,
}

/// Per-ply search state.
pub struct Node {
    /// Candidate moves; `moves[..cursor]` have been handed out.
    pub(crate) moves: MoveList,
    pub(crate) cursor: usize,
    pub(crate) phase: GenPhase,
    /// Captures with a losing exchange, searched after the quiet moves.
    pub(crate) deferred: MoveList,
    /// Moves actually searched at this node, for history updates.
    pub(crate) searched: MoveList,
    pub(crate) check: CheckState,
    pub(crate) hash_move: Move,
    /// Survive [`arrive`](Node::arrive) so siblings share them.
    pub(crate) killers: Killers,
    pub(crate) pv: Pv,
    /// Move played from this node; empty for a null move.
    pub(crate) mv: Move,
    pub(crate) captured: Option<Piece>,
    pub(crate) stand_pat: Score,
    /// The result depends on positions before the root (repetition).
    pub(crate) historical: bool,
}

impl Node {
    fn new() -> Self {
        Self {
            moves: MoveList::new(),
            cursor: 0,
            phase: GenPhase::End,
            deferred: MoveList::new(),
            searched: MoveList::new(),
            check: CheckState::NONE,
            hash_move: Move::EMPTY,
            killers: Killers::default(),
            pv: Pv::new(),
            mv: Move::EMPTY,
            captured: None,
            stand_pat: Score::ZERO,
            historical: false,
        }
    }

    /// Reset the per-visit state when the search enters this ply.
    pub(crate) fn arrive(&mut self) {
        self.moves.clear();
        self.cursor = 0;
        self.phase = GenPhase::End;
        self.deferred.clear();
        self.searched.clear();
        self.check = CheckState::NONE;
        self.hash_move = Move::EMPTY;
        self.pv.clear();
        self.mv = Move::EMPTY;
        self.captured = None;
        self.historical = false;
    }

    /// Principal variation found below this node.
    pub fn pv(&self) -> &Pv {
        &self.pv
    }
}

/// Position plus node stack for one search.
pub struct Tree {
    pub(crate) position: Position,
    pub(crate) ply: usize,
    nodes: Box<[Node]>,
    pub(crate) info: SearchInfo,
}

impl Tree {
    /// Create a tree over the starting position.
    pub fn new() -> Self {
        Self {
            position: Position::starting_position(),
            ply: 0,
            nodes: (0..STACK_SIZE).map(|_| Node::new()).collect(),
            info: SearchInfo::default(),
        }
    }

    /// Start a new search from `position`, keeping its game history.
    pub fn init(&mut self, position: &Position) {
        self.position = position.clone();
        self.ply = 0;
        self.info = SearchInfo::default();
        self.nodes[0].arrive();
    }

    /// Position at the current ply.
    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Distance from the root.
    #[inline]
    pub fn ply(&self) -> usize {
        self.ply
    }

    /// Counters of the current search.
    #[inline]
    pub fn info(&self) -> &SearchInfo {
        &self.info
    }

    /// Node at the current ply.
    #[inline]
    pub fn node(&self) -> &Node {
        &self.nodes[self.ply]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self) -> &mut Node {
        &mut self.nodes[self.ply]
    }

    /// Position together with the current node, borrowed at once.
    #[inline]
    pub(crate) fn position_and_node(&mut self) -> (&Position, &mut Node) {
        (&self.position, &mut self.nodes[self.ply])
    }

    /// Node at an arbitrary ply.
    #[inline]
    pub fn node_at(&self, ply: usize) -> &Node {
        &self.nodes[ply]
    }

    /// Move and capture that led to the current node.
    pub fn last_move(&self) -> Option<(Move, Option<Piece>)> {
        let parent = self.nodes[..self.ply].last()?;
        if parent.mv.is_empty() {
            return None;
        }
        Some((parent.mv, parent.captured))
    }

    /// Play `mv` and descend one ply. Returns `false`, changing nothing,
    /// if the move is illegal.
    pub fn do_move(&mut self, mv: Move) -> bool {
        debug_assert!(self.ply + 1 < STACK_SIZE);
        match self.position.do_move(mv) {
            Ok(captured) => {
                let node = &mut self.nodes[self.ply];
                node.mv = mv.with_ext(0);
                node.captured = captured;
                self.ply += 1;
                true
            }
            Err(_) => false,
        }
    }

    /// Pass and descend one ply.
    pub fn do_null_move(&mut self) {
        debug_assert!(self.ply + 1 < STACK_SIZE);
        self.position.do_null_move();
        let node = &mut self.nodes[self.ply];
        node.mv = Move::EMPTY;
        node.captured = None;
        self.ply += 1;
    }

    /// Take back the last move or null move and ascend one ply.
    pub fn undo_move(&mut self) {
        debug_assert!(self.ply > 0);
        self.ply -= 1;
        let node = &self.nodes[self.ply];
        if node.mv.is_empty() {
            self.position.undo_null_move();
        } else {
            self.position.undo_move(node.mv, node.captured);
        }
    }

    /// Set the current PV to `mv` followed by the child's PV.
    pub(crate) fn update_pv(&mut self, mv: Move, depth: i32) {
        let ply = self.ply;
        let (head, tail) = self.nodes.split_at_mut(ply + 1);
        match tail.first() {
            Some(child) => head[ply].pv.set(mv, depth, &child.pv),
            None => head[ply].pv.set(mv, depth, &Pv::new()),
        }
    }

    /// Set the current PV to the single move `mv`.
    pub(crate) fn set_pv_leaf(&mut self, mv: Move, depth: i32) {
        let ply = self.ply;
        self.nodes[ply].pv.set(mv, depth, &Pv::new());
    }

    /// Forget the killers of every ply.
    pub(crate) fn clear_killers(&mut self) {
        for node in self.nodes.iter_mut() {
            node.killers.clear();
        }
    }

    /// Moves from the root to the current ply, for diagnostics.
    pub fn path(&self) -> String {
        let moves: Vec<String> = self.nodes[..self.ply]
            .iter()
            .map(|node| match node.mv.is_empty() {
                true => "pass".to_string(),
                false => node.mv.to_usi(),
            })
            .collect();
        moves.join(" ")
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
