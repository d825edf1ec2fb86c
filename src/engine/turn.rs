use log::debug;

use super::board::TileState;
use super::events::EndReason;
use super::schedule::Task;
use super::session::Session;

/// Progress of the current turn.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    OneSelected {
        first: String,
    },
    /// Board is locked until the turn's settle task runs.
    Evaluating {
        first: String,
        second: String,
        turn: u64,
    },
}

impl TurnState {
    pub fn pending_first(&self) -> Option<&str> {
        match self {
            TurnState::OneSelected { first } => Some(first),
            _ => None,
        }
    }

    pub fn is_evaluating(&self) -> bool {
        matches!(self, TurnState::Evaluating { .. })
    }
}

/// What a tile selection did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    Ignored,
    /// The pending tile was clicked again and put back face down.
    Deselected,
    First,
    Matched,
    Mismatched,
}

impl Session {
    pub fn select_tile(&mut self, tile_id: &str) -> Selection {
        if !self.active || self.locked {
            return Selection::Ignored;
        }
        let Some(state) = self.board.state_of(tile_id) else {
            return Selection::Ignored;
        };

        if self.turn.pending_first() == Some(tile_id) {
            self.clicks = self.clicks.saturating_sub(1);
            self.turn = TurnState::Idle;
            self.set_tile(tile_id, TileState::FaceDown);
            self.push_stats();
            debug!("tile {tile_id} clicked twice, selection dropped");
            return Selection::Deselected;
        }

        if state != TileState::FaceDown {
            return Selection::Ignored;
        }

        self.clicks += 1;
        self.set_tile(tile_id, TileState::FaceUp);
        if let Some(image_ref) = self.board.get(tile_id).map(|tile| tile.image_ref.clone()) {
            self.request_asset(&image_ref);
        }

        match std::mem::take(&mut self.turn) {
            TurnState::Idle => {
                self.turn = TurnState::OneSelected {
                    first: tile_id.to_string(),
                };
                self.push_stats();
                Selection::First
            }
            TurnState::OneSelected { first } => {
                // Lock before anything is scheduled.
                self.locked = true;
                self.turn_seq += 1;
                self.turn = TurnState::Evaluating {
                    first: first.clone(),
                    second: tile_id.to_string(),
                    turn: self.turn_seq,
                };
                self.evaluate_pair(&first, tile_id)
            }
            evaluating @ TurnState::Evaluating { .. } => {
                self.turn = evaluating;
                Selection::Ignored
            }
        }
    }

    fn evaluate_pair(&mut self, first: &str, second: &str) -> Selection {
        let item_of = |id: &str| self.board.get(id).map(|tile| tile.item_id);
        let is_match = item_of(first).is_some() && item_of(first) == item_of(second);
        let turn = self.turn_seq;

        if is_match {
            self.set_tile(first, TileState::Matched);
            self.set_tile(second, TileState::Matched);
            self.pairs_matched += 1;
            self.push_stats();
            debug!("turn {turn}: {first} and {second} match");
            self.schedule.schedule(
                self.timings.match_settle_ms,
                self.token,
                Task::MatchSettle { turn },
            );
            if self.pairs_matched == self.pair_count {
                self.end(EndReason::Win);
            }
            Selection::Matched
        } else {
            self.push_stats();
            debug!("turn {turn}: {first} and {second} differ");
            self.schedule.schedule(
                self.timings.mismatch_show_ms,
                self.token,
                Task::MismatchConceal {
                    turn,
                    tiles: [first.to_string(), second.to_string()],
                },
            );
            Selection::Mismatched
        }
    }

    fn is_current_turn(&self, turn: u64) -> bool {
        matches!(&self.turn, TurnState::Evaluating { turn: current, .. } if *current == turn)
    }

    pub(super) fn on_match_settle(&mut self, turn: u64) {
        if !self.active || !self.is_current_turn(turn) {
            return;
        }
        self.finish_turn();
    }

    pub(super) fn on_mismatch_conceal(&mut self, turn: u64, tiles: [String; 2]) {
        if !self.active || !self.is_current_turn(turn) {
            return;
        }
        for tile_id in &tiles {
            if self.board.state_of(tile_id) == Some(TileState::FaceUp) {
                self.set_tile(tile_id, TileState::FaceDown);
            }
        }
        self.schedule.schedule(
            self.timings.mismatch_settle_ms,
            self.token,
            Task::MismatchSettle { turn },
        );
    }

    pub(super) fn on_mismatch_settle(&mut self, turn: u64) {
        if !self.active || !self.is_current_turn(turn) {
            return;
        }
        self.finish_turn();
    }

    fn finish_turn(&mut self) {
        self.turn = TurnState::Idle;
        self.locked = false;
        self.resume_deferred_reveal();
    }
}
