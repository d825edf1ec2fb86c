use std::collections::HashSet;

use log::debug;

use super::board::TileState;
use super::events::GameEvent;
use super::schedule::Task;
use super::session::{AssetState, Session};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum RevealPhase {
    #[default]
    Idle,
    /// Waiting for the listed image references to finish loading.
    AwaitingAssets {
        targets: Vec<String>,
        pending: HashSet<String>,
    },
    /// Assets are ready but a pair is still being evaluated.
    Deferred { targets: Vec<String> },
    Revealing { targets: Vec<String> },
}

/// The once-per-game "reveal all" action.
#[derive(Clone, Debug, Default)]
pub struct PowerUp {
    used: bool,
    disarmed: bool,
    phase: RevealPhase,
}

impl PowerUp {
    pub(super) fn disarm(&mut self) {
        self.disarmed = true;
        self.phase = RevealPhase::Idle;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    Ignored,
    /// Waiting on this many image loads before revealing.
    Loading(usize),
    Revealed,
}

impl Session {
    pub fn power_up_available(&self) -> bool {
        self.active && !self.power_up.used && !self.power_up.disarmed
    }

    pub fn activate_power_up(&mut self) -> Activation {
        if !self.active || self.locked || self.power_up.used || self.power_up.disarmed {
            return Activation::Ignored;
        }
        self.power_up.used = true;
        self.push(GameEvent::PowerUpAvailability { available: false });

        let targets: Vec<(String, String)> = self
            .board
            .tiles()
            .iter()
            .filter(|tile| !tile.is_matched())
            .map(|tile| (tile.tile_id.clone(), tile.image_ref.clone()))
            .collect();

        let mut pending = HashSet::new();
        for (_, image_ref) in &targets {
            if self.asset_is_settled(image_ref) {
                continue;
            }
            self.request_asset(image_ref);
            pending.insert(image_ref.clone());
        }
        let targets: Vec<String> = targets.into_iter().map(|(tile_id, _)| tile_id).collect();

        if pending.is_empty() {
            self.begin_reveal(targets);
            return Activation::Revealed;
        }
        let waiting = pending.len();
        debug!("reveal waiting on {waiting} images");
        self.power_up.phase = RevealPhase::AwaitingAssets { targets, pending };
        Activation::Loading(waiting)
    }

    /// Reports a finished image load. Failures count as settled so one bad
    /// image cannot hold the reveal back.
    pub fn asset_settled(&mut self, token: u64, image_ref: &str, ok: bool) {
        if token != self.token {
            debug!("ignoring image {image_ref} loaded for game #{token}");
            return;
        }
        let state = if ok {
            AssetState::Ready
        } else {
            AssetState::Failed
        };
        self.assets.insert(image_ref.to_string(), state);

        let visible: Vec<String> = self
            .board
            .tiles()
            .iter()
            .filter(|tile| tile.image_ref == image_ref && tile.state != TileState::FaceDown)
            .map(|tile| tile.tile_id.clone())
            .collect();
        for tile_id in visible {
            self.push(GameEvent::TileImageSettled { tile_id });
        }

        let ready = match &mut self.power_up.phase {
            RevealPhase::AwaitingAssets { pending, .. } => {
                pending.remove(image_ref);
                pending.is_empty()
            }
            _ => false,
        };
        if !ready || !self.active {
            return;
        }
        if let RevealPhase::AwaitingAssets { targets, .. } = std::mem::take(&mut self.power_up.phase)
        {
            if self.turn.is_evaluating() {
                self.power_up.phase = RevealPhase::Deferred { targets };
            } else {
                self.begin_reveal(targets);
            }
        }
    }

    /// Called when a turn settles; starts a reveal held back by that turn.
    pub(super) fn resume_deferred_reveal(&mut self) {
        if let RevealPhase::Deferred { .. } = self.power_up.phase
            && let RevealPhase::Deferred { targets } = std::mem::take(&mut self.power_up.phase)
        {
            self.begin_reveal(targets);
        }
    }

    fn begin_reveal(&mut self, targets: Vec<String>) {
        self.locked = true;
        let mut revealed = Vec::new();
        for tile_id in targets {
            match self.board.state_of(&tile_id) {
                Some(TileState::Matched) | None => {}
                Some(TileState::FaceUp) => revealed.push(tile_id),
                Some(TileState::FaceDown) => {
                    self.set_tile(&tile_id, TileState::FaceUp);
                    revealed.push(tile_id);
                }
            }
        }
        debug!("revealing {} tiles", revealed.len());
        self.power_up.phase = RevealPhase::Revealing { targets: revealed };
        self.schedule
            .schedule(self.timings.reveal_ms, self.token, Task::PowerUpConceal);
    }

    pub(super) fn on_power_up_conceal(&mut self) {
        if !self.active {
            return;
        }
        let RevealPhase::Revealing { targets } = std::mem::take(&mut self.power_up.phase) else {
            return;
        };
        let keep = self.turn.pending_first().map(str::to_string);
        for tile_id in &targets {
            if keep.as_deref() == Some(tile_id.as_str()) {
                continue;
            }
            if self.board.state_of(tile_id) == Some(TileState::FaceUp) {
                self.set_tile(tile_id, TileState::FaceDown);
            }
        }
        // An in-flight evaluation unlocks the board itself when it settles.
        if !self.turn.is_evaluating() {
            self.locked = false;
        }
    }
}
