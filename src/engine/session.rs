use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::board::{Board, TileState};
use super::catalog::CatalogCache;
use super::deck::build_deck;
use super::difficulty::{Difficulty, format_clock};
use super::error::Result;
use super::events::{EndReason, GameEvent, MessageKind};
use super::power_up::PowerUp;
use super::schedule::{Schedule, Task, Timings};
use super::timer::{Countdown, Tick};
use super::turn::TurnState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum AssetState {
    Loading,
    Ready,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stats {
    pub clicks: u32,
    pub pairs_matched: usize,
    pub pairs_left: usize,
    pub pair_count: usize,
    pub time_left: u32,
    pub power_up_available: bool,
    pub active: bool,
    pub locked: bool,
    pub outcome: Option<EndReason>,
}

/// One player's game: the dealt board, the turn in progress, the countdown,
/// the reveal power-up and every task scheduled on their behalf.
///
/// All operations are synchronous; deferred work goes through the session's
/// `Schedule` and runs when the host calls `advance_to`. Every start or
/// reset bumps the game token, so tasks and asset completions issued for an
/// earlier game are discarded instead of applied.
pub struct Session {
    pub(super) catalog: CatalogCache,
    pub(super) rng: StdRng,
    pub(super) timings: Timings,
    pub(super) schedule: Schedule,
    pub(super) events: Vec<GameEvent>,
    pub(super) token: u64,
    pub(super) difficulty: Difficulty,
    pub(super) board: Board,
    pub(super) active: bool,
    pub(super) locked: bool,
    pub(super) pair_count: usize,
    pub(super) clicks: u32,
    pub(super) pairs_matched: usize,
    pub(super) countdown: Countdown,
    pub(super) turn: TurnState,
    pub(super) turn_seq: u64,
    pub(super) power_up: PowerUp,
    pub(super) assets: HashMap<String, AssetState>,
    pub(super) outcome: Option<EndReason>,
}

impl Session {
    pub fn new(catalog: CatalogCache) -> Self {
        Session::with_rng(catalog, StdRng::seed_from_u64(rand::random()))
    }

    pub fn with_seed(catalog: CatalogCache, seed: u64) -> Self {
        Session::with_rng(catalog, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(catalog: CatalogCache, rng: StdRng) -> Self {
        Session {
            catalog,
            rng,
            timings: Timings::default(),
            schedule: Schedule::default(),
            events: Vec::new(),
            token: 0,
            difficulty: Difficulty::default(),
            board: Board::default(),
            active: false,
            locked: false,
            pair_count: 0,
            clicks: 0,
            pairs_matched: 0,
            countdown: Countdown::default(),
            turn: TurnState::Idle,
            turn_seq: 0,
            power_up: PowerUp::default(),
            assets: HashMap::new(),
            outcome: None,
        }
    }

    /// Swaps the catalog source, for hosts that fetch the catalog document
    /// asynchronously before the first game.
    pub fn set_catalog(&mut self, catalog: CatalogCache) {
        self.catalog = catalog;
    }

    pub fn set_timings(&mut self, timings: Timings) {
        self.timings = timings;
    }

    /// Starts a fresh game, superseding whatever game was running.
    ///
    /// On failure the error is also reported as a message event and the
    /// session stays inactive.
    pub fn start(&mut self, difficulty: Difficulty) -> Result<()> {
        self.token = self.token.wrapping_add(1);
        self.schedule.cancel_all();
        self.countdown.stop();
        self.difficulty = difficulty;
        self.board = Board::default();
        self.active = false;
        self.locked = false;
        self.pair_count = 0;
        self.clicks = 0;
        self.pairs_matched = 0;
        self.turn = TurnState::Idle;
        self.power_up = PowerUp::default();
        self.assets.clear();
        self.outcome = None;

        let (pairs, seconds) = difficulty.config();
        let deal = match build_deck(&mut self.catalog, pairs, &mut self.rng) {
            Ok(deal) => deal,
            Err(err) => {
                warn!("could not start {} game: {err}", difficulty.name());
                self.push_message(format!("Could not start a game: {err}"), MessageKind::Error);
                // The previous game's board is gone; let the renderer clear it.
                self.push(GameEvent::BoardLayout { pair_count: 0 });
                self.push(GameEvent::PowerUpAvailability { available: false });
                self.push_stats();
                return Err(err);
            }
        };

        if let Some(notice) = deal.notice {
            self.push_message(notice, MessageKind::Info);
        }
        self.pair_count = deal.pair_count;
        self.board = Board::new(deal.tiles);
        self.push(GameEvent::BoardLayout {
            pair_count: self.pair_count,
        });

        self.countdown.start(seconds);
        self.schedule
            .schedule(self.timings.tick_ms, self.token, Task::TimerTick);
        self.active = true;
        self.push(GameEvent::PowerUpAvailability { available: true });
        self.push_stats();
        info!(
            "started {} game #{} with {} pairs and {}",
            difficulty.name(),
            self.token,
            self.pair_count,
            format_clock(seconds)
        );
        Ok(())
    }

    /// Restarts with the difficulty of the last game.
    pub fn reset(&mut self) -> Result<()> {
        self.start(self.difficulty)
    }

    /// Ends the running game. Returns false when it had already ended.
    pub fn end(&mut self, reason: EndReason) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.locked = true;
        self.countdown.stop();
        self.schedule.cancel_all();
        self.power_up.disarm();
        self.outcome = Some(reason);

        let matched: Vec<String> = self
            .board
            .tiles()
            .iter()
            .filter(|tile| tile.is_matched())
            .map(|tile| tile.tile_id.clone())
            .collect();
        for tile_id in matched {
            self.push(GameEvent::TileStateChanged {
                tile_id,
                state: TileState::Matched,
            });
        }
        self.push(GameEvent::PowerUpAvailability { available: false });
        self.push_stats();

        let elapsed = self.difficulty.seconds().saturating_sub(self.countdown.remaining());
        match reason {
            EndReason::Win => {
                self.push_message(
                    format!(
                        "You found all {} pairs in {} with {} clicks!",
                        self.pair_count,
                        format_clock(elapsed),
                        self.clicks
                    ),
                    MessageKind::Success,
                );
            }
            EndReason::Timeout => {
                self.push_message(
                    format!(
                        "Time's up! You matched {} of {} pairs.",
                        self.pairs_matched, self.pair_count
                    ),
                    MessageKind::Error,
                );
            }
        }
        self.push(GameEvent::Ended { reason });
        info!("game #{} ended: {:?}", self.token, reason);
        true
    }

    /// Runs every task due at or before `now_ms` on the session clock.
    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some((token, task)) = self.schedule.pop_due(now_ms) {
            if token != self.token {
                debug!("discarding stale {task:?} from game #{token}");
                continue;
            }
            self.run_task(task);
        }
        self.schedule.settle_clock(now_ms);
    }

    pub fn advance(&mut self, elapsed: Duration) {
        let now = self.schedule.now_ms();
        self.advance_to(now.saturating_add(elapsed.as_millis() as u64));
    }

    pub fn now_ms(&self) -> u64 {
        self.schedule.now_ms()
    }

    /// Delay until the next scheduled task, for arming the host's wakeup.
    pub fn next_wakeup(&self) -> Option<Duration> {
        self.schedule.next_wakeup()
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::TimerTick => self.on_timer_tick(),
            Task::MatchSettle { turn } => self.on_match_settle(turn),
            Task::MismatchConceal { turn, tiles } => self.on_mismatch_conceal(turn, tiles),
            Task::MismatchSettle { turn } => self.on_mismatch_settle(turn),
            Task::PowerUpConceal => self.on_power_up_conceal(),
        }
    }

    fn on_timer_tick(&mut self) {
        if !self.active {
            return;
        }
        match self.countdown.tick() {
            Tick::Remaining(_) => {
                self.schedule
                    .schedule(self.timings.tick_ms, self.token, Task::TimerTick);
                self.push_stats();
            }
            Tick::Expired => {
                debug!("countdown expired for game #{}", self.token);
                self.end(EndReason::Timeout);
            }
            Tick::Stopped => {}
        }
    }

    /// Overrides the remaining time of the running game (at least one second).
    pub fn force_time_left(&mut self, secs: u32) {
        if !self.active {
            return;
        }
        self.countdown.set_remaining(secs.max(1));
        self.push_stats();
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn stats(&self) -> Stats {
        Stats {
            clicks: self.clicks,
            pairs_matched: self.pairs_matched,
            pairs_left: self.pair_count.saturating_sub(self.pairs_matched),
            pair_count: self.pair_count,
            time_left: self.countdown.remaining(),
            power_up_available: self.power_up_available(),
            active: self.active,
            locked: self.locked,
            outcome: self.outcome,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    pub(super) fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(super) fn push_message(&mut self, text: impl Into<String>, kind: MessageKind) {
        self.push(GameEvent::Message {
            text: text.into(),
            kind,
        });
    }

    pub(super) fn push_stats(&mut self) {
        let stats = self.stats();
        self.push(GameEvent::StatsChanged {
            clicks: stats.clicks,
            pairs_matched: stats.pairs_matched,
            pairs_left: stats.pairs_left,
            time_left: stats.time_left,
        });
    }

    pub(super) fn set_tile(&mut self, tile_id: &str, state: TileState) {
        if self.board.set_state(tile_id, state) {
            self.push(GameEvent::TileStateChanged {
                tile_id: tile_id.to_string(),
                state,
            });
        }
    }

    /// Asks the host to load a tile image unless it is already known.
    pub(super) fn request_asset(&mut self, image_ref: &str) -> bool {
        if self.assets.contains_key(image_ref) {
            return false;
        }
        self.assets
            .insert(image_ref.to_string(), AssetState::Loading);
        self.push(GameEvent::LoadAsset {
            token: self.token,
            image_ref: image_ref.to_string(),
        });
        true
    }

    pub(super) fn asset_is_settled(&self, image_ref: &str) -> bool {
        matches!(
            self.assets.get(image_ref),
            Some(AssetState::Ready | AssetState::Failed)
        )
    }
}
