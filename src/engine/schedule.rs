use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fixed delays used by the engine, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub tick_ms: u64,
    pub match_settle_ms: u64,
    pub mismatch_show_ms: u64,
    pub mismatch_settle_ms: u64,
    pub reveal_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            tick_ms: 1000,
            match_settle_ms: 260,
            mismatch_show_ms: 900,
            mismatch_settle_ms: 260,
            reveal_ms: 2000,
        }
    }
}

/// Deferred engine work. Turn tasks carry the turn they belong to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    TimerTick,
    MatchSettle { turn: u64 },
    MismatchConceal { turn: u64, tiles: [String; 2] },
    MismatchSettle { turn: u64 },
    PowerUpConceal,
}

#[derive(Clone, Debug)]
struct Entry {
    due_ms: u64,
    seq: u64,
    token: u64,
    task: Task,
}

/// Virtual clock plus the queue of pending tasks for one session.
///
/// Tasks are stamped with the game token current when they were scheduled;
/// the session compares that stamp again when the task fires.
#[derive(Clone, Debug, Default)]
pub struct Schedule {
    now_ms: u64,
    seq: u64,
    entries: Vec<Entry>,
}

impl Schedule {
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn schedule(&mut self, delay_ms: u64, token: u64, task: Task) {
        self.seq += 1;
        self.entries.push(Entry {
            due_ms: self.now_ms.saturating_add(delay_ms),
            seq: self.seq,
            token,
            task,
        });
    }

    /// Drops every pending task.
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// Time until the earliest pending task, if any.
    pub fn next_wakeup(&self) -> Option<Duration> {
        self.entries
            .iter()
            .map(|entry| entry.due_ms.saturating_sub(self.now_ms))
            .min()
            .map(Duration::from_millis)
    }

    /// Pops the earliest task due at or before `until_ms`, moving the clock to
    /// its due time. Ties fire in scheduling order.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(u64, Task)> {
        let (idx, _) = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due_ms <= until_ms)
            .min_by_key(|(_, entry)| (entry.due_ms, entry.seq))?;
        let entry = self.entries.swap_remove(idx);
        self.now_ms = self.now_ms.max(entry.due_ms);
        Some((entry.token, entry.task))
    }

    /// Moves the clock forward without firing anything.
    pub fn settle_clock(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}
