/// Result of one countdown tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Remaining(u32),
    /// Reached zero. Reported once per countdown.
    Expired,
    /// The countdown is not running; nothing changed.
    Stopped,
}

/// Single per-game countdown. The 1 s cadence is driven by the session's
/// schedule; this type only owns the count. Expiry stops it, so it is
/// reported once.
#[derive(Clone, Debug, Default)]
pub struct Countdown {
    remaining: u32,
    running: bool,
}

impl Countdown {
    pub fn start(&mut self, total_secs: u32) {
        self.remaining = total_secs;
        self.running = true;
    }

    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Stopped;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            return Tick::Expired;
        }
        Tick::Remaining(self.remaining)
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn set_remaining(&mut self, secs: u32) {
        self.remaining = secs;
    }
}
