use super::board::TileState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    Win,
    Timeout,
}

/// Notifications for the renderer, drained with `Session::drain_events`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    BoardLayout {
        pair_count: usize,
    },
    TileStateChanged {
        tile_id: String,
        state: TileState,
    },
    StatsChanged {
        clicks: u32,
        pairs_matched: usize,
        pairs_left: usize,
        time_left: u32,
    },
    PowerUpAvailability {
        available: bool,
    },
    Message {
        text: String,
        kind: MessageKind,
    },
    /// The host should load `image_ref` and report back through
    /// `Session::asset_settled` with the same token.
    LoadAsset {
        token: u64,
        image_ref: String,
    },
    /// The image of a face-up or matched tile finished loading (or failed)
    /// and the tile should be redrawn.
    TileImageSettled {
        tile_id: String,
    },
    Ended {
        reason: EndReason,
    },
}
