//! Toolkit-free match-game engine.
//!
//! A [`Session`] owns one game at a time. Hosts feed it input
//! (`select_tile`, `activate_power_up`, `start`, `reset`), drive its clock
//! with `advance_to`, report image loads with `asset_settled`, and render
//! whatever `drain_events` returns.

pub mod board;
pub mod catalog;
pub mod deck;
pub mod difficulty;
pub mod error;
pub mod events;
pub mod power_up;
pub mod schedule;
pub mod session;
pub mod timer;
pub mod turn;

pub use board::{Board, Tile, TileState};
pub use catalog::{CatalogCache, CatalogProvider, EmojiCatalog, Item, JsonCatalog};
pub use deck::{Deal, build_deck};
pub use difficulty::{Difficulty, format_clock};
pub use error::{GameError, Result};
pub use events::{EndReason, GameEvent, MessageKind};
pub use power_up::Activation;
pub use schedule::Timings;
pub use session::{Session, Stats};
pub use turn::{Selection, TurnState};
