use std::collections::HashMap;
use std::time::Instant;

use gtk4 as gtk;
use gtk4::gdk_pixbuf::Pixbuf;
use gtk4::glib;
use libadwaita as adw;

use crate::config::Settings;
use crate::engine::{CatalogCache, Difficulty, Session, Tile};

/// Loaded artwork for an image reference. `Failed` draws a fallback glyph.
#[derive(Clone, Debug)]
pub enum Artwork {
    Glyph(String),
    Image(Pixbuf),
    Failed,
}

pub struct AppState {
    pub session: Session,
    /// Remote catalog from the settings; the built-in emoji set when unset.
    pub catalog_uri: Option<String>,
    /// Difficulty to start once the catalog download in flight completes.
    pub catalog_fetch: Option<Difficulty>,
    pub clock_origin: Instant,
    pub wakeup_handle: Option<glib::SourceId>,
    pub artwork: HashMap<String, Artwork>,

    pub toast_overlay: Option<adw::ToastOverlay>,
    pub board_container: Option<gtk::Box>,
    pub grid_buttons: Vec<gtk::Button>,
    pub tile_index: HashMap<String, usize>,
    pub grid_cols: i32,
    pub grid_rows: i32,
    pub title_game_subtitle: Option<gtk::Label>,
    pub clicks_label: Option<gtk::Label>,
    pub pairs_label: Option<gtk::Label>,
    pub time_label: Option<gtk::Label>,
    pub reveal_button: Option<gtk::Button>,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        let mut session = Session::new(CatalogCache::default());
        session.set_timings(settings.timings);
        AppState {
            session,
            catalog_uri: settings.catalog_uri.clone(),
            catalog_fetch: None,
            clock_origin: Instant::now(),
            wakeup_handle: None,
            artwork: HashMap::new(),
            toast_overlay: None,
            board_container: None,
            grid_buttons: Vec::new(),
            tile_index: HashMap::new(),
            grid_cols: 0,
            grid_rows: 0,
            title_game_subtitle: None,
            clicks_label: None,
            pairs_label: None,
            time_label: None,
            reveal_button: None,
        }
    }

    /// Milliseconds since the window opened, the clock the session runs on.
    pub fn now_ms(&self) -> u64 {
        self.clock_origin.elapsed().as_millis() as u64
    }

    pub fn tile_at(&self, index: usize) -> Option<&Tile> {
        self.session.board().tiles().get(index)
    }

    pub fn button_for(&self, tile_id: &str) -> Option<&gtk::Button> {
        let index = *self.tile_index.get(tile_id)?;
        self.grid_buttons.get(index)
    }

    /// Column and row count for a board of `pair_count` pairs, as square as
    /// possible with columns never fewer than rows.
    pub fn layout_for(pair_count: usize) -> (i32, i32) {
        let tiles = (pair_count * 2).max(1);
        let cols = (tiles as f64).sqrt().ceil() as usize;
        let rows = tiles.div_ceil(cols);
        (cols as i32, rows as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts() {
        assert_eq!(AppState::layout_for(3), (3, 2));
        assert_eq!(AppState::layout_for(6), (4, 3));
        assert_eq!(AppState::layout_for(10), (5, 4));
        assert_eq!(AppState::layout_for(0), (1, 1));
    }
}
