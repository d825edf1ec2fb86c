use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileState {
    FaceDown,
    FaceUp,
    Matched,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub tile_id: String,
    pub item_id: u32,
    pub image_ref: String,
    pub state: TileState,
}

impl Tile {
    pub fn is_matched(&self) -> bool {
        self.state == TileState::Matched
    }
}

/// The dealt tiles of one game, in display order.
#[derive(Clone, Debug, Default)]
pub struct Board {
    tiles: Vec<Tile>,
}

impl Board {
    pub fn new(tiles: Vec<Tile>) -> Self {
        Board { tiles }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, tile_id: &str) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.tile_id == tile_id)
    }

    pub fn state_of(&self, tile_id: &str) -> Option<TileState> {
        self.get(tile_id).map(|tile| tile.state)
    }

    /// Sets a tile's state, returning true when it actually changed.
    pub(crate) fn set_state(&mut self, tile_id: &str, state: TileState) -> bool {
        match self.tiles.iter_mut().find(|tile| tile.tile_id == tile_id) {
            Some(tile) if tile.state != state => {
                tile.state = state;
                true
            }
            _ => false,
        }
    }

    pub fn matched_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_matched()).count()
    }

    /// The other tile dealt for the same item.
    pub fn partner_of(&self, tile_id: &str) -> Option<&Tile> {
        let tile = self.get(tile_id)?;
        self.tiles
            .iter()
            .find(|other| other.item_id == tile.item_id && other.tile_id != tile.tile_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(id: &str, item: u32) -> Tile {
        Tile {
            tile_id: id.to_string(),
            item_id: item,
            image_ref: format!("{item}.png"),
            state: TileState::FaceDown,
        }
    }

    #[test]
    fn set_state_reports_changes_only() {
        let mut board = Board::new(vec![tile("1-a", 1), tile("1-b", 1)]);
        assert!(board.set_state("1-a", TileState::FaceUp));
        assert!(!board.set_state("1-a", TileState::FaceUp));
        assert!(!board.set_state("missing", TileState::FaceUp));
        assert_eq!(board.state_of("1-a"), Some(TileState::FaceUp));
    }

    #[test]
    fn partner_lookup() {
        let board = Board::new(vec![tile("1-a", 1), tile("2-a", 2), tile("1-b", 1)]);
        assert_eq!(board.partner_of("1-a").map(|t| t.tile_id.as_str()), Some("1-b"));
        assert_eq!(board.partner_of("2-a"), None);
    }
}
