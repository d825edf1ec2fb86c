use log::{debug, info};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use super::board::{Tile, TileState};
use super::catalog::CatalogCache;
use super::error::{GameError, Result};

/// A freshly dealt deck and the pair count it was actually dealt with.
#[derive(Clone, Debug)]
pub struct Deal {
    pub tiles: Vec<Tile>,
    pub pair_count: usize,
    /// Set when the catalog was too small for the requested pair count.
    pub notice: Option<String>,
}

/// Deals `requested_pairs` distinct items, two tiles each, in uniformly
/// shuffled order. A small catalog reduces the pair count instead of failing.
pub fn build_deck<R: Rng + ?Sized>(
    catalog: &mut CatalogCache,
    requested_pairs: usize,
    rng: &mut R,
) -> Result<Deal> {
    let items = catalog.items()?;

    let mut notice = None;
    let mut pair_count = requested_pairs;
    if items.len() < requested_pairs {
        pair_count = items.len();
        info!(
            "catalog holds {} items, dealing {} pairs instead of {}",
            items.len(),
            pair_count,
            requested_pairs
        );
        notice = Some(format!(
            "Only {pair_count} distinct items available, playing with {pair_count} pairs"
        ));
    }
    if pair_count == 0 {
        return Err(GameError::EmptyDeck);
    }

    let mut tiles = Vec::with_capacity(pair_count * 2);
    for item in items.choose_multiple(rng, pair_count) {
        for suffix in ["a", "b"] {
            tiles.push(Tile {
                tile_id: format!("{}-{}", item.id, suffix),
                item_id: item.id,
                image_ref: item.display_ref.clone(),
                state: TileState::FaceDown,
            });
        }
    }
    tiles.shuffle(rng);
    debug!("dealt {} tiles", tiles.len());

    Ok(Deal {
        tiles,
        pair_count,
        notice,
    })
}
