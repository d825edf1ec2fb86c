//! Full games driven through `Session` on a manual clock.

use std::time::Duration;

use flipmatch::engine::{
    Activation, CatalogCache, Difficulty, EndReason, GameEvent, Item, JsonCatalog, MessageKind,
    Selection, Session, TileState,
};

fn catalog(count: u32) -> CatalogCache {
    let items: Vec<Item> = (1..=count)
        .map(|id| Item::new(id, format!("https://img.example/{id}.png")))
        .collect();
    CatalogCache::new(Box::new(JsonCatalog::new(
        serde_json::to_string(&items).unwrap(),
    )))
}

/// Tile ids grouped by item, in board order of first appearance.
fn pairs(session: &Session) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for tile in session.board().tiles() {
        if out.iter().any(|(a, _)| {
            session.board().get(a).map(|t| t.item_id) == Some(tile.item_id)
        }) {
            continue;
        }
        let partner = session.board().partner_of(&tile.tile_id).unwrap();
        out.push((tile.tile_id.clone(), partner.tile_id.clone()));
    }
    out
}

fn count_ended(events: &[GameEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, GameEvent::Ended { .. }))
        .count()
}

#[test]
fn easy_game_scenario() {
    let mut session = Session::with_seed(catalog(30), 2024);
    session.start(Difficulty::Easy).unwrap();
    assert_eq!(session.board().len(), 6);

    let pairs = pairs(&session);
    assert_eq!(pairs.len(), 3);
    let (a1, a2) = pairs[0].clone();
    let (b1, _) = pairs[1].clone();

    // Same tile twice: no net effect.
    session.select_tile(&a1);
    assert_eq!(session.select_tile(&a1), Selection::Deselected);
    assert_eq!(session.stats().clicks, 0);
    assert_eq!(session.board().state_of(&a1), Some(TileState::FaceDown));

    // Different items: shown, then hidden, then unlocked.
    session.select_tile(&a1);
    assert_eq!(session.select_tile(&b1), Selection::Mismatched);
    session.advance(Duration::from_millis(2_000));
    assert_eq!(session.board().state_of(&a1), Some(TileState::FaceDown));
    assert_eq!(session.board().state_of(&b1), Some(TileState::FaceDown));
    assert_eq!(session.stats().clicks, 2);
    assert!(!session.is_locked());

    // A real pair.
    session.select_tile(&a1);
    assert_eq!(session.select_tile(&a2), Selection::Matched);
    assert_eq!(session.stats().pairs_matched, 1);
    assert_eq!(session.board().state_of(&a1), Some(TileState::Matched));
    assert_eq!(session.board().state_of(&a2), Some(TileState::Matched));
    session.advance(Duration::from_millis(300));

    session.drain_events();
    for (first, second) in &pairs[1..] {
        session.select_tile(first);
        session.select_tile(second);
        session.advance(Duration::from_millis(300));
    }

    let stats = session.stats();
    assert_eq!(stats.pairs_matched, 3);
    assert_eq!(stats.pairs_left, 0);
    assert_eq!(stats.outcome, Some(EndReason::Win));
    assert!(!stats.active);

    let events = session.drain_events();
    assert_eq!(count_ended(&events), 1);
    assert!(events.iter().any(|event| matches!(
        event,
        GameEvent::Message {
            kind: MessageKind::Success,
            ..
        }
    )));

    assert!(!session.end(EndReason::Win));
    assert!(session.drain_events().is_empty());
}

#[test]
fn timeout_scenario() {
    let mut session = Session::with_seed(catalog(30), 9);
    session.start(Difficulty::Medium).unwrap();
    assert_eq!(session.board().len(), 12);

    session.force_time_left(1);
    session.drain_events();
    session.advance(Duration::from_secs(1));

    let stats = session.stats();
    assert_eq!(stats.time_left, 0);
    assert_eq!(stats.outcome, Some(EndReason::Timeout));
    assert!(stats.locked);
    assert_eq!(count_ended(&session.drain_events()), 1);

    let first = session.board().tiles()[0].tile_id.clone();
    assert_eq!(session.select_tile(&first), Selection::Ignored);
    assert_eq!(session.activate_power_up(), Activation::Ignored);

    session.advance(Duration::from_secs(5));
    assert!(session.drain_events().is_empty());
    assert!(!session.end(EndReason::Timeout));
}

#[test]
fn timer_runs_out_naturally() {
    let mut session = Session::with_seed(catalog(30), 9);
    session.start(Difficulty::Easy).unwrap();
    session.advance(Duration::from_secs(59));
    assert_eq!(session.stats().time_left, 1);
    assert!(session.is_active());
    session.advance(Duration::from_secs(1));
    assert_eq!(session.stats().outcome, Some(EndReason::Timeout));
    assert_eq!(session.next_wakeup(), None);
}

#[test]
fn win_stops_the_clock() {
    let mut session = Session::with_seed(catalog(30), 77);
    session.start(Difficulty::Easy).unwrap();
    for (first, second) in pairs(&session) {
        session.select_tile(&first);
        session.select_tile(&second);
        session.advance(Duration::from_millis(500));
    }
    let time_left = session.stats().time_left;
    session.advance(Duration::from_secs(120));
    assert_eq!(session.stats().time_left, time_left);
    assert_eq!(session.stats().outcome, Some(EndReason::Win));
}

#[test]
fn reset_mid_turn_discards_pending_work() {
    let mut session = Session::with_seed(catalog(30), 5);
    session.start(Difficulty::Easy).unwrap();
    let pairs = pairs(&session);
    let (a1, _) = pairs[0].clone();
    let (b1, _) = pairs[1].clone();
    session.select_tile(&a1);
    session.select_tile(&b1);
    assert!(session.is_locked());

    session.reset().unwrap();
    assert!(!session.is_locked());
    assert_eq!(session.stats().clicks, 0);
    session.drain_events();

    session.advance(Duration::from_millis(2_000));
    let tile_changes = session
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, GameEvent::TileStateChanged { .. }))
        .count();
    assert_eq!(tile_changes, 0);
}

#[test]
fn small_catalog_plays_fewer_pairs() {
    let mut session = Session::with_seed(catalog(4), 1);
    session.start(Difficulty::Hard).unwrap();
    let stats = session.stats();
    assert_eq!(stats.pair_count, 4);
    assert_eq!(session.board().len(), 8);
    assert!(session.drain_events().iter().any(|event| matches!(
        event,
        GameEvent::Message {
            kind: MessageKind::Info,
            ..
        }
    )));
}

#[test]
fn reveal_then_finish_the_game() {
    let mut session = Session::with_seed(catalog(30), 31);
    session.start(Difficulty::Easy).unwrap();
    session.drain_events();

    assert_eq!(session.activate_power_up(), Activation::Loading(3));
    let token = session.token();
    let refs: Vec<String> = session
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            GameEvent::LoadAsset { image_ref, .. } => Some(image_ref),
            _ => None,
        })
        .collect();
    assert_eq!(refs.len(), 3);
    session.asset_settled(token, &refs[0], true);
    session.asset_settled(token, &refs[1], false);
    assert!(!session.is_locked());
    session.asset_settled(token, &refs[2], true);
    assert!(session.is_locked());
    assert!(
        session
            .board()
            .tiles()
            .iter()
            .all(|tile| tile.state == TileState::FaceUp)
    );

    session.advance(Duration::from_secs(2));
    assert!(!session.is_locked());
    assert_eq!(session.activate_power_up(), Activation::Ignored);

    for (first, second) in pairs(&session) {
        session.select_tile(&first);
        session.select_tile(&second);
        session.advance(Duration::from_millis(300));
    }
    assert_eq!(session.stats().outcome, Some(EndReason::Win));
}
